use anyhow::Result;
use reflex_core::{Phase, TrendPoint};
use tiny_skia::{Color, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

const BLUE: [u8; 3] = [59, 130, 246];
const RED: [u8; 3] = [239, 68, 68];
const GREEN: [u8; 3] = [34, 197, 94];
const PANEL: [u8; 3] = [241, 245, 249];
const BAR: [u8; 3] = [37, 99, 235];

/// Share of the window height used by the test area; the rest holds the trend chart
const TEST_AREA_RATIO: f32 = 0.66;

/// Everything the renderer needs from the state machine for one frame
pub struct FrameView<'a> {
    pub phase: Phase,
    pub trend: &'a [TrendPoint],
    pub max_attempts: usize,
    pub complete: bool,
}

/// Colours the test area by phase and draws the attempt trend below it
pub struct PhaseRenderer {
    width: u32,
    height: u32,
}

impl PhaseRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn render_frame(&self, pixmap: &mut Pixmap, view: &FrameView) -> Result<()> {
        pixmap.fill(rgb(PANEL));

        let area_h = (self.height as f32 * TEST_AREA_RATIO).max(1.0);
        let area = Rect::from_xywh(0.0, 0.0, self.width as f32, area_h)
            .ok_or_else(|| anyhow::anyhow!("invalid test area {}x{}", self.width, area_h))?;
        pixmap.fill_rect(area, &paint(phase_color(view.phase)), Transform::identity(), None);

        if view.phase == Phase::Premature {
            self.draw_cross(pixmap, area_h)?;
        }
        if view.complete {
            self.draw_frame_border(pixmap, area_h)?;
        }

        self.draw_trend(pixmap, area_h, view)?;
        Ok(())
    }

    fn draw_cross(&self, pixmap: &mut Pixmap, area_h: f32) -> Result<()> {
        let cx = self.width as f32 / 2.0;
        let cy = area_h / 2.0;
        let arm = area_h.min(self.width as f32) * 0.12;

        let mut pb = PathBuilder::new();
        pb.move_to(cx - arm, cy - arm);
        pb.line_to(cx + arm, cy + arm);
        pb.move_to(cx + arm, cy - arm);
        pb.line_to(cx - arm, cy + arm);
        let path = pb
            .finish()
            .ok_or_else(|| anyhow::anyhow!("empty cross path"))?;

        let stroke = Stroke {
            width: (arm * 0.2).max(2.0),
            ..Default::default()
        };
        pixmap.stroke_path(&path, &paint([255, 255, 255]), &stroke, Transform::identity(), None);
        Ok(())
    }

    fn draw_frame_border(&self, pixmap: &mut Pixmap, area_h: f32) -> Result<()> {
        let inset = 6.0;
        let path = PathBuilder::from_rect(
            Rect::from_ltrb(inset, inset, self.width as f32 - inset, area_h - inset)
                .ok_or_else(|| anyhow::anyhow!("window too small for border"))?,
        );
        let stroke = Stroke {
            width: 4.0,
            ..Default::default()
        };
        pixmap.stroke_path(&path, &paint([255, 255, 255]), &stroke, Transform::identity(), None);
        Ok(())
    }

    fn draw_trend(&self, pixmap: &mut Pixmap, area_h: f32, view: &FrameView) -> Result<()> {
        if view.trend.is_empty() || view.max_attempts == 0 {
            return Ok(());
        }
        let margin = 16.0;
        let chart_top = area_h + margin;
        let chart_h = self.height as f32 - chart_top - margin;
        if chart_h <= 0.0 {
            return Ok(());
        }

        let slot_w = (self.width as f32 - 2.0 * margin) / view.max_attempts as f32;
        let bar_w = (slot_w * 0.6).max(1.0);
        let peak = view.trend.iter().map(|p| p.time_ms).max().unwrap_or(1).max(1) as f32;
        let bar_paint = paint(BAR);

        for point in view.trend {
            let h = (point.time_ms as f32 / peak * chart_h).max(1.0);
            let x = margin + (point.attempt - 1) as f32 * slot_w + (slot_w - bar_w) / 2.0;
            let y = chart_top + chart_h - h;
            if let Some(bar) = Rect::from_xywh(x, y, bar_w, h) {
                pixmap.fill_rect(bar, &bar_paint, Transform::identity(), None);
            }
        }
        Ok(())
    }
}

pub fn phase_color(phase: Phase) -> [u8; 3] {
    match phase {
        Phase::Idle | Phase::Settled => BLUE,
        Phase::Armed | Phase::Premature => RED,
        Phase::Stimulus => GREEN,
    }
}

fn rgb([r, g, b]: [u8; 3]) -> Color {
    Color::from_rgba8(r, g, b, 255)
}

fn paint(color: [u8; 3]) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(rgb(color));
    paint.anti_alias = true;
    paint
}
