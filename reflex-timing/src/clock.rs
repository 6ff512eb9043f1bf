use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Resolution above which the monotonic source is treated as unusable
const MAX_MONOTONIC_RESOLUTION_NS: u64 = 1_000_000;

/// Which physical source backs a clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSource {
    Monotonic,
    Wall,
}

/// Monotonic timestamp source, nanoseconds since the clock's origin
pub trait Clock: Clone + Send + Sync {
    fn now(&self) -> u64;
    fn source(&self) -> ClockSource;

    fn elapsed(&self, ts: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(ts))
    }
}

/// `Instant`-backed clock with sub-microsecond resolution on desktop platforms
#[derive(Debug, Clone)]
pub struct HighPrecisionClock {
    start: Instant,
}

impl HighPrecisionClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for HighPrecisionClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for HighPrecisionClock {
    fn now(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }

    fn source(&self) -> ClockSource {
        ClockSource::Monotonic
    }
}

/// Millisecond wall clock. Readings are clamped so they never go backwards
/// when the system time is adjusted.
#[derive(Debug, Clone)]
pub struct WallClock {
    origin_ms: u64,
    last_ns: Arc<AtomicU64>,
}

impl WallClock {
    pub fn new() -> Self {
        Self {
            origin_ms: Self::epoch_ms(),
            last_ns: Arc::new(AtomicU64::new(0)),
        }
    }

    fn epoch_ms() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for WallClock {
    fn now(&self) -> u64 {
        let ns = Self::epoch_ms().saturating_sub(self.origin_ms) * 1_000_000;
        let prev = self.last_ns.fetch_max(ns, Ordering::AcqRel);
        prev.max(ns)
    }

    fn source(&self) -> ClockSource {
        ClockSource::Wall
    }
}

/// Best available clock: the monotonic source when usable, the wall clock otherwise
#[derive(Debug, Clone)]
pub enum SystemClock {
    Monotonic(HighPrecisionClock),
    Wall(WallClock),
}

impl SystemClock {
    pub fn detect() -> Self {
        Self::from_resolution(monotonic_resolution_ns())
    }

    /// Picks a source from the monotonic resolution reported by the OS;
    /// `None` means the query failed.
    pub fn from_resolution(resolution_ns: Option<u64>) -> Self {
        match resolution_ns {
            Some(res) if res <= MAX_MONOTONIC_RESOLUTION_NS => {
                tracing::debug!(resolution_ns = res, "using monotonic clock");
                SystemClock::Monotonic(HighPrecisionClock::new())
            }
            Some(res) => {
                tracing::warn!(
                    resolution_ns = res,
                    "monotonic clock too coarse, falling back to wall clock"
                );
                SystemClock::Wall(WallClock::new())
            }
            None => {
                tracing::warn!("monotonic clock unavailable, falling back to wall clock");
                SystemClock::Wall(WallClock::new())
            }
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::detect()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        match self {
            SystemClock::Monotonic(c) => c.now(),
            SystemClock::Wall(c) => c.now(),
        }
    }

    fn source(&self) -> ClockSource {
        match self {
            SystemClock::Monotonic(_) => ClockSource::Monotonic,
            SystemClock::Wall(_) => ClockSource::Wall,
        }
    }
}

#[cfg(target_os = "linux")]
fn monotonic_resolution_ns() -> Option<u64> {
    use libc::{clock_getres, timespec, CLOCK_MONOTONIC};

    let mut res = timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    let rc = unsafe { clock_getres(CLOCK_MONOTONIC, &mut res) };
    if rc != 0 {
        return None;
    }
    Some(res.tv_sec as u64 * 1_000_000_000 + res.tv_nsec as u64)
}

// `Instant` is monotonic everywhere std supports; assume nanosecond ticks.
#[cfg(not(target_os = "linux"))]
fn monotonic_resolution_ns() -> Option<u64> {
    Some(1)
}

/// Clock that only moves when told to; clones share the same time
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ns: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, d: Duration) {
        self.now_ns
            .fetch_add(d.as_nanos() as u64, Ordering::AcqRel);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now_ns.load(Ordering::Acquire)
    }

    fn source(&self) -> ClockSource {
        ClockSource::Monotonic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_precision_clock_is_monotonic() {
        let clock = HighPrecisionClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
        assert_eq!(clock.source(), ClockSource::Monotonic);
    }

    #[test]
    fn wall_clock_never_goes_backwards() {
        let clock = WallClock::new();
        clock.last_ns.store(u64::MAX / 2, Ordering::Release);
        assert_eq!(clock.now(), u64::MAX / 2);
        assert_eq!(clock.source(), ClockSource::Wall);
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let other = clock.clone();
        clock.advance(Duration::from_millis(150));
        assert_eq!(other.now(), 150_000_000);
        assert_eq!(other.elapsed(50_000_000), Duration::from_millis(100));
    }

    #[test]
    fn elapsed_saturates_for_future_timestamps() {
        let clock = ManualClock::new();
        assert_eq!(clock.elapsed(1_000), Duration::ZERO);
    }

    #[test]
    fn fine_resolution_selects_monotonic() {
        assert_eq!(SystemClock::from_resolution(Some(1)).source(), ClockSource::Monotonic);
        assert_eq!(
            SystemClock::from_resolution(Some(MAX_MONOTONIC_RESOLUTION_NS)).source(),
            ClockSource::Monotonic
        );
    }

    #[test]
    fn coarse_resolution_falls_back_to_wall() {
        let clock = SystemClock::from_resolution(Some(MAX_MONOTONIC_RESOLUTION_NS + 1));
        assert!(matches!(clock, SystemClock::Wall(_)));
        assert_eq!(clock.source(), ClockSource::Wall);
    }

    #[test]
    fn failed_resolution_query_falls_back_to_wall() {
        let clock = SystemClock::from_resolution(None);
        assert!(matches!(clock, SystemClock::Wall(_)));
        let a = clock.now();
        std::thread::sleep(Duration::from_millis(5));
        let b = clock.now();
        assert!(b >= a + 4_000_000, "wall clock advanced only {} ns", b - a);
        assert_eq!(b % 1_000_000, 0);
    }

    #[test]
    fn detected_clock_reports_its_source() {
        let clock = SystemClock::detect();
        let expected = match &clock {
            SystemClock::Monotonic(_) => ClockSource::Monotonic,
            SystemClock::Wall(_) => ClockSource::Wall,
        };
        assert_eq!(clock.source(), expected);
        let a = clock.now();
        assert!(clock.now() >= a);
    }
}
