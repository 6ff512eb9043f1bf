use anyhow::{Context, Result};
use reflex_experiment::ReactionConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application settings, loaded from an optional JSON file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub reaction: ReactionConfig,
    /// Where the session report is written on exit
    pub export_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.reaction.validate()?;
        Ok(config)
    }

    /// Writes the report as pretty JSON if an export path is configured
    pub fn export_report(&self, report: &reflex_core::SessionReport) -> Result<Option<PathBuf>> {
        let Some(path) = &self.export_path else {
            return Ok(None);
        };
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(file, report)
            .with_context(|| format!("writing report to {}", path.display()))?;
        Ok(Some(path.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn no_path_gives_defaults() {
        assert_eq!(AppConfig::load(None).unwrap(), AppConfig::default());
    }

    #[test]
    fn parses_partial_json() {
        let config = AppConfig::from_json(
            r#"{ "reaction": { "delay_range_ms": [1500, 2500] }, "export_path": "out.json" }"#,
        )
        .unwrap();
        assert_eq!(config.reaction.max_attempts, 5);
        assert_eq!(config.reaction.delay_range_ms, (1500, 2500));
        assert_eq!(config.export_path, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn rejects_invalid_reaction_config() {
        let err = AppConfig::from_json(r#"{ "reaction": { "max_attempts": 0 } }"#).unwrap_err();
        assert!(err.to_string().contains("max_attempts"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = AppConfig::load(Some(Path::new("/nonexistent/reflex.json"))).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/reflex.json"));
    }

    #[test]
    fn export_writes_report() {
        let path = std::env::temp_dir().join(format!("reflex-report-{}.json", std::process::id()));
        let config = AppConfig {
            export_path: Some(path.clone()),
            ..Default::default()
        };
        let report = reflex_core::SessionReport {
            max_attempts: 5,
            complete: false,
            trials_ms: vec![180],
            summary: None,
        };
        assert_eq!(config.export_report(&report).unwrap(), Some(path.clone()));
        let written: reflex_core::SessionReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, report);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn export_without_path_is_noop() {
        let report = reflex_core::SessionReport {
            max_attempts: 5,
            complete: false,
            trials_ms: vec![],
            summary: None,
        };
        assert_eq!(AppConfig::default().export_report(&report).unwrap(), None);
    }
}
