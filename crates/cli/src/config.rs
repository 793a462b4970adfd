//! Loading configuration and request files from JSON or YAML.

use aw8624_haptics::HapticsConfig;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, CliError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("json") => Ok(Format::Json),
            Some("yaml" | "yml") => Ok(Format::Yaml),
            Some(other) => Err(CliError::UnsupportedFormat(format!(
                "{}: .{other} files are not supported (use .json, .yaml or .yml)",
                path.display()
            ))),
            None => Err(CliError::UnsupportedFormat(format!(
                "{}: missing file extension",
                path.display()
            ))),
        }
    }
}

pub fn parse<T: DeserializeOwned>(text: &str, format: Format) -> Result<T, CliError> {
    match format {
        Format::Json => Ok(serde_json::from_str(text)?),
        Format::Yaml => Ok(serde_yaml::from_str(text)?),
    }
}

pub fn read_file<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let format = Format::from_path(path)?;
    let text = fs::read_to_string(path)?;
    debug!(path = %path.display(), ?format, "loaded file");
    parse(&text, format)
}

/// Effective configuration: the defaults, or the given file, validated.
pub fn load_config(path: Option<&Path>) -> Result<HapticsConfig, CliError> {
    let config = match path {
        Some(path) => read_file::<HapticsConfig>(path)?,
        None => HapticsConfig::default(),
    };
    config
        .validate()
        .map_err(|e| CliError::InvalidConfiguration(e.to_string()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aw8624_protocol::PollExhaustion;
    use std::path::PathBuf;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn format_follows_extension() -> TestResult {
        assert_eq!(Format::from_path(&PathBuf::from("a.json"))?, Format::Json);
        assert_eq!(Format::from_path(&PathBuf::from("a.YML"))?, Format::Yaml);
        assert_eq!(Format::from_path(&PathBuf::from("dir/a.yaml"))?, Format::Yaml);
        assert!(matches!(
            Format::from_path(&PathBuf::from("a.toml")),
            Err(CliError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            Format::from_path(&PathBuf::from("config")),
            Err(CliError::UnsupportedFormat(_))
        ));
        Ok(())
    }

    #[test]
    fn partial_yaml_keeps_remaining_defaults() -> TestResult {
        let text = "device_count: 2\ndriver:\n  poll_exhaustion: ignore\n  calibration:\n    f0_pre: 1700\n";
        let config: HapticsConfig = parse(text, Format::Yaml)?;
        assert_eq!(config.device_count, 2);
        assert_eq!(config.driver.poll_exhaustion, PollExhaustion::Ignore);
        assert_eq!(config.driver.poll_limit, 100);
        assert_eq!(config.driver.calibration.f0_pre, 1700);
        assert_eq!(config.driver.calibration.f0_coeff, 260);
        Ok(())
    }

    #[test]
    fn unknown_json_field_is_rejected() {
        let result = parse::<HapticsConfig>(r#"{"device_cnt": 2}"#, Format::Json);
        assert!(matches!(result, Err(CliError::JsonError(_))));
    }

    #[test]
    fn missing_path_uses_defaults() -> TestResult {
        let config = load_config(None)?;
        assert_eq!(config, HapticsConfig::default());
        Ok(())
    }
}
