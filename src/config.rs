use crate::protocol::Dialect;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading config: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("writing config: {0}")]
    Serialize(#[from] ron::Error),
    #[error("config lists no sources")]
    NoSources,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    pub port: String,
}

/// Serial link parameters shared by every source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkSettings {
    pub baud_rate: u32,
    /// Upper bound on one blocking read; also how fast a worker notices it
    /// was asked to stop.
    pub poll_interval_ms: u64,
    /// Boards reset when the port opens and need a moment before they talk.
    pub settle_delay_ms: u64,
    pub max_line_len: usize,
}

impl LinkSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            poll_interval_ms: 100,
            settle_delay_ms: 2000,
            max_line_len: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpartitoConfig {
    pub sources: Vec<SourceConfig>,
    /// Play a tone for every note, not just light it.
    pub audio: bool,
    pub dialect: Dialect,
    pub link: LinkSettings,
}

impl Default for SpartitoConfig {
    fn default() -> Self {
        Self {
            sources: vec![
                SourceConfig {
                    name: "Spartito 1".into(),
                    port: "COM4".into(),
                },
                SourceConfig {
                    name: "Spartito 2".into(),
                    port: "COM5".into(),
                },
            ],
            audio: false,
            dialect: Dialect::Sharp,
            link: LinkSettings::default(),
        }
    }
}

impl SpartitoConfig {
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let config: SpartitoConfig = ron::from_str(text)?;
        if config.sources.is_empty() {
            return Err(ConfigError::NoSources);
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_ron(&text)
    }

    /// Loads `path` if it exists, otherwise falls back to the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            info!("{} not found, using default config", path.display());
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        fs::write(path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_instruments() {
        let config = SpartitoConfig::default();
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.sources[0].port, "COM4");
        assert_eq!(config.link.baud_rate, 9600);
        assert!(config.link.poll_interval() < Duration::from_secs(1));
        assert!(!config.audio);
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let config = SpartitoConfig::from_ron(
            r#"(
                sources: [(name: "solo", port: "/dev/ttyACM0")],
                audio: true,
                dialect: Suffix,
                link: (poll_interval_ms: 50),
            )"#,
        )
        .unwrap();
        assert_eq!(config.sources.len(), 1);
        assert!(config.audio);
        assert_eq!(config.dialect, Dialect::Suffix);
        assert_eq!(config.link.poll_interval_ms, 50);
        assert_eq!(config.link.baud_rate, 9600);
    }

    #[test]
    fn empty_source_list_is_rejected() {
        assert!(matches!(
            SpartitoConfig::from_ron("(sources: [])"),
            Err(ConfigError::NoSources)
        ));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(matches!(
            SpartitoConfig::from_ron("sources = 3"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn save_then_load() {
        let path = std::env::temp_dir().join(format!("spartito-config-{}.ron", std::process::id()));
        let mut config = SpartitoConfig::default();
        config.audio = true;
        config.save(&path).unwrap();
        let loaded = SpartitoConfig::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_file_means_defaults() {
        let path = Path::new("/nonexistent/spartito.ron");
        assert_eq!(
            SpartitoConfig::load_or_default(path).unwrap(),
            SpartitoConfig::default()
        );
    }
}
