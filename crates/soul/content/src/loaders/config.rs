//! Soul-point configuration loader.

use std::path::Path;

use soul_core::SoulConfig;

use crate::loaders::format::RawConfig;
use crate::loaders::{LoadResult, read_file};

/// Loader for soul-point configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate config from a TOML file.
    pub fn load(path: &Path) -> LoadResult<SoulConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {:#}", path.display(), e))
    }

    /// Parse and validate config from TOML text. Missing keys take defaults.
    pub fn parse(content: &str) -> LoadResult<SoulConfig> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;
        let config = raw.into_config()?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use soul_core::{HealthMode, MoneyMode, RecoveryMode};

    use super::*;

    fn bundled() -> &'static Path {
        Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/data/soul.toml"))
    }

    #[test]
    fn bundled_config_loads() {
        let config = ConfigLoader::load(bundled()).unwrap();

        assert!(config.enabled);
        assert_eq!(config.max, 10);
        assert_eq!(config.recovery.mode, RecoveryMode::RealTime);
        assert_eq!(config.max_points.regeneration.interval_seconds, 86_400);

        let at_zero = config.drop_rates(0);
        assert_eq!(at_zero.item_drop_percent, 100);
        assert!(at_zero.hotbar_vulnerable && at_zero.armor_vulnerable);
        assert_eq!(at_zero.money.mode, MoneyMode::Percent);
        assert_eq!(at_zero.max_health.mode, HealthMode::Remove);

        let full = config.drop_rates(10);
        assert_eq!(full.item_drop_percent, 0);
        assert!(full.commands.is_empty());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max = 5\nstarting = 5\n[recovery]\nmode = \"active-time\"").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.max, 5);
        assert_eq!(config.recovery.mode, RecoveryMode::ActiveTime);
        assert_eq!(config.recovery.interval_seconds, 3600);
    }

    #[test]
    fn validation_errors_are_reported() {
        let err = ConfigLoader::parse("max = 3\nstarting = 9").unwrap_err();
        assert!(err.to_string().contains("exceed the maximum"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = ConfigLoader::load(Path::new("/nonexistent/soul.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }
}
