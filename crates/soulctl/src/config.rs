//! Tool configuration from flags and environment.

use std::env;
use std::path::PathBuf;

use crate::dirs;

pub const CONFIG_FILE_NAME: &str = "soul.toml";

/// Where records and rules live.
#[derive(Clone, Debug)]
pub struct CliConfig {
    pub data_dir: PathBuf,
    /// Rules file; `None` uses the built-in defaults.
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Resolves paths: explicit flags first, then `SOUL_DATA_DIR` /
    /// `SOUL_CONFIG`, then platform directories.
    pub fn resolve(data_dir: Option<PathBuf>, config_path: Option<PathBuf>) -> Self {
        let data_dir = data_dir
            .or_else(|| read_env("SOUL_DATA_DIR"))
            .unwrap_or_else(dirs::data_dir);

        let config_path = config_path.or_else(|| read_env("SOUL_CONFIG")).or_else(|| {
            let candidate = dirs::config_dir().join(CONFIG_FILE_NAME);
            candidate.exists().then_some(candidate)
        });

        Self {
            data_dir,
            config_path,
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_flags_win() {
        let config = CliConfig::resolve(
            Some(PathBuf::from("/srv/soul")),
            Some(PathBuf::from("/etc/soul/rules.toml")),
        );
        assert_eq!(config.data_dir, PathBuf::from("/srv/soul"));
        assert_eq!(config.config_path, Some(PathBuf::from("/etc/soul/rules.toml")));
    }
}
