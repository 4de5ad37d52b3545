// src/config/loader.rs

//! # Configuration Loader
//!
//! Reads the TOML config file and deserializes it into [`Config`].
//! A missing file is not an error: the built-in defaults apply.

use crate::config::types::Config;
use anyhow::Context;
use log::{debug, info};
use std::{fs, path::Path};

/// Load the configuration from `path`, or fall back to defaults if the file
/// does not exist. A file that exists but fails to parse is a hard error:
/// running with silently ignored settings would be worse than not starting.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    if !path.exists() {
        info!("config: {:?} not found, using defaults", path);
        return Ok(Config::default());
    }
    debug!("config: reading {:?}", path);
    let txt = fs::read_to_string(path)
        .with_context(|| format!("cannot read config file {:?}", path))?;
    let cfg: Config =
        toml::from_str(&txt).with_context(|| format!("cannot parse config file {:?}", path))?;
    info!("config: loaded {:?}", path);
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = load_config(&PathBuf::from("does-not-exist.toml")).unwrap();
        assert_eq!(cfg.agent.endpoint, "http://127.0.0.1:50051");
        assert_eq!(cfg.polling.risk_limit, 100);
        assert_eq!(cfg.polling.log_limit, 128);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [polling]
            health_interval_secs = 1
            "#,
        )
        .unwrap();
        assert_eq!(cfg.polling.health_interval_secs, 1);
        assert_eq!(cfg.polling.logs_interval_secs, 5);
        assert_eq!(cfg.bridge.listen, "127.0.0.1:7801");
    }
}
