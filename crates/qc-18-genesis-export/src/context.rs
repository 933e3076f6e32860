//! Node context passed explicitly through every export call.

use quantum_telemetry::{init_telemetry, TelemetryConfig, TelemetryGuard};
use std::env;
use std::path::{Path, PathBuf};

use crate::domain::ConfigError;

/// Directory under the home holding node configuration.
pub const CONFIG_DIR: &str = "config";
/// Genesis file name inside the config directory.
pub const GENESIS_FILE: &str = "genesis.json";
/// Home directory used when `QC_HOME` is unset, relative to `HOME`.
pub const DEFAULT_HOME_DIR: &str = ".quantum-chain";

#[derive(Debug, Clone)]
pub struct ServerContext {
    home: PathBuf,
    pub telemetry: TelemetryConfig,
}

impl ServerContext {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            telemetry: TelemetryConfig::for_subsystem("18", "genesis-export"),
        }
    }

    /// Home from `QC_HOME`, falling back to `$HOME/.quantum-chain`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let home = match env::var_os("QC_HOME") {
            Some(home) => PathBuf::from(home),
            None => env::var_os("HOME")
                .map(|h| PathBuf::from(h).join(DEFAULT_HOME_DIR))
                .ok_or(ConfigError::MissingHome)?,
        };
        Ok(Self::new(home))
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn config_dir(&self) -> PathBuf {
        self.home.join(CONFIG_DIR)
    }

    pub fn genesis_file(&self) -> PathBuf {
        self.config_dir().join(GENESIS_FILE)
    }

    /// Install logging and register metrics for this node.
    ///
    /// Once per process: a second call fails with `ConfigError::Telemetry`.
    pub fn init_telemetry(&self) -> Result<TelemetryGuard, ConfigError> {
        Ok(init_telemetry(self.telemetry.clone())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genesis_path() {
        let ctx = ServerContext::new("foobar");
        assert_eq!(
            ctx.genesis_file().display().to_string(),
            "foobar/config/genesis.json"
        );
        assert_eq!(ctx.telemetry.subsystem_id, "18");
    }

    #[test]
    fn test_telemetry_bootstraps_once() {
        let mut ctx = ServerContext::new("foobar");
        ctx.telemetry.console_output = false;

        let guard = ctx.init_telemetry().unwrap();
        assert!(matches!(
            ctx.init_telemetry(),
            Err(ConfigError::Telemetry(_))
        ));
        drop(guard);
    }
}
