//! Logging settings for the state and export subsystems.
//!
//! | Variable | Field | Default |
//! |---|---|---|
//! | `OTEL_SERVICE_NAME` | `service_name` | `quantum-chain` |
//! | `QC_SUBSYSTEM_ID` | `subsystem_id` | `00` |
//! | `QC_LOG_LEVEL`, then `RUST_LOG` | `log_level` | `info` |
//! | `QC_CONSOLE_OUTPUT` | `console_output` | `true` |
//! | `QC_JSON_LOGS` | `json_logs` | `true` inside a container |

use std::env;

const DEFAULT_SERVICE: &str = "quantum-chain";
const NODE_SUBSYSTEM: &str = "00";

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Tag on every log line. `for_subsystem` sets `qc-<id>-<name>`.
    pub service_name: String,

    /// `04` for state management, `18` for genesis export, `00` for the
    /// whole node.
    pub subsystem_id: String,

    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_level: String,

    /// `false` keeps the filter but installs no output layer.
    pub console_output: bool,

    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE.to_string(),
            subsystem_id: NODE_SUBSYSTEM.to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

/// `Some(true)` for `1`/`true`, `Some(false)` for `0`/`false`, any case.
fn env_flag(name: &str) -> Option<bool> {
    let value = env::var(name).ok()?.to_lowercase();
    match value.as_str() {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

impl TelemetryConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let in_container =
            env::var_os("KUBERNETES_SERVICE_HOST").is_some() || env::var_os("DOCKER_CONTAINER").is_some();

        Self {
            service_name: env::var("OTEL_SERVICE_NAME").unwrap_or(defaults.service_name),
            subsystem_id: env::var("QC_SUBSYSTEM_ID").unwrap_or(defaults.subsystem_id),
            log_level: env::var("QC_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or(defaults.log_level),
            console_output: env_flag("QC_CONSOLE_OUTPUT").unwrap_or(defaults.console_output),
            json_logs: env_flag("QC_JSON_LOGS").unwrap_or(in_container),
        }
    }

    /// Environment settings, tagged for one subsystem crate.
    pub fn for_subsystem(subsystem_id: &str, subsystem_name: &str) -> Self {
        Self {
            subsystem_id: subsystem_id.to_string(),
            service_name: format!("qc-{subsystem_id}-{subsystem_name}"),
            ..Self::from_env()
        }
    }

    /// `service_name`, suffixed with the subsystem id unless this is the node.
    pub fn full_service_name(&self) -> String {
        if self.subsystem_id == NODE_SUBSYSTEM {
            self.service_name.clone()
        } else {
            format!("{}-{}", self.service_name, self.subsystem_id)
        }
    }
}
