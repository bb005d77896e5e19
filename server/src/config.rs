//! Server configuration, loaded from environment variables with defaults.

use bookfair_core_rs::SandboxMode;
use std::env;

/// HTTP adapter configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. "0.0.0.0:8080"
    pub bind_addr: String,

    /// Scripted behavior of the sandbox payment gateway
    pub gateway_mode: SandboxMode,
}

impl ServerConfig {
    /// Load from `BOOKFAIR_BIND` and `BOOKFAIR_GATEWAY_MODE`.
    pub fn from_env() -> Self {
        let bind_addr =
            env::var("BOOKFAIR_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let gateway_mode = match env::var("BOOKFAIR_GATEWAY_MODE")
            .unwrap_or_else(|_| "approve".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "approve" => SandboxMode::Approve,
            "decline" => SandboxMode::Decline,
            "unreachable" => SandboxMode::Unreachable,
            other => {
                tracing::warn!(mode = other, "unknown gateway mode, defaulting to approve");
                SandboxMode::Approve
            }
        };

        Self {
            bind_addr,
            gateway_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_env() {
        // Environment-dependent variables are absent under `cargo test`
        let config = ServerConfig::from_env();
        assert!(!config.bind_addr.is_empty());
    }
}
