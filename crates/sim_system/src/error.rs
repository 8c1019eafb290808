//! System error types.

use sim_ecs::EcsError;

/// Errors a system can raise from `exec`.
///
/// All of these are fatal to the current session: the scheduler stops and
/// reports them instead of carrying on with a torn world.
#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    /// An entity-store invariant was violated.
    #[error(transparent)]
    Ecs(#[from] EcsError),

    /// A system found the world in a state it cannot handle.
    #[error("system '{system}': {message}")]
    Invalid { system: String, message: String },
}

impl SystemError {
    pub fn invalid(system: &str, message: impl Into<String>) -> Self {
        Self::Invalid {
            system: system.to_string(),
            message: message.into(),
        }
    }
}

/// Errors loading a [`SimConfig`](crate::SimConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid {var} value '{value}'")]
    Env { var: &'static str, value: String },
}
