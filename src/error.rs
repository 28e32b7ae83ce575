use crate::config::ConfigError;
use crate::gateway::GatewayError;

/// Top-level failure of a command, mapped to the process exit code.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),
    #[error("interrupted again while draining; in-flight inserts were abandoned")]
    Interrupted,
    #[error("unexpected error: {0:#}")]
    Unexpected(#[from] anyhow::Error),
}

impl FeedError {
    pub fn exit_code(&self) -> u8 {
        match self {
            FeedError::Configuration(_) => 2,
            FeedError::Gateway(_) | FeedError::Unexpected(_) => 1,
            FeedError::Interrupted => 130,
        }
    }
}
