use crate::arena::ArenaError;
use crate::config::ConfigError;

/// Errors raised by [`Scene`](super::Scene) operations.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("invalid scene config: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Arena(#[from] ArenaError),
    /// The id was never issued, or its drawable has been released.
    #[error("unknown or released drawable")]
    UnknownDrawable,
}
