use thiserror::Error;

#[derive(Error, Debug)]
pub enum GymError {
    #[error("another session is already active in this process")]
    SessionActive,

    #[error("session is not initialized")]
    NotInitialized,

    #[error("no game is running")]
    NotRunning,

    #[error("invalid game configuration: {0}")]
    InvalidConfig(String),

    #[error("ruleset error: {0}")]
    Ruleset(String),

    #[error("map generation failed: {0}")]
    MapGeneration(String),

    #[error("player creation failed: {0}")]
    PlayerCreation(String),

    #[error("fast reset is not implemented; start a new game instead")]
    ResetUnsupported,

    #[error("unknown action type code: {0}")]
    UnknownActionType(i32),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("ruleset parse error: {0}")]
    ParseError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, GymError>;
