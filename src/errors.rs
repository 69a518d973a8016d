use thiserror::Error;

/// Errors raised by environments, spaces and the registry.
#[derive(Error, Debug)]
pub enum EnvError {
    /// The action is outside the environment's action space. This is a caller
    /// bug rather than a runtime condition.
    #[error("{action} ({type_name}) invalid")]
    InvalidAction {
        action: String,
        type_name: &'static str,
    },

    #[error("Invalid board: {0}")]
    InvalidBoard(String),

    #[error("Invalid bandit: {0}")]
    InvalidBandit(String),

    #[error("Unsupported render mode: {0}")]
    UnsupportedRenderMode(String),

    #[error("No environment registered with id '{0}'")]
    UnknownEnvironment(String),

    #[error("Environment id '{0}' is already registered")]
    DuplicateRegistration(String),

    #[error("No scoreboard group with id '{0}'")]
    UnknownGroup(String),

    #[error("Action space is not discrete: {0}")]
    UnsupportedActionSpace(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EnvError {
    /// Builds an [`EnvError::InvalidAction`] for any displayable action.
    pub fn invalid_action<A: std::fmt::Display>(action: &A) -> Self {
        EnvError::InvalidAction {
            action: action.to_string(),
            type_name: std::any::type_name::<A>(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EnvError>;
