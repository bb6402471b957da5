use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid instance with {teams} teams: {reason}")]
    InvalidInstance { teams: usize, reason: &'static str },

    #[error("naming collision: {0} allocated twice")]
    NamingCollision(String),

    #[error("oracle failure: {0}")]
    Oracle(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
