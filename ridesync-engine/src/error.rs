use ridesync_core::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The passenger already holds a non-terminal request; nothing was
    /// written
    #[error("passenger {0} already has an active request")]
    DuplicateActiveRequest(String),

    /// The accept race went to another driver; re-fetch and move on
    #[error("request {0} was already taken by another driver")]
    AlreadyTaken(i64),

    /// The id no longer names an open request
    #[error("request {0} not found or no longer open")]
    NotFound(i64),

    /// Persistence is unreachable this cycle; the caller's next poll is the
    /// retry
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(msg) => EngineError::DuplicateActiveRequest(msg),
            StoreError::Unavailable(source) => EngineError::StoreUnavailable(source),
        }
    }
}
