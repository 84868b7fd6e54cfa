use chrono::{DateTime, Utc};

/// A rider/driver account; immutable after signup, never deleted
#[derive(Debug, Clone)]
pub struct Account {
    pub username: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
}
