use crate::{corrupt_row, map_sqlx_err};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ridesync_core::repository::{AccountRepository, StoreResult};
use ridesync_core::Account;
use sqlx::{Pool, Sqlite};

pub struct SqliteAccountRepository {
    pool: Pool<Sqlite>,
}

impl SqliteAccountRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct AccountRow {
    username: String,
    password: String,
    created_at: i64,
}

impl AccountRow {
    fn into_account(self) -> StoreResult<Account> {
        let created_at = DateTime::<Utc>::from_timestamp(self.created_at, 0)
            .ok_or_else(|| corrupt_row("accounts", format!("timestamp {}", self.created_at)))?;

        Ok(Account {
            username: self.username,
            password: self.password,
            created_at,
        })
    }
}

#[async_trait]
impl AccountRepository for SqliteAccountRepository {
    async fn create(&self, username: &str, password: &str) -> StoreResult<()> {
        sqlx::query("INSERT INTO accounts (username, password, created_at) VALUES (?1, ?2, ?3)")
            .bind(username)
            .bind(password)
            .bind(Utc::now().timestamp())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        Ok(())
    }

    async fn find(&self, username: &str) -> StoreResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            "SELECT username, password, created_at FROM accounts WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        row.map(AccountRow::into_account).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DbClient;
    use ridesync_core::StoreError;

    async fn repo() -> SqliteAccountRepository {
        let db = DbClient::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        SqliteAccountRepository::new(db.pool)
    }

    #[tokio::test]
    async fn create_then_verify() {
        let accounts = repo().await;
        accounts.create("p1", "123").await.unwrap();

        assert!(accounts.verify("p1", "123").await.unwrap());
        assert!(!accounts.verify("p1", "wrong").await.unwrap());
        assert!(!accounts.verify("ghost", "123").await.unwrap());
    }

    #[tokio::test]
    async fn find_returns_the_stored_account() {
        let accounts = repo().await;
        accounts.create("p1", "123").await.unwrap();

        let account = accounts.find("p1").await.unwrap().unwrap();
        assert_eq!(account.username, "p1");
        assert_eq!(account.password, "123");
        assert!(accounts.find("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_is_a_unique_violation() {
        let accounts = repo().await;
        accounts.create("p1", "123").await.unwrap();

        let err = accounts.create("p1", "456").await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(_)));
    }
}
