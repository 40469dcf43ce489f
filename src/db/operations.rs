use crate::auth::{AppProvider, UserProvider, UserSaver};
use crate::db::models::{App, User};
use crate::error::StoreError;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

/// The one concrete credential store. Satisfies all three capability traits
/// consumed by the authentication service.
///
/// Email uniqueness is enforced by the schema's UNIQUE constraint, never by
/// a read-then-write in this layer; concurrent inserts for the same email
/// resolve to exactly one success and one [`StoreError::UserExists`].
pub struct SqlStorage {
    pool: SqlitePool,
}

impl SqlStorage {
    pub async fn connect(path: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Applies the embedded migrations. Schema evolution is owned by the
    /// migration files, not by any query in this module.
    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl UserSaver for SqlStorage {
    async fn save_user(&self, email: &str, pass_hash: &str) -> Result<i64, StoreError> {
        let result = sqlx::query("INSERT INTO users (email, pass_hash) VALUES (?, ?)")
            .bind(email)
            .bind(pass_hash)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) => Ok(done.last_insert_rowid()),
            Err(err) => {
                if let Some(db_err) = err.as_database_error() {
                    if db_err.is_unique_violation() {
                        return Err(StoreError::UserExists);
                    }
                }
                Err(StoreError::Database(err))
            }
        }
    }
}

#[async_trait]
impl UserProvider for SqlStorage {
    async fn user_by_email(&self, email: &str) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, pass_hash, is_admin FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::UserNotFound)
    }

    async fn is_admin(&self, user_id: i64) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>("SELECT is_admin FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::UserNotFound)
    }
}

#[async_trait]
impl AppProvider for SqlStorage {
    async fn app(&self, app_id: i64) -> Result<App, StoreError> {
        sqlx::query_as::<_, App>("SELECT id, name, secret FROM apps WHERE id = ?")
            .bind(app_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::AppNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_storage() -> SqlStorage {
        // One connection only: every pooled connection to `:memory:` would
        // otherwise see its own empty database.
        let storage = SqlStorage::connect(":memory:", 1)
            .await
            .expect("Failed to open in-memory store");
        storage
            .run_migrations()
            .await
            .expect("Failed to run migrations");
        storage
    }

    async fn seed_app(storage: &SqlStorage, id: i64, name: &str, secret: &str) {
        sqlx::query("INSERT INTO apps (id, name, secret) VALUES (?, ?, ?)")
            .bind(id)
            .bind(name)
            .bind(secret)
            .execute(storage.pool())
            .await
            .expect("Failed to seed app");
    }

    #[tokio::test]
    async fn test_save_and_fetch_user() {
        let storage = setup_storage().await;

        let id = storage
            .save_user("someone@example.com", "$2b$12$fakehash")
            .await
            .unwrap();
        assert_eq!(id, 1);

        let user = storage.user_by_email("someone@example.com").await.unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(user.email, "someone@example.com");
        assert_eq!(user.pass_hash, "$2b$12$fakehash");
        assert!(!user.is_admin);

        // Ids keep incrementing.
        let second = storage
            .save_user("other@example.com", "$2b$12$otherhash")
            .await
            .unwrap();
        assert_eq!(second, 2);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_unique_violation() {
        let storage = setup_storage().await;

        storage
            .save_user("dup@example.com", "$2b$12$fakehash")
            .await
            .unwrap();

        let err = storage
            .save_user("dup@example.com", "$2b$12$differenthash")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UserExists));
    }

    #[tokio::test]
    async fn test_unknown_email_not_found() {
        let storage = setup_storage().await;

        let err = storage.user_by_email("ghost@example.com").await.unwrap_err();
        assert!(matches!(err, StoreError::UserNotFound));
    }

    #[tokio::test]
    async fn test_admin_flag_lookup() {
        let storage = setup_storage().await;

        let id = storage
            .save_user("plain@example.com", "$2b$12$fakehash")
            .await
            .unwrap();
        assert!(!storage.is_admin(id).await.unwrap());

        sqlx::query("UPDATE users SET is_admin = 1 WHERE id = ?")
            .bind(id)
            .execute(storage.pool())
            .await
            .unwrap();
        assert!(storage.is_admin(id).await.unwrap());

        let err = storage.is_admin(9999).await.unwrap_err();
        assert!(matches!(err, StoreError::UserNotFound));
    }

    #[tokio::test]
    async fn test_app_lookup() {
        let storage = setup_storage().await;
        seed_app(&storage, 1, "test-app", "test-secret").await;

        let app = storage.app(1).await.unwrap();
        assert_eq!(app.id, 1);
        assert_eq!(app.name, "test-app");
        assert_eq!(app.secret, "test-secret");

        let err = storage.app(42).await.unwrap_err();
        assert!(matches!(err, StoreError::AppNotFound));
    }
}
