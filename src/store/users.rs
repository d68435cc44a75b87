//! ユーザーテーブルへのアクセス層。
//!
//! ユーザー名は一意制約付きで保存する。重複登録は[`UserStoreError::DuplicateUsername`]
//! として呼び出し側に区別して返す。

use std::str::FromStr;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserStoreError {
    #[error("username is already taken")]
    DuplicateUsername,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// SQLite上のユーザーストア。
#[derive(Debug, Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

impl UserStore {
    /// DSNに接続してストアを構築し、スキーマを初期化する。
    ///
    /// # Errors
    /// 接続またはスキーマ初期化に失敗した場合はエラーを返す。
    pub async fn connect(dsn: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(dsn)
            .context("invalid users database DSN")?
            .create_if_missing(true);
        // メモリDBは接続ごとに独立したデータベースになるため、プールは1本に固定する。
        let max_connections = if dsn.contains(":memory:") {
            1
        } else {
            max_connections
        };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .context("failed to connect to users database")?;

        let store = Self { pool };
        store
            .init_schema()
            .await
            .context("failed to initialize users schema")?;

        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT UNIQUE,
                password TEXT
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// ユーザーを新規登録する。
    ///
    /// # Errors
    /// ユーザー名が使用済みの場合は[`UserStoreError::DuplicateUsername`]を返す。
    pub async fn add_user(&self, username: &str, password: &str) -> Result<(), UserStoreError> {
        let result = sqlx::query("INSERT INTO users (username, password) VALUES (?1, ?2)")
            .bind(username)
            .bind(password)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(UserStoreError::DuplicateUsername)
            }
            Err(err) => Err(UserStoreError::Database(err)),
        }
    }

    /// 接続確認。readinessプローブから呼ばれる。
    ///
    /// # Errors
    /// データベースに到達できない場合はエラーを返す。
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// 資格情報が登録済みのユーザーと一致するか検証する。
    ///
    /// # Errors
    /// データベースアクセスに失敗した場合はエラーを返す。
    pub async fn verify_user(&self, username: &str, password: &str) -> Result<bool, sqlx::Error> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM users WHERE username = ?1 AND password = ?2")
                .bind(username)
                .bind(password)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> UserStore {
        UserStore::connect("sqlite::memory:", 1)
            .await
            .expect("in-memory store")
    }

    #[tokio::test]
    async fn register_then_verify() {
        let store = store().await;

        store.add_user("alice", "secret").await.expect("add user");

        assert!(store.verify_user("alice", "secret").await.expect("verify"));
        assert!(!store.verify_user("alice", "wrong").await.expect("verify"));
        assert!(!store.verify_user("nobody", "secret").await.expect("verify"));
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let store = store().await;

        store.add_user("alice", "secret").await.expect("add user");
        let err = store
            .add_user("alice", "another")
            .await
            .expect_err("duplicate should fail");

        assert!(matches!(err, UserStoreError::DuplicateUsername));
    }

    #[tokio::test]
    async fn same_password_different_usernames_is_fine() {
        let store = store().await;

        store.add_user("alice", "secret").await.expect("add alice");
        store.add_user("bob", "secret").await.expect("add bob");

        assert!(store.verify_user("bob", "secret").await.expect("verify"));
    }
}
