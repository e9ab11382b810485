use async_trait::async_trait;
use cf_core::{Article, ArticleStorage, Error, Result, NO_VALUE_PLACEHOLDER};
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqliteRow};
use sqlx::Row;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use crate::StorageBackend;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://articles.db";

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        url TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        image_url TEXT,
        published TEXT NOT NULL,
        fetched_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS articles_fetched_at ON articles (fetched_at)
    "#,
];

pub struct SQLiteStorage {
    pool: Arc<SqlitePool>,
}

#[async_trait]
impl StorageBackend for SQLiteStorage {
    fn get_error_message() -> &'static str {
        "SQLite database should be reachable at the configured database url"
    }

    async fn new(backend_url: Option<&str>) -> Result<Self> {
        let url = backend_url.unwrap_or(DEFAULT_DATABASE_URL);
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| Error::Config(format!("Invalid database url {}: {}", url, e)))?
            .create_if_missing(true);
        Self::connect(options).await
    }
}

impl SQLiteStorage {
    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        Self::connect(options).await
    }

    async fn connect(options: SqliteConnectOptions) -> Result<Self> {
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| Error::Storage(format!("Failed to connect to database: {}", e)))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::Storage(format!("Failed to run migration {}: {}", i, e)))?;
        }

        Ok(Self { pool: Arc::new(pool) })
    }
}

// Fixed-width UTC timestamps so text ordering matches time ordering.
fn encode_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn article_from_row(row: &SqliteRow) -> Result<Article> {
    let fetched_at: String = row.get("fetched_at");
    let fetched_at = DateTime::parse_from_rfc3339(&fetched_at)
        .map_err(|e| Error::Storage(format!("Failed to parse date: {}", e)))?
        .with_timezone(&Utc);

    Ok(Article {
        title: row.get("title"),
        description: row.get("description"),
        url: row.get("url"),
        image_url: row.get::<Option<String>, _>("image_url"),
        published: row.get("published"),
        fetched_at,
    })
}

#[async_trait]
impl ArticleStorage for SQLiteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn insert_if_absent(&self, article: &Article) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO articles
            (url, title, description, image_url, published, fetched_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(url) DO NOTHING
            "#,
        )
        .bind(&article.url)
        .bind(&article.title)
        .bind(&article.description)
        .bind(article.image_url.as_deref())
        .bind(&article.published)
        .bind(encode_timestamp(&article.fetched_at))
        .execute(&*self.pool)
        .await
        .map_err(|e| Error::Storage(format!("Failed to store article: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_with_images(&self) -> Result<Vec<Article>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM articles
            WHERE image_url IS NOT NULL
              AND TRIM(image_url) != ''
              AND TRIM(image_url) != ?
            ORDER BY fetched_at DESC, rowid DESC
            "#,
        )
        .bind(NO_VALUE_PLACEHOLDER)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| Error::Storage(format!("Failed to list articles: {}", e)))?;

        rows.iter().map(article_from_row).collect()
    }

    async fn get_by_url(&self, url: &str) -> Result<Option<Article>> {
        let row = sqlx::query("SELECT * FROM articles WHERE url = ?")
            .bind(url)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| Error::Storage(format!("Failed to get article: {}", e)))?;

        row.as_ref().map(article_from_row).transpose()
    }

    async fn count(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| Error::Storage(format!("Failed to count articles: {}", e)))?;

        Ok(count as usize)
    }
}
