use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

use crate::api::{ConfigurationSummary, SaveRequest, SavedConfiguration};
use crate::error::AppError;

const UNTITLED: &str = "Untitled Configuration";

/// Saved configurations, one row each, configuration body kept as JSON text
#[derive(Debug, Clone)]
pub struct ConfigurationRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct ConfigurationRow {
    id: String,
    name: String,
    model: Option<String>,
    configuration: String,
    total_price: f64,
    timestamp: String,
}

impl ConfigurationRow {
    fn into_saved(self) -> Result<SavedConfiguration, AppError> {
        let configuration = serde_json::from_str(&self.configuration).map_err(|e| {
            AppError::InternalError(format!("Stored configuration {} is corrupt: {}", self.id, e))
        })?;
        Ok(SavedConfiguration {
            id: self.id,
            name: self.name,
            model: self.model,
            configuration,
            total_price: self.total_price,
            timestamp: self.timestamp,
        })
    }
}

impl ConfigurationRepository {
    /// Open (creating if needed) the database at `url` and ensure the schema
    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        // Each in-memory connection is its own database, so keep exactly one
        // alive for the life of the pool
        let pool_options = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections)
        };

        let pool = pool_options.connect_with(options).await?;

        let repository = Self::new(pool);
        repository.init_schema().await?;
        info!(url = %url, "Configuration storage ready");
        Ok(repository)
    }

    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn init_schema(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS saved_configurations (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                model TEXT,
                configuration TEXT NOT NULL,
                total_price REAL NOT NULL,
                timestamp TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Store a snapshot and return it with its new id
    pub async fn insert(&self, request: &SaveRequest) -> Result<SavedConfiguration, AppError> {
        let name = match request.name.trim() {
            "" => UNTITLED.to_string(),
            name => name.to_string(),
        };
        let timestamp = if request.timestamp.is_empty() {
            chrono::Utc::now().to_rfc3339()
        } else {
            request.timestamp.clone()
        };

        let saved = SavedConfiguration {
            id: Uuid::new_v4().to_string(),
            name,
            model: request.model.clone(),
            configuration: request.configuration.clone(),
            total_price: request.total_price,
            timestamp,
        };

        sqlx::query(
            r#"
            INSERT INTO saved_configurations
            (id, name, model, configuration, total_price, timestamp, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&saved.id)
        .bind(&saved.name)
        .bind(&saved.model)
        .bind(serde_json::to_string(&saved.configuration)?)
        .bind(saved.total_price)
        .bind(&saved.timestamp)
        .bind(chrono::Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(saved)
    }

    pub async fn get(&self, id: &str) -> Result<Option<SavedConfiguration>, AppError> {
        let row = sqlx::query_as::<_, ConfigurationRow>(
            r#"
            SELECT id, name, model, configuration, total_price, timestamp
            FROM saved_configurations
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ConfigurationRow::into_saved).transpose()
    }

    /// Summaries, newest first
    pub async fn list(&self) -> Result<Vec<ConfigurationSummary>, AppError> {
        #[derive(sqlx::FromRow)]
        struct SummaryRow {
            id: String,
            name: String,
            model: Option<String>,
            total_price: f64,
            timestamp: String,
        }

        let rows = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT id, name, model, total_price, timestamp
            FROM saved_configurations
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ConfigurationSummary {
                id: row.id,
                name: row.name,
                model: row.model,
                total_price: row.total_price,
                timestamp: row.timestamp,
            })
            .collect())
    }

    /// Returns the deleted configuration's name, or `None` if absent
    pub async fn delete(&self, id: &str) -> Result<Option<String>, AppError> {
        let name: Option<String> =
            sqlx::query_scalar("SELECT name FROM saved_configurations WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        if name.is_some() {
            sqlx::query("DELETE FROM saved_configurations WHERE id = ?")
                .bind(id)
                .execute(&self.pool)
                .await?;
        }
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Configuration, Selection};

    async fn repository() -> ConfigurationRepository {
        ConfigurationRepository::connect("sqlite::memory:", 5)
            .await
            .unwrap()
    }

    fn request(name: &str) -> SaveRequest {
        let mut configuration = Configuration::new();
        configuration.set_exclusive("exterior_color", Selection::new("Black", 0.0));
        SaveRequest {
            name: name.to_string(),
            model: Some("X3".to_string()),
            configuration,
            total_price: 45000.0,
            timestamp: "2026-10-17T09:00:00.000Z".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let repo = repository().await;
        let saved = repo.insert(&request("Daily")).await.unwrap();

        let loaded = repo.get(&saved.id).await.unwrap().unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(loaded.configuration.selected_value("exterior_color"), Some("Black"));
    }

    #[tokio::test]
    async fn test_blank_name_becomes_untitled() {
        let repo = repository().await;
        let saved = repo.insert(&request("   ")).await.unwrap();
        assert_eq!(saved.name, UNTITLED);
    }

    #[tokio::test]
    async fn test_list_newest_first_and_delete() {
        let repo = repository().await;
        let first = repo.insert(&request("First")).await.unwrap();
        let second = repo.insert(&request("Second")).await.unwrap();

        let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Second", "First"]);

        assert_eq!(repo.delete(&first.id).await.unwrap().as_deref(), Some("First"));
        assert!(repo.delete(&first.id).await.unwrap().is_none());
        assert!(repo.get(&first.id).await.unwrap().is_none());
        assert!(repo.get(&second.id).await.unwrap().is_some());
    }
}
