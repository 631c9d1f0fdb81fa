use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sigflow_core::common::{Params, ParamsExt};
use sigflow_core::load::error::LoadError;
use sigflow_core::load::port::Loader;
use sigflow_core::metric::entity::NormalizedMetric;
use sigflow_core::plugin::error::PluginError;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;
use tracing::info;

/// 默认数据库文件名，位于数据根目录下
pub const DEFAULT_DB_FILE: &str = "signals.db";

/// Loader 的 SQLite 实现，所有信号写入同一张 `financial_signals` 表。
///
/// # Summary
/// 以 `(signal_name, date)` 为唯一键做 upsert，同一天重复运行只保留最新值。
///
/// # Invariants
/// * 连接池惰性建立，首次写入时建表。
/// * `metadata` 以 JSON 文本存储。
pub struct SqliteLoader {
    path: PathBuf,
    pool: SqlitePool,
    schema: OnceCell<()>,
}

impl SqliteLoader {
    /// 从参数映射构造，`path` 缺省为 `<data_dir>/signals.db`。
    pub fn from_params(params: &Params) -> Result<Self, PluginError> {
        let path = params
            .get_str("path")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| crate::config::get_root_dir().join(DEFAULT_DB_FILE));
        Self::open(path)
    }

    /// 打开 (必要时创建) 指定路径的数据库。
    ///
    /// # Logic
    /// 1. 确保父目录存在。
    /// 2. 配置 SQLite 连接选项，开启 `create_if_missing`。
    /// 3. 建立惰性连接池。
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PluginError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                PluginError::Construction(format!("create {}: {}", parent.display(), e))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_lazy_with(options);

        Ok(Self {
            path,
            pool,
            schema: OnceCell::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn ensure_schema(&self) -> Result<(), LoadError> {
        self.schema
            .get_or_try_init(|| async {
                sqlx::query(
                    r#"
                    CREATE TABLE IF NOT EXISTS financial_signals (
                        id INTEGER PRIMARY KEY AUTOINCREMENT,
                        signal_name TEXT NOT NULL,
                        date TEXT NOT NULL,
                        value REAL NOT NULL,
                        units TEXT NOT NULL,
                        metadata TEXT,
                        updated_at TEXT NOT NULL,
                        UNIQUE (signal_name, date)
                    );
                    "#,
                )
                .execute(&self.pool)
                .await
                .map(|_| ())
                .map_err(|e| LoadError::Database(e.to_string()))
            })
            .await
            .map(|_| ())
    }

    /// # Summary
    /// 按日期升序读取某个信号的全部记录。
    pub async fn signal_history(&self, signal_name: &str) -> Result<Vec<NormalizedMetric>, LoadError> {
        self.ensure_schema().await?;
        let rows = sqlx::query_as::<_, (NaiveDate, f64, String, Option<String>)>(
            r#"
            SELECT date, value, units, metadata
            FROM financial_signals
            WHERE signal_name = ?
            ORDER BY date ASC
            "#,
        )
        .bind(signal_name)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| LoadError::Database(e.to_string()))?;

        rows.into_iter()
            .map(|(date, value, units, metadata)| {
                let metadata = match metadata {
                    Some(text) => serde_json::from_str(&text)
                        .map_err(|e| LoadError::Serialize(e.to_string()))?,
                    None => Default::default(),
                };
                Ok(NormalizedMetric {
                    value,
                    date,
                    units,
                    signal_name: signal_name.to_string(),
                    metadata,
                })
            })
            .collect()
    }
}

#[async_trait]
impl Loader for SqliteLoader {
    /// # Summary
    /// 写入或覆盖一条指标。
    ///
    /// # Returns
    /// * 写入成功返回 `Ok(true)`。
    async fn load(&self, metric: &NormalizedMetric) -> Result<bool, LoadError> {
        self.ensure_schema().await?;
        let metadata = serde_json::to_string(&metric.metadata)
            .map_err(|e| LoadError::Serialize(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO financial_signals (signal_name, date, value, units, metadata, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (signal_name, date) DO UPDATE SET
                value = excluded.value,
                units = excluded.units,
                metadata = excluded.metadata,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&metric.signal_name)
        .bind(metric.date)
        .bind(metric.value)
        .bind(&metric.units)
        .bind(metadata)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| LoadError::Database(e.to_string()))?;

        info!(
            signal = %metric.signal_name,
            date = %metric.date,
            value = metric.value,
            "Signal upserted into {}",
            self.path.display()
        );
        Ok(true)
    }
}
