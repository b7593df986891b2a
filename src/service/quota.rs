use crate::db;
use crate::error::AppResult;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use sqlx::PgPool;
use std::sync::Arc;

/// 每日计数存储
///
/// `try_increment` 必须是单个原子的条件更新: 判断与加一之间不能有并发请求插入
#[async_trait]
pub trait UsageCounter: Send + Sync {
    /// 当日计数小于 limit 时加一并返回 true, 否则返回 false
    async fn try_increment(&self, day: NaiveDate, limit: i64) -> AppResult<bool>;
}

/// Postgres 计数表
pub struct PgUsageCounter {
    pool: PgPool,
    table: String,
}

impl PgUsageCounter {
    pub fn new(pool: PgPool, table: impl Into<String>) -> Self {
        Self {
            pool,
            table: table.into(),
        }
    }

    pub async fn ensure_schema(&self) -> AppResult<()> {
        db::ensure_usage_table(&self.pool, &self.table).await?;
        Ok(())
    }
}

#[async_trait]
impl UsageCounter for PgUsageCounter {
    async fn try_increment(&self, day: NaiveDate, limit: i64) -> AppResult<bool> {
        let used = db::increment_if_below(&self.pool, &self.table, day, limit).await?;
        if let Some(used) = used {
            tracing::debug!("Usage for {}: {}/{}", day, used, limit);
        }
        Ok(used.is_some())
    }
}

/// 进程内计数, 单实例部署和测试使用
#[derive(Default)]
pub struct MemoryUsageCounter {
    counts: DashMap<NaiveDate, i64>,
}

impl MemoryUsageCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn used(&self, day: NaiveDate) -> i64 {
        self.counts.get(&day).map(|c| *c).unwrap_or(0)
    }
}

#[async_trait]
impl UsageCounter for MemoryUsageCounter {
    async fn try_increment(&self, day: NaiveDate, limit: i64) -> AppResult<bool> {
        // entry 持有分片写锁, 判断和加一在同一临界区内
        let mut used = self.counts.entry(day).or_insert(0);
        if *used < limit {
            *used += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/// 每日配额 (按 UTC 日期)
pub struct DailyQuota {
    counter: Arc<dyn UsageCounter>,
    limit: i64,
}

impl DailyQuota {
    pub fn new(counter: Arc<dyn UsageCounter>, limit: i64) -> Self {
        Self { counter, limit }
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// 允许返回 true, 当日已达上限返回 false; 存储层其他错误向上传播
    pub async fn enforce_daily_limit(&self) -> AppResult<bool> {
        self.enforce_on(Utc::now().date_naive()).await
    }

    pub async fn enforce_on(&self, day: NaiveDate) -> AppResult<bool> {
        if self.limit <= 0 {
            return Ok(false);
        }

        let allowed = self.counter.try_increment(day, self.limit).await?;
        if !allowed {
            tracing::warn!("Daily limit {} reached for {}", self.limit, day.format("%Y-%m-%d"));
        }
        Ok(allowed)
    }
}
