use chrono::NaiveDate;
use sqlx::PgPool;

/// 建表 (不存在时)
///
/// `table` 须已通过配置校验, 这里直接拼接
pub async fn ensure_usage_table(pool: &PgPool, table: &str) -> Result<(), sqlx::Error> {
    let sql = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            usage_date DATE PRIMARY KEY,
            used BIGINT NOT NULL DEFAULT 0
        )
        "#
    );
    sqlx::query(&sql).execute(pool).await?;
    Ok(())
}

/// 当日计数小于 limit 时原子地加一
///
/// 返回加一后的计数; 已达上限时不更新, 返回 None
pub async fn increment_if_below(
    pool: &PgPool,
    table: &str,
    day: NaiveDate,
    limit: i64,
) -> Result<Option<i64>, sqlx::Error> {
    let sql = format!(
        r#"
        INSERT INTO {table} AS u (usage_date, used)
        VALUES ($1, 1)
        ON CONFLICT (usage_date)
        DO UPDATE SET used = u.used + 1
        WHERE u.used < $2
        RETURNING used
        "#
    );
    sqlx::query_scalar::<_, i64>(&sql)
        .bind(day)
        .bind(limit)
        .fetch_optional(pool)
        .await
}
