use sqlx::{Row, SqlitePool};

/// Indicator columns introduced after the original schema shipped.
/// Rows written before a column existed simply carry NULL there until
/// their `(symbol, date)` is next upserted.
const INDICATOR_COLUMNS: &[&str] = &["macd", "macd_signal", "macd_hist", "rsi", "atr"];

/// Introspects `stock_daily`'s current column set and adds whichever of
/// `INDICATOR_COLUMNS` is missing. Never returns an error to the
/// caller: a failed `ALTER TABLE` is logged and skipped so an older
/// SQLite build or a locked file does not crash startup.
pub async fn run_lazy_migration(pool: &SqlitePool) {
    let existing = match sqlx::query("PRAGMA table_info(stock_daily)").fetch_all(pool).await {
        Ok(rows) => rows
            .iter()
            .filter_map(|row| row.try_get::<String, _>("name").ok())
            .collect::<Vec<_>>(),
        Err(err) => {
            tracing::warn!("could not introspect stock_daily columns: {err}");
            return;
        }
    };

    for column in INDICATOR_COLUMNS {
        if existing.iter().any(|c| c == column) {
            continue;
        }
        let stmt = format!("ALTER TABLE stock_daily ADD COLUMN {column} REAL");
        match sqlx::query(&stmt).execute(pool).await {
            Ok(_) => tracing::info!(column, "added missing indicator column"),
            Err(err) => tracing::warn!(column, "failed to add indicator column: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn adds_missing_indicator_columns_idempotently() {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        for stmt in include_str!("schema.sql").split(';') {
            let stmt = stmt.trim();
            if !stmt.is_empty() {
                sqlx::query(stmt).execute(&pool).await.unwrap();
            }
        }

        run_lazy_migration(&pool).await;
        run_lazy_migration(&pool).await;

        let rows = sqlx::query("PRAGMA table_info(stock_daily)").fetch_all(&pool).await.unwrap();
        let names: Vec<String> = rows.iter().map(|r| r.get::<String, _>("name")).collect();
        for column in INDICATOR_COLUMNS {
            assert!(names.contains(&column.to_string()), "missing column {column}");
        }
    }
}
