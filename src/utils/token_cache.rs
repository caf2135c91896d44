use anyhow::Result;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::time::Duration;

/// Resolved worker identity for a QR token.
#[derive(Debug, Clone)]
pub struct CachedWorker {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
}

pub static TOKEN_CACHE: Lazy<Cache<String, CachedWorker>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(500_000) // tune based on memory
        .time_to_live(Duration::from_secs(86400)) // 24h TTL
        .build()
});

/// Cache the worker a QR token resolves to
pub async fn mark(token: &str, worker: CachedWorker) {
    TOKEN_CACHE.insert(token.trim().to_string(), worker).await;
}

/// Resolve a QR token from cache only
pub async fn get(token: &str) -> Option<CachedWorker> {
    TOKEN_CACHE.get(token.trim()).await
}

/// Batch cache resolved workers
async fn batch_mark(rows: &[(String, CachedWorker)]) {
    let futures: Vec<_> = rows
        .iter()
        .map(|(token, worker)| TOKEN_CACHE.insert(token.trim().to_string(), worker.clone()))
        .collect();

    futures::future::join_all(futures).await;
}

/// Load active workers' tokens into the in-memory cache (batched)
pub async fn warmup_token_cache(pool: &MySqlPool, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (String, u64, String, String)>(
        r#"
        SELECT qr_token, id, first_name, last_name
        FROM users
        WHERE is_active = 1
        "#,
    )
    .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total = 0usize;

    while let Some(row) = stream.next().await {
        let (token, id, first_name, last_name) = row?;

        batch.push((
            token,
            CachedWorker {
                id,
                first_name,
                last_name,
            },
        ));
        total += 1;

        if batch.len() == batch_size {
            batch_mark(&batch).await;
            batch.clear();
        }
    }

    if !batch.is_empty() {
        batch_mark(&batch).await;
    }

    tracing::info!(total, "QR token cache warmed up");
    Ok(())
}
