use anyhow::{Result, anyhow};
use autoscale_cuckoo_filter::CuckooFilter;
use futures::StreamExt;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::sync::RwLock;

/// Expected capacity and false-positive rate.
/// Tune these based on real workforce size.
const FILTER_CAPACITY: usize = 100_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

static TOKEN_FILTER: Lazy<RwLock<CuckooFilter<String>>> =
    Lazy::new(|| RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)));

#[inline]
fn normalize(token: &str) -> String {
    token.trim().to_string()
}

/// Check if a QR token might exist (false positives possible)
pub fn might_exist(token: &str) -> bool {
    let token = normalize(token);
    TOKEN_FILTER
        .read()
        .expect("token filter poisoned")
        .contains(&token)
}

/// Insert a single QR token into the filter
pub fn insert(token: &str) {
    let token = normalize(token);
    TOKEN_FILTER
        .write()
        .expect("token filter poisoned")
        .add(&token);
}

/// Remove a QR token from the filter
pub fn remove(token: &str) {
    let token = normalize(token);
    TOKEN_FILTER
        .write()
        .expect("token filter poisoned")
        .remove(&token);
}

/// Warm up the token filter using streaming + batching
pub async fn warmup_token_filter(pool: &MySqlPool, batch_size: usize) -> Result<()> {
    let mut stream =
        sqlx::query_as::<_, (String,)>("SELECT qr_token FROM users WHERE is_active = 1")
            .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total = 0usize;

    while let Some(row) = stream.next().await {
        let (token,) = row.map_err(|e| anyhow!("DB row fetch failed: {}", e))?;

        batch.push(normalize(&token));
        total += 1;

        if batch.len() == batch_size {
            let mut filter = TOKEN_FILTER.write().expect("token filter poisoned");
            for token in batch.drain(..) {
                filter.add(&token);
            }
        }
    }

    if !batch.is_empty() {
        let mut filter = TOKEN_FILTER.write().expect("token filter poisoned");
        for token in batch.drain(..) {
            filter.add(&token);
        }
    }

    tracing::info!(total, "QR token filter warmed up");
    Ok(())
}
