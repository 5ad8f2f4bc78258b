//! Workload Module
//!
//! Random key/content generator and a concurrent fetch-driven workload used to
//! exercise a shared cache.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

use crate::cache::CacheStats;
use crate::config::WorkloadConfig;
use crate::shared::SharedRingCache;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// One generated key and the content cached for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub key: String,
    pub content: String,
}

// == Random Data ==
/// Generates `count` elements.
///
/// Keys are `key_length` distinct lowercase letters (at most 26), contents a
/// single letter. Keys may repeat across elements.
pub fn random_data<R: Rng + ?Sized>(count: usize, key_length: usize, rng: &mut R) -> Vec<Element> {
    (0..count)
        .map(|_| {
            let key = LETTERS
                .choose_multiple(&mut *rng, key_length)
                .map(|&b| b as char)
                .collect();
            let content = LETTERS
                .choose(&mut *rng)
                .map(|&b| (b as char).to_string())
                .unwrap_or_default();
            Element { key, content }
        })
        .collect()
}

/// Outcome of a workload run.
#[derive(Debug, Clone, Serialize)]
pub struct WorkloadReport {
    pub config: WorkloadConfig,
    pub elapsed_ms: u128,
    pub ops_per_sec: f64,
    pub hit_rate: f64,
    pub stats: CacheStats,
    /// RFC 3339 completion time
    pub finished_at: String,
}

// == Run Workload ==
/// Spawns `config.workers` tasks that together perform `config.operations`
/// fetches of uniformly sampled elements against `cache`.
pub async fn run_workload(
    cache: &SharedRingCache<String, String>,
    config: &WorkloadConfig,
) -> anyhow::Result<WorkloadReport> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let data = Arc::new(random_data(config.elements, config.key_length, &mut rng));
    let workers = config.workers.max(1);

    info!(
        "Starting workload: {} operations over {} elements with {} workers",
        config.operations,
        data.len(),
        workers
    );

    let started = Instant::now();
    let mut handles = Vec::with_capacity(workers);

    for worker in 0..workers {
        let operations = config.operations / workers
            + usize::from(worker < config.operations % workers);
        let cache = cache.clone();
        let data = Arc::clone(&data);
        let mut worker_rng = StdRng::seed_from_u64(rng.gen());

        handles.push(tokio::spawn(async move {
            for _ in 0..operations {
                let Some(element) = data.choose(&mut worker_rng) else {
                    break;
                };
                cache
                    .fetch(element.key.clone(), || element.content.clone())
                    .await?;
            }
            debug!("Worker {} finished {} operations", worker, operations);
            Ok::<(), crate::error::CacheError>(())
        }));
    }

    for handle in handles {
        handle
            .await
            .context("workload worker panicked")?
            .context("workload fetch failed")?;
    }

    let elapsed = started.elapsed();
    let stats = cache.stats().await;
    let ops_per_sec = if elapsed.as_secs_f64() > 0.0 {
        config.operations as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    };

    info!(
        "Workload finished in {:?}: {:.0} ops/s, hit_rate={:.3}, entries={}",
        elapsed,
        ops_per_sec,
        stats.hit_rate(),
        stats.total_entries
    );

    Ok(WorkloadReport {
        config: config.clone(),
        elapsed_ms: elapsed.as_millis(),
        ops_per_sec,
        hit_rate: stats.hit_rate(),
        stats,
        finished_at: chrono::Utc::now().to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;
    use std::collections::HashSet;

    #[test]
    fn test_random_data_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let data = random_data(100, 10, &mut rng);

        assert_eq!(data.len(), 100);
        for element in &data {
            assert_eq!(element.key.len(), 10);
            let letters: HashSet<char> = element.key.chars().collect();
            assert_eq!(letters.len(), 10, "key letters must be distinct");
            assert_eq!(element.content.len(), 1);
        }
    }

    #[test]
    fn test_random_data_is_reproducible() {
        let a = random_data(20, 5, &mut StdRng::seed_from_u64(42));
        let b = random_data(20, 5, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_random_data_key_length_capped() {
        let data = random_data(3, 40, &mut StdRng::seed_from_u64(1));
        assert!(data.iter().all(|e| e.key.len() == 26));
    }

    #[tokio::test]
    async fn test_run_workload_respects_capacity() {
        let cache = SharedRingCache::from_config(
            CacheConfig::new().with_capacity(100).with_target_hit_rate(0.4),
        )
        .unwrap();
        let config = WorkloadConfig {
            elements: 300,
            key_length: 6,
            operations: 2_000,
            workers: 3,
            seed: Some(11),
        };

        let report = run_workload(&cache, &config).await.unwrap();

        assert_eq!(report.stats.accesses, 2_000);
        assert!(report.stats.total_entries <= 100);
        assert!(cache.check_invariants().await.is_ok());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["config"]["operations"], 2_000);
        assert!(json["finished_at"].is_string());
    }

    #[tokio::test]
    async fn test_run_workload_with_no_elements() {
        let cache = SharedRingCache::from_config(CacheConfig::new()).unwrap();
        let config = WorkloadConfig {
            elements: 0,
            seed: Some(3),
            ..WorkloadConfig::default()
        };

        let report = run_workload(&cache, &config).await.unwrap();
        assert_eq!(report.stats.accesses, 0);
    }
}
