//! Parallel resolution of a descriptor list.
//!
//! Each descriptor touches only its own destination path and shares nothing
//! mutable, so the list is resolved by a bounded pool of worker threads
//! pulling from a common queue. One artifact's failure does not abort the
//! others; the caller decides whether to fail fast on the collected results.

use crate::config::BuildConfig;
use crate::descriptor::ResourceDescriptor;
use crate::error::ResolveError;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};

/// Resolve every descriptor into `target_dir` using at most `max_workers`
/// threads. Results are returned in descriptor order, one per input.
pub fn resolve_all(
    descriptors: &[ResourceDescriptor],
    target_dir: &Path,
    cfg: &BuildConfig,
    max_workers: usize,
) -> Vec<Result<PathBuf, ResolveError>> {
    if descriptors.is_empty() {
        return Vec::new();
    }
    let workers = max_workers.max(1).min(descriptors.len());

    let work: Mutex<VecDeque<usize>> = Mutex::new((0..descriptors.len()).collect());
    let (tx, rx) = mpsc::channel();

    std::thread::scope(|scope| {
        for _ in 0..workers {
            let tx = tx.clone();
            let work = &work;
            scope.spawn(move || loop {
                let index = match work.lock().unwrap().pop_front() {
                    Some(index) => index,
                    None => break,
                };
                let descriptor = &descriptors[index];
                tracing::debug!(artifact = %descriptor.name, "resolving");
                let result = descriptor.resolve(target_dir, cfg);
                if let Err(e) = &result {
                    tracing::warn!(artifact = %descriptor.name, "resolution failed: {}", e);
                }
                if tx.send((index, result)).is_err() {
                    break;
                }
            });
        }
        drop(tx);
    });

    let mut slots: Vec<Option<Result<PathBuf, ResolveError>>> =
        (0..descriptors.len()).map(|_| None).collect();
    for (index, result) in rx {
        slots[index] = Some(result);
    }
    slots
        .into_iter()
        .map(|slot| {
            slot.unwrap_or_else(|| {
                Err(ResolveError::config("resolution worker exited early"))
            })
        })
        .collect()
}

/// Resolve every descriptor into the configured work directory, creating it
/// first if needed.
pub fn resolve_into_work_dir(
    descriptors: &[ResourceDescriptor],
    cfg: &BuildConfig,
    max_workers: usize,
) -> Result<Vec<Result<PathBuf, ResolveError>>, ResolveError> {
    std::fs::create_dir_all(&cfg.work_dir)
        .map_err(|e| ResolveError::io(format!("create {}", cfg.work_dir.display()), e))?;
    Ok(resolve_all(descriptors, &cfg.work_dir, cfg, max_workers))
}
