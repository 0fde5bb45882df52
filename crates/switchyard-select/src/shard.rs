//! Duration-balanced shard assignment

use std::collections::BTreeSet;

use thiserror::Error;
use tracing::{debug, info};

use crate::durations::DurationStore;

/// Weight given to every test when no duration history exists at all
const COLD_START_WEIGHT_SECS: f64 = 1.0;

/// Shard argument validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShardError {
    /// Shard count below one
    #[error("Shard count must be at least 1")]
    ZeroShards,

    /// Shard index outside the 1-based range
    #[error("Shard index {index} out of range 1..={count}")]
    IndexOutOfRange { index: usize, count: usize },
}

/// A deterministic partition of the eligible tests across shards.
///
/// Classic longest-processing-time-first packing: tests are weighted by
/// known duration (unseen tests get the mean of the known ones), sorted
/// heaviest first with ties broken by test id, and each is placed on
/// the currently lightest shard, lowest index on ties. The slowest
/// shard stays within (2 - 1/count) of the optimal makespan.
#[derive(Debug, Clone)]
pub struct ShardPlan {
    shards: Vec<Vec<String>>,
    loads: Vec<f64>,
}

impl ShardPlan {
    /// Partition `tests` across `count` shards
    pub fn build(
        tests: &BTreeSet<String>,
        durations: &DurationStore,
        count: usize,
    ) -> Result<Self, ShardError> {
        if count == 0 {
            return Err(ShardError::ZeroShards);
        }

        let unseen_weight = durations.mean().unwrap_or(COLD_START_WEIGHT_SECS);
        let mut weighted: Vec<(&String, f64)> = tests
            .iter()
            .map(|test| (test, durations.get(test).unwrap_or(unseen_weight)))
            .collect();
        weighted.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });

        let mut shards = vec![Vec::new(); count];
        let mut loads = vec![0.0f64; count];
        for (test, weight) in weighted {
            let lightest = lightest_shard(&loads);
            loads[lightest] += weight;
            shards[lightest].push(test.clone());
            debug!(test = %test, weight, shard = lightest + 1, "assigned test");
        }

        info!(
            tests = tests.len(),
            shards = count,
            max_load = max_load(&loads),
            "shard plan built"
        );
        Ok(Self { shards, loads })
    }

    /// Tests assigned to the 1-based shard `index`, in assignment order
    pub fn assign(&self, index: usize) -> Result<&[String], ShardError> {
        self.check_index(index)?;
        Ok(&self.shards[index - 1])
    }

    /// Estimated cumulative seconds for the 1-based shard `index`
    pub fn estimated_load(&self, index: usize) -> Result<f64, ShardError> {
        self.check_index(index)?;
        Ok(self.loads[index - 1])
    }

    /// Number of shards in the plan
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    fn check_index(&self, index: usize) -> Result<(), ShardError> {
        if index == 0 || index > self.shards.len() {
            return Err(ShardError::IndexOutOfRange {
                index,
                count: self.shards.len(),
            });
        }
        Ok(())
    }
}

fn lightest_shard(loads: &[f64]) -> usize {
    let mut best = 0;
    for (i, load) in loads.iter().enumerate().skip(1) {
        if *load < loads[best] {
            best = i;
        }
    }
    best
}

fn max_load(loads: &[f64]) -> f64 {
    loads.iter().copied().fold(0.0, f64::max)
}
