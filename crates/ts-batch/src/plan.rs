//! Expansion of a config file into independent runs.

use ts_core::{Combination, ConfigFile, Settings};
use ts_mote::OfKind;
use ts_net::TopologyKind;

use crate::{BatchError, BatchResult};

/// One simulation run: a combination point plus a run index.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSpec {
    pub combination: String,
    pub run_index:   u32,
    /// Combination settings with `seed` replaced by `seed + run_index`.
    pub settings:    Settings,
}

/// Every run of a sweep, in combination order then run order.
#[derive(Clone, Debug, PartialEq)]
pub struct BatchPlan {
    pub num_workers:  usize,
    /// Combination ids in expansion order.
    pub combinations: Vec<String>,
    pub runs:         Vec<RunSpec>,
}

impl BatchPlan {
    /// Expand `file` and validate every combination up front, so a bad name
    /// anywhere in the sweep fails before the first run starts.
    pub fn from_config(file: &ConfigFile) -> BatchResult<Self> {
        Self::from_combinations(file.expand()?)
    }

    pub fn from_combinations(combinations: Vec<Combination>) -> BatchResult<Self> {
        let mut runs = Vec::new();
        let mut ids = Vec::with_capacity(combinations.len());
        let mut num_workers = 1;

        for combination in combinations {
            let Combination { id, settings } = combination;
            TopologyKind::parse_supported(&settings.topology)
                .map_err(|source| BatchError::Topology { combination: id.clone(), source })?;
            settings
                .objective_function
                .parse::<OfKind>()
                .map_err(|source| BatchError::Objective { combination: id.clone(), source })?;

            num_workers = num_workers.max(settings.num_workers);
            for run_index in 0..settings.num_runs {
                let mut run_settings = settings.clone();
                run_settings.seed = settings.seed.wrapping_add(u64::from(run_index));
                runs.push(RunSpec { combination: id.clone(), run_index, settings: run_settings });
            }
            ids.push(id);
        }

        Ok(Self { num_workers, combinations: ids, runs })
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Runs of one combination, in run order.
    pub fn runs_of<'a>(&'a self, combination: &'a str) -> impl Iterator<Item = &'a RunSpec> + 'a {
        self.runs.iter().filter(move |r| r.combination == combination)
    }
}
