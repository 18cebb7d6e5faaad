//! Worker-pool execution of a [`BatchPlan`].

use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{info, warn};
use ts_output::{
    CsvSummaryWriter, JsonlWriter, LogRecord, OutputObserver, OutputWriter, SummaryRow, merge_outputs,
};
use ts_sim::{RunSummary, SimBuilder};

use crate::{BatchError, BatchPlan, BatchResult, RunSpec};

/// Result of one successful run.
#[derive(Clone, Debug)]
pub struct RunOutcome {
    pub combination: String,
    pub run_index:   u32,
    pub summary:     RunSummary,
}

/// Files produced by a successful batch.
#[derive(Clone, Debug)]
pub struct BatchReport {
    /// Outcomes in plan order.
    pub outcomes:  Vec<RunOutcome>,
    /// Merged `<id>.jsonl` per combination.
    pub logs:      Vec<PathBuf>,
    /// `<id>_summaries.csv` per combination.
    pub summaries: Vec<PathBuf>,
}

/// Hardware threads available to this process.
pub fn available_workers() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Reject a worker count the machine cannot run concurrently.
pub fn check_workers(requested: usize) -> BatchResult<()> {
    let available = available_workers();
    if requested > available {
        return Err(BatchError::TooManyWorkers { requested, available });
    }
    Ok(())
}

/// Execute every run of `plan` under `out_dir`.
///
/// Each run writes `<out_dir>/<id>/run_<k>.jsonl`.  When all runs succeed,
/// every combination's run files are merged into `<out_dir>/<id>.jsonl`
/// and its mote summaries written to `<out_dir>/<id>_summaries.csv`.  The
/// first failure aborts the batch without merging anything.
pub fn run_batch(plan: &BatchPlan, out_dir: &Path) -> BatchResult<BatchReport> {
    check_workers(plan.num_workers)?;
    for id in &plan.combinations {
        fs::create_dir_all(out_dir.join(id))?;
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(plan.num_workers)
        .thread_name(|i| format!("tsch-worker-{i}"))
        .build()?;
    info!(runs = plan.len(), workers = plan.num_workers, out = %out_dir.display(), "batch started");

    let outcomes: Vec<RunOutcome> = pool.install(|| {
        plan.runs
            .par_iter()
            .map(|spec| {
                run_one(spec, &run_path(out_dir, spec)).map_err(|e| {
                    warn!(combination = %spec.combination, run = spec.run_index, error = %e, "run failed");
                    BatchError::Run {
                        combination: spec.combination.clone(),
                        run:         spec.run_index,
                        source:      Box::new(e),
                    }
                })
            })
            .collect::<BatchResult<Vec<_>>>()
    })?;

    let mut logs = Vec::with_capacity(plan.combinations.len());
    let mut summaries = Vec::with_capacity(plan.combinations.len());
    for id in &plan.combinations {
        let sources: Vec<PathBuf> = plan.runs_of(id).map(|spec| run_path(out_dir, spec)).collect();
        let log = out_dir.join(format!("{id}.jsonl"));
        merge_outputs(&sources, &log)?;
        fs::remove_dir(out_dir.join(id))?;

        let csv = out_dir.join(format!("{id}_summaries.csv"));
        let mut writer = CsvSummaryWriter::create(&csv)?;
        for outcome in outcomes.iter().filter(|o| &o.combination == id) {
            for mote in &outcome.summary.motes {
                writer.write_record(&LogRecord::MoteSummary(SummaryRow::new(outcome.run_index, mote)))?;
            }
        }
        writer.finish()?;

        logs.push(log);
        summaries.push(csv);
    }

    info!(runs = outcomes.len(), combinations = logs.len(), "batch finished");
    Ok(BatchReport { outcomes, logs, summaries })
}

/// Run one simulation to completion, logging to `path`.
pub fn run_one(spec: &RunSpec, path: &Path) -> BatchResult<RunOutcome> {
    let writer = JsonlWriter::create(path, spec.run_index, &spec.combination, &spec.settings)?;
    let mut observer = OutputObserver::new(writer, spec.run_index);

    let mut sim = SimBuilder::new(spec.settings.clone()).build()?;
    let summary = sim.run(&mut observer)?;
    sim.teardown();
    if let Some(e) = observer.take_error() {
        return Err(e.into());
    }

    info!(
        combination = %spec.combination,
        run = spec.run_index,
        delivered = summary.delivered,
        generated = summary.generated,
        "run finished"
    );
    Ok(RunOutcome { combination: spec.combination.clone(), run_index: spec.run_index, summary })
}

fn run_path(out_dir: &Path, spec: &RunSpec) -> PathBuf {
    out_dir.join(&spec.combination).join(format!("run_{}.jsonl", spec.run_index))
}
