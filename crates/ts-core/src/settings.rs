//! Run settings and parameter-sweep expansion.
//!
//! A config file is JSON of the form
//!
//! ```json
//! {
//!   "settings": {
//!     "regular":     { "num_motes": 10, "seed": 7 },
//!     "combination": { "num_channels": [1, 16], "topology": ["RANDOM", "BINARY_TREE"] }
//!   }
//! }
//! ```
//!
//! `regular` fields are fixed for every run; `combination` lists axes whose
//! cartesian product yields one [`Combination`] per point.  Axes are expanded
//! in key order so the combination list (and each id) is deterministic.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{CoreError, CoreResult, SlotClock};

/// Instantiated parameters for one simulation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub num_motes:              u32,
    pub num_runs:               u32,
    pub num_workers:            usize,
    /// Master seed; run `k` of a combination uses `seed + k`.
    pub seed:                   u64,
    /// Topology strategy name (`RANDOM`, `FULL_MESH`, `BINARY_TREE`, …).
    pub topology:               String,
    /// RPL objective function name (`OFBestLinkPDR`, `OF0`).
    pub objective_function:     String,
    pub num_channels:           u8,
    pub slotframe_length:       u64,
    pub slot_duration_secs:     f64,
    pub num_slotframes_per_run: u64,
    pub app_pk_period_secs:     f64,
    /// Relative spread of the packet period, e.g. 0.05 = ±5 %.
    pub app_pk_period_var:      f64,
    pub eb_period_secs:         f64,
    pub dio_period_secs:        f64,
    pub max_tx_retries:         u8,
    pub tx_queue_size:          usize,
    /// PDR of every link not explicitly set in the connectivity matrix.
    pub baseline_pdr:           f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            num_motes:              10,
            num_runs:               1,
            num_workers:            1,
            seed:                   0,
            topology:               "FULL_MESH".to_owned(),
            objective_function:     "OFBestLinkPDR".to_owned(),
            num_channels:           16,
            slotframe_length:       101,
            slot_duration_secs:     0.010,
            num_slotframes_per_run: 1_000,
            app_pk_period_secs:     60.0,
            app_pk_period_var:      0.05,
            eb_period_secs:         10.0,
            dio_period_secs:        10.0,
            max_tx_retries:         5,
            tx_queue_size:          10,
            baseline_pdr:           1.0,
        }
    }
}

impl Settings {
    /// Check numeric ranges.  Strategy and objective-function names are
    /// checked by the crates that own those enums.
    pub fn validate(&self) -> CoreResult<()> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> CoreError {
            CoreError::InvalidSetting { field, reason: reason.into() }
        }

        if self.num_motes == 0 {
            return Err(invalid("num_motes", "must be at least 1"));
        }
        if self.num_runs == 0 {
            return Err(invalid("num_runs", "must be at least 1"));
        }
        if self.num_workers == 0 {
            return Err(invalid("num_workers", "must be at least 1"));
        }
        if self.num_channels == 0 {
            return Err(invalid("num_channels", "must be at least 1"));
        }
        if self.slotframe_length == 0 {
            return Err(invalid("slotframe_length", "must be at least 1"));
        }
        for (field, value) in [
            ("slot_duration_secs", self.slot_duration_secs),
            ("app_pk_period_secs", self.app_pk_period_secs),
            ("eb_period_secs", self.eb_period_secs),
            ("dio_period_secs", self.dio_period_secs),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(field, format!("must be a positive number, got {value}")));
            }
        }
        if !(0.0..=1.0).contains(&self.app_pk_period_var) {
            return Err(invalid("app_pk_period_var", "must lie in [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.baseline_pdr) {
            return Err(invalid("baseline_pdr", "must lie in [0, 1]"));
        }
        if self.tx_queue_size == 0 {
            return Err(invalid("tx_queue_size", "must be at least 1"));
        }
        Ok(())
    }

    /// Slot clock configured for this run.
    pub fn clock(&self) -> SlotClock {
        SlotClock::new(self.slot_duration_secs, self.slotframe_length)
    }

    /// Virtual end time of a run, in slots.
    pub fn run_length_slots(&self) -> u64 {
        self.num_slotframes_per_run.saturating_mul(self.slotframe_length)
    }
}

// ── Config file & sweep ──────────────────────────────────────────────────────

/// On-disk configuration record.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub settings: SettingsSection,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SettingsSection {
    #[serde(default)]
    pub regular:     Map<String, Value>,
    #[serde(default)]
    pub combination: BTreeMap<String, Vec<Value>>,
}

/// One point of the parameter sweep.
#[derive(Clone, Debug, PartialEq)]
pub struct Combination {
    /// Stable label, e.g. `"num_channels=16_topology=RANDOM"`.
    pub id:       String,
    pub settings: Settings,
}

impl ConfigFile {
    pub fn from_path(path: &Path) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Expand the cartesian product of all combination axes.
    ///
    /// Without axes, yields exactly one combination with id `"default"`.
    /// Every produced `Settings` is validated.
    pub fn expand(&self) -> CoreResult<Vec<Combination>> {
        let mut points: Vec<Vec<(&str, &Value)>> = vec![Vec::new()];
        for (key, values) in &self.settings.combination {
            if values.is_empty() {
                return Err(CoreError::Config(format!("combination axis `{key}` has no values")));
            }
            points = points
                .into_iter()
                .flat_map(|prefix| {
                    values.iter().map(move |v| {
                        let mut point = prefix.clone();
                        point.push((key.as_str(), v));
                        point
                    })
                })
                .collect();
        }

        points
            .into_iter()
            .map(|point| {
                let mut merged = self.settings.regular.clone();
                for &(key, value) in &point {
                    merged.insert(key.to_owned(), value.clone());
                }
                let settings: Settings = serde_json::from_value(Value::Object(merged))?;
                settings.validate()?;
                Ok(Combination { id: combination_id(&point), settings })
            })
            .collect()
    }
}

fn combination_id(point: &[(&str, &Value)]) -> String {
    if point.is_empty() {
        return "default".to_owned();
    }
    point
        .iter()
        .map(|(key, value)| match value {
            Value::String(s) => format!("{key}={s}"),
            other => format!("{key}={other}"),
        })
        .collect::<Vec<_>>()
        .join("_")
}
