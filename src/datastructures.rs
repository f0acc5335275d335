use core::fmt;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by topology generation and assignment loading.
#[derive(Debug, Error)]
pub enum Error {
    /// A topology parameter is out of range (zero depth, zero base values,
    /// or a capacity/power gradient that would go negative).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// A persisted placement file contains unknown variable names or
    /// non-binary values.
    #[error("corrupt handoff: {0}")]
    CorruptHandoff(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Size and cost parameters of a fat-tree instance.
///
/// `link_capacity`, `idle_power` and `dyn_power` are base values that get
/// multiplied by `depth` at the root level and decrease towards the leaves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeParams {
    /// Number of switch levels, must be >= 1.
    pub depth: u32,
    /// CPU capacity of every server (flat across all servers).
    pub server_capacity: u32,
    /// Base link capacity.
    pub link_capacity: u32,
    /// Base idle power consumption per node.
    pub idle_power: u32,
    /// Base dynamic power consumption per node.
    pub dyn_power: u32,
    /// Average data rate per flow.
    pub avg_data_rate: u32,
    /// Draw CPU utilizations, data rates and flow endpoints from the rng
    /// instead of using the fixed defaults.
    pub randomize: bool,
    /// Rng seed, only used when `randomize` is set.
    pub seed: u64,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            depth: 2,
            server_capacity: 10,
            link_capacity: 5,
            idle_power: 10,
            dyn_power: 2,
            avg_data_rate: 4,
            randomize: false,
            seed: 42,
        }
    }
}

/// A 0/1 valuation of model variables, keyed by variable name.
///
/// Missing names read as 0 via [`Assignment::value`]. This is deliberate:
/// an infeasible placement stage yields an empty assignment, which turns
/// the dependent routing model into an "empty fabric" problem instead of an
/// error. Callers that need stricter behavior should go through
/// `handoff::load_placement`, which rejects malformed files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Assignment(BTreeMap<String, u8>);

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: u8) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<u8> {
        self.0.get(name).copied()
    }

    /// Value of a variable as a constant, 0.0 when absent.
    pub fn value(&self, name: &str) -> f64 {
        self.0.get(name).map(|&v| f64::from(v)).unwrap_or(0.0)
    }

    pub fn is_on(&self, name: &str) -> bool {
        self.get(name) == Some(1)
    }

    /// Names of all variables set to 1.
    pub fn on_vars(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(|(_, &v)| v == 1)
            .map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u8)> {
        self.0.iter().map(|(name, &v)| (name.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, u8)> for Assignment {
    fn from_iter<I: IntoIterator<Item = (String, u8)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for name in self.on_vars() {
            writeln!(f, "{name}: 1")?;
        }
        Ok(())
    }
}

/// Options forwarded verbatim to the external solver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverOptions {
    /// Wall-clock budget in seconds.
    pub time_limit_secs: f64,
    /// Stop after this many solutions (1 = first feasible).
    pub max_solutions: Option<u32>,
    /// Parallelism hint.
    pub workers: Option<u32>,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            time_limit_secs: 900.0,
            max_solutions: None,
            workers: None,
        }
    }
}

/// Result of a single external solve call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveOutcome {
    pub feasible: bool,
    /// Empty when infeasible.
    pub assignment: Assignment,
    /// 0.0 when infeasible.
    pub objective: f64,
    pub solve_time_secs: f64,
}

impl fmt::Display for SolveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "feasible: {}", self.feasible)?;
        writeln!(f, "objective: {}", self.objective)?;
        write!(f, "solve time: {}s", self.solve_time_secs)
    }
}
