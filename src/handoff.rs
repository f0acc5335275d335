use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::debug;
use serde_json::Value;

use crate::datastructures::{Assignment, Error, Result};
use crate::topology::Topology;

/// Persists an assignment as a flat json object mapping variable names to
/// 0/1. The map is sorted, so the file is deterministic for a given
/// assignment.
pub fn save_assignment(path: &Path, assignment: &Assignment) -> Result<()> {
    serde_json::to_writer_pretty(fs::File::create(path)?, assignment)?;
    debug!("saved {} variables to {}", assignment.len(), path.display());
    Ok(())
}

/// Loads a persisted placement-stage assignment and validates it against
/// the topology's placement name space.
///
/// Every key must be a well-formed `s<i>` or `vm<j>-s<i>` name within range
/// and every value must be exactly 0 or 1; anything else fails with
/// [`Error::CorruptHandoff`]. Missing keys are legal: an infeasible
/// placement persists as an empty object and loads as an empty assignment.
pub fn load_placement(path: &Path, topology: &Topology) -> Result<Assignment> {
    let contents = fs::read_to_string(path)?;
    let raw: BTreeMap<String, Value> = serde_json::from_str(&contents)
        .map_err(|e| {
            Error::CorruptHandoff(format!(
                "{} is not a json object of variables: {e}",
                path.display()
            ))
        })?;
    let mut assignment = Assignment::new();
    for (name, value) in raw {
        if !is_placement_var(&name, topology) {
            return Err(Error::CorruptHandoff(format!(
                "unknown placement variable {name:?}"
            )));
        }
        let bit = match binary_value(&value) {
            Some(bit) => bit,
            None => {
                return Err(Error::CorruptHandoff(format!(
                    "non-binary value {value} for {name:?}"
                )))
            }
        };
        assignment.insert(name, bit);
    }
    debug!(
        "loaded {} variables from {}",
        assignment.len(),
        path.display()
    );
    Ok(assignment)
}

/// Accepts `s<i>` and `vm<j>-s<i>` with indices inside the topology.
fn is_placement_var(name: &str, topology: &Topology) -> bool {
    if let Some(rest) = name.strip_prefix("vm") {
        let Some((vm, s)) = rest.split_once("-s") else {
            return false;
        };
        return matches!(vm.parse::<usize>(), Ok(vm) if vm < topology.vms)
            && matches!(s.parse::<usize>(), Ok(s) if s < topology.servers);
    }
    if let Some(rest) = name.strip_prefix('s') {
        return matches!(
            rest.parse::<usize>(),
            Ok(s) if s < topology.servers
        );
    }
    false
}

/// The original stack persists solver samples, so 0/1 may arrive as
/// integers or as exact floats.
fn binary_value(value: &Value) -> Option<u8> {
    match value.as_f64() {
        Some(v) if v == 0.0 => Some(0),
        Some(v) if v == 1.0 => Some(1),
        _ => None,
    }
}
