use crate::datastructures::{Assignment, TreeParams};
use crate::model_builder::{server_var, vm_var};
use crate::topology::Topology;

pub fn default_params() -> TreeParams {
    TreeParams::default()
}

pub fn randomized_params(depth: u32, seed: u64) -> TreeParams {
    TreeParams {
        depth,
        randomize: true,
        seed,
        ..TreeParams::default()
    }
}

/// A placement with vm `i` on server `i` and every server on. Feasible for
/// any generated topology since a single vm never exceeds its server's
/// capacity.
pub fn spread_placement(topology: &Topology) -> Assignment {
    let mut assignment = Assignment::new();
    for s in 0..topology.servers {
        assignment.insert(server_var(s), 1);
        for vm in 0..topology.vms {
            assignment.insert(vm_var(vm, s), u8::from(vm == s));
        }
    }
    assignment
}
