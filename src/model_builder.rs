use log::debug;

use crate::datastructures::Assignment;
use crate::model::{ConstraintSense, LinearExpr, Model, VarRole};
use crate::topology::Topology;

/// Name of the server status variable `s<i>`.
pub fn server_var(s: usize) -> String {
    format!("s{s}")
}

/// Name of the vm placement variable `vm<j>-s<i>`.
pub fn vm_var(vm: usize, s: usize) -> String {
    format!("vm{vm}-s{s}")
}

/// Name of the switch status variable `sw<k>`.
pub fn switch_var(sw: usize) -> String {
    format!("sw{sw}")
}

/// Name of the directed flow edge variable `f<f>-n<from>-n<to>`.
pub fn flow_edge_var(f: usize, from: usize, to: usize) -> String {
    format!("f{f}-n{from}-n{to}")
}

/// Name of the link status variable `on<n1>-<n2>`, `n1 < n2`.
pub fn link_var(n1: usize, n2: usize) -> String {
    format!("on{n1}-{n2}")
}

/// Whether the placement variables are live decisions or pre-bound constants
/// read from a prior placement solve.
enum PlacementBinding<'a> {
    Live,
    Fixed(&'a Assignment),
}

impl PlacementBinding<'_> {
    /// The constant bound to a placement variable, `None` when live.
    /// Missing assignment keys read as 0 (an infeasible placement turns
    /// into an empty fabric, see `Assignment`).
    fn fixed_value(&self, name: &str) -> Option<f64> {
        match self {
            Self::Live => None,
            Self::Fixed(assignment) => Some(assignment.value(name)),
        }
    }
}

/// The placement-only formulation: which vm runs on which server.
///
/// Variables `s<i>` and `vm<j>-s<i>`, server power objective, constraints
/// C11 (server capacity) and C12 (every vm on exactly one server).
pub fn placement_model(topology: &Topology) -> Model {
    let mut model = Model::new("placement_model");
    add_placement_section(&mut model, topology);
    debug!("{model}");
    model
}

/// The routing formulation for a fixed placement: which links and switches
/// carry each flow, given where the vms already sit.
///
/// Variables `sw<k>`, `f<f>-n<a>-n<b>` (adjacency-sparse) and `on<a>-<b>`,
/// switch power objective, constraints C13-C19 with every placement
/// reference replaced by the 0/1 constant read from `placement`.
pub fn routing_model(topology: &Topology, placement: &Assignment) -> Model {
    let mut model = Model::new("routing_model");
    add_routing_section(
        &mut model,
        topology,
        &PlacementBinding::Fixed(placement),
    );
    debug!("{model}");
    model
}

/// The exact monolithic formulation: placement and routing solved together.
///
/// All five variable families live, objective terms of both stages,
/// constraints C11-C19 with C13/C14/C19 in inequality form against the live
/// placement variables.
pub fn joint_model(topology: &Topology) -> Model {
    let mut model = Model::new("joint_model");
    add_placement_section(&mut model, topology);
    add_routing_section(&mut model, topology, &PlacementBinding::Live);
    debug!("{model}");
    model
}

fn add_placement_section(model: &mut Model, topo: &Topology) {
    for s in 0..topo.servers {
        model.binary(VarRole::ServerStatus, server_var(s));
    }
    for s in 0..topo.servers {
        for vm in 0..topo.vms {
            model.binary(VarRole::VmStatus, vm_var(vm, s));
        }
    }

    // Objective terms 1-2: idle power of active servers plus dynamic power
    // proportional to the hosted cpu load.
    for s in 0..topo.servers {
        let node = topo.node_of_server(s);
        model
            .objective
            .add_term(server_var(s), topo.idle_power[node]);
        for vm in 0..topo.vms {
            model.objective.add_term(
                vm_var(vm, s),
                topo.dyn_power[node] * topo.cpu_util[vm],
            );
        }
    }

    // C11: a server carrying any load must be on, up to its capacity.
    for s in 0..topo.servers {
        let mut expr = LinearExpr::new();
        for vm in 0..topo.vms {
            expr.add_term(vm_var(vm, s), topo.cpu_util[vm]);
        }
        expr.add_term(server_var(s), -topo.server_capacity[s]);
        model.add_constraint(
            format!("C11-N{s}"),
            expr,
            ConstraintSense::Le,
        );
    }

    // C12: every vm placed on exactly one server.
    for vm in 0..topo.vms {
        let mut expr = LinearExpr::new();
        for s in 0..topo.servers {
            expr.add_term(vm_var(vm, s), 1.0);
        }
        expr.add_constant(-1.0);
        model.add_constraint(
            format!("C12-N{vm}"),
            expr,
            ConstraintSense::Eq,
        );
    }
}

fn add_routing_section(
    model: &mut Model,
    topo: &Topology,
    binding: &PlacementBinding,
) {
    for sw in 0..topo.switches {
        model.binary(VarRole::SwitchStatus, switch_var(sw));
    }
    // Flow edge and link variables exist only over physical adjacency.
    for f in 0..topo.flows {
        for n1 in 0..topo.nodes {
            for &n2 in topo.neighbors(n1) {
                model.binary(VarRole::FlowEdge, flow_edge_var(f, n1, n2));
            }
        }
    }
    for n1 in 0..topo.nodes {
        for &n2 in topo.neighbors(n1) {
            if n1 < n2 {
                model.binary(VarRole::LinkStatus, link_var(n1, n2));
            }
        }
    }

    // Objective terms 3-4: idle power of active switches plus dynamic power
    // for every flow edge touching a switch. Edges between two switches
    // collect both endpoints' coefficients.
    for sw in 0..topo.switches {
        model
            .objective
            .add_term(switch_var(sw), topo.idle_power[sw]);
        for f in 0..topo.flows {
            for &n in topo.neighbors(sw) {
                model
                    .objective
                    .add_term(flow_edge_var(f, n, sw), topo.dyn_power[sw]);
                model
                    .objective
                    .add_term(flow_edge_var(f, sw, n), topo.dyn_power[sw]);
            }
        }
    }

    // C13/C14/C15: flow endpoints. A unit of flow leaves the server hosting
    // the source vm and enters the server hosting the destination vm.
    for f in 0..topo.flows {
        let (src_vm, dst_vm) = topo.src_dst[f];
        for s in topo.server_nodes() {
            let server = topo.server_of_node(s);
            let outgoing = topo
                .neighbors(s)
                .iter()
                .fold(LinearExpr::new(), |mut expr, &sw| {
                    expr.add_term(flow_edge_var(f, s, sw), 1.0);
                    expr
                });
            let incoming = topo
                .neighbors(s)
                .iter()
                .fold(LinearExpr::new(), |mut expr, &sw| {
                    expr.add_term(flow_edge_var(f, sw, s), 1.0);
                    expr
                });
            let src = vm_var(src_vm, server);
            let dst = vm_var(dst_vm, server);

            match binding.fixed_value(&src) {
                // A vm known absent pins the outgoing sum to zero; a vm
                // known present makes the bound vacuous, so no constraint
                // is emitted at all.
                Some(value) => {
                    if value == 0.0 {
                        model.add_constraint(
                            format!("C13-N{}", f * topo.servers + s),
                            outgoing.clone(),
                            ConstraintSense::Eq,
                        );
                    }
                }
                None => model.add_constraint(
                    format!("C13-N{}", f * topo.servers + s),
                    outgoing.clone() - LinearExpr::term(&src, 1.0),
                    ConstraintSense::Le,
                ),
            }
            match binding.fixed_value(&dst) {
                Some(value) => {
                    if value == 0.0 {
                        model.add_constraint(
                            format!("C14-N{}", f * topo.servers + s),
                            incoming.clone(),
                            ConstraintSense::Eq,
                        );
                    }
                }
                None => model.add_constraint(
                    format!("C14-N{}", f * topo.servers + s),
                    incoming.clone() - LinearExpr::term(&dst, 1.0),
                    ConstraintSense::Le,
                ),
            }

            // C15: net outflow at the server equals source indicator minus
            // destination indicator.
            let src_expr = match binding.fixed_value(&src) {
                Some(value) => LinearExpr::constant(value),
                None => LinearExpr::term(&src, 1.0),
            };
            let dst_expr = match binding.fixed_value(&dst) {
                Some(value) => LinearExpr::constant(value),
                None => LinearExpr::term(&dst, 1.0),
            };
            model.add_constraint(
                format!("C15-N{}", f * topo.servers + s),
                src_expr - dst_expr - (outgoing - incoming),
                ConstraintSense::Eq,
            );
        }
    }

    // C16: flow conservation at every transit switch.
    for sw in 0..topo.switches {
        for f in 0..topo.flows {
            let mut expr = LinearExpr::new();
            for &n in topo.neighbors(sw) {
                expr.add_term(flow_edge_var(f, n, sw), 1.0);
                expr.add_term(flow_edge_var(f, sw, n), -1.0);
            }
            model.add_constraint(
                format!("C16-N{}", sw * topo.flows + f),
                expr,
                ConstraintSense::Eq,
            );
        }
    }

    // C17: a link must be on to carry traffic, capacity binds while on.
    for l in 0..topo.links {
        let (n1, n2) = topo.link_endpoints[l];
        let mut expr = LinearExpr::new();
        for f in 0..topo.flows {
            expr.add_term(flow_edge_var(f, n1, n2), topo.data_rate[f]);
            expr.add_term(flow_edge_var(f, n2, n1), topo.data_rate[f]);
        }
        expr.add_term(link_var(n1, n2), -topo.link_capacity[l]);
        model.add_constraint(format!("C17-N{l}"), expr, ConstraintSense::Le);
    }

    // C18/C19: a link is on only if both endpoints are on. The first
    // endpoint is a switch by construction; the second is a switch or a
    // server. A fixed placement pins server-attached links to the server's
    // status as an equality, a live placement bounds them by the status
    // variable.
    for l in 0..topo.links {
        let (n1, n2) = topo.link_endpoints[l];
        let on = link_var(n1, n2);
        model.add_constraint(
            format!("C18-N{l}"),
            LinearExpr::term(&on, 1.0) - LinearExpr::term(switch_var(n1), 1.0),
            ConstraintSense::Le,
        );
        if topo.is_switch(n2) {
            model.add_constraint(
                format!("C19-N{l}"),
                LinearExpr::term(&on, 1.0)
                    - LinearExpr::term(switch_var(n2), 1.0),
                ConstraintSense::Le,
            );
        } else {
            let status = server_var(topo.server_of_node(n2));
            match binding.fixed_value(&status) {
                Some(value) => model.add_constraint(
                    format!("C19-N{l}"),
                    LinearExpr::term(&on, 1.0) - LinearExpr::constant(value),
                    ConstraintSense::Eq,
                ),
                None => model.add_constraint(
                    format!("C19-N{l}"),
                    LinearExpr::term(&on, 1.0)
                        - LinearExpr::term(&status, 1.0),
                    ConstraintSense::Le,
                ),
            }
        }
    }
}
