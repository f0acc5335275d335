#![warn(missing_docs)]
//! Build combinatorial models for joint vm placement and flow routing on a
//! fat-tree data-center fabric.
//!
//! A [`topology::Topology`] is derived deterministically from a handful of
//! size parameters: a folded-Clos switching fabric (full bipartite wiring
//! between adjacent switch levels), servers hanging off the last switch
//! level, capacity/power gradients from core to edge, and a pairing of vms
//! into communication flows. From the topology, [`model_builder`] produces
//! three formulations of the power-minimization problem: placement only,
//! routing for a fixed placement, and the exact joint model. Solving is
//! external: implement [`solver::SolverAdapter`] for your engine of choice
//! and feed it the models.
//!
//! The two-stage path (placement first, routing with the placement fixed)
//! and the joint path are built from the same topology, so their outcomes
//! are directly comparable.
//!
//! Example
//! ```rust
//! use fabric_models::datastructures::{SolverOptions, TreeParams};
//! use fabric_models::{model_builder, solver::SolverAdapter, topology::Topology};
//! # use fabric_models::datastructures::Result;
//!
//! fn example(engine: &mut impl SolverAdapter) -> Result<()> {
//!     let params = TreeParams {
//!         depth: 3,
//!         randomize: true,
//!         ..TreeParams::default()
//!     };
//!     let topology = Topology::generate(&params)?;
//!
//!     // Two-stage decomposition: smaller sub-problems, possibly
//!     // suboptimal overall.
//!     let placement = model_builder::placement_model(&topology);
//!     let options = SolverOptions::default(); // 900s budget
//!     let outcome = engine.solve(&placement, &options)?;
//!     let routing =
//!         model_builder::routing_model(&topology, &outcome.assignment);
//!     engine.solve(&routing, &options)?;
//!
//!     // Exact monolithic formulation, for comparison.
//!     let joint = model_builder::joint_model(&topology);
//!     engine.solve(&joint, &options)?;
//!     Ok(())
//! }
//! ```

/// Shared data structures: parameters, assignments, solver options and the
/// crate error type.
pub mod datastructures;

/// Reading and writing the persisted placement-stage handoff.
pub mod handoff;

/// The abstract model representation handed to solver adapters.
pub mod model;

/// The three model formulations: placement, routing and joint.
pub mod model_builder;

/// Append-only tab-separated run-statistics log.
pub mod report;

/// The external solver contract and a stub implementation for tests.
pub mod solver;

/// Deterministic fat-tree topology generation.
pub mod topology;

#[doc(hidden)]
pub mod test_utils;
