use anyhow::Result;
use clap::Parser;
use log::info;
use std::fs;
use std::path::PathBuf;

use fabric_models::datastructures::{Assignment, TreeParams};
use fabric_models::handoff;
use fabric_models::model_builder;
use fabric_models::topology::Topology;

/// Generate a fat-tree instance and the placement/routing/joint models
/// for it.
#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Number of switch levels
    #[arg(short, long, default_value_t = 2)]
    depth: u32,
    /// CPU capacity of every server
    #[arg(long, default_value_t = 10)]
    server_capacity: u32,
    /// Base link capacity
    #[arg(long, default_value_t = 5)]
    link_capacity: u32,
    /// Base idle power consumption per node
    #[arg(long, default_value_t = 10)]
    idle_power: u32,
    /// Base dynamic power consumption per node
    #[arg(long, default_value_t = 2)]
    dyn_power: u32,
    /// Average data rate per flow
    #[arg(long, default_value_t = 4)]
    data_rate: u32,
    /// Randomize cpu utilizations, data rates and flow endpoints
    #[arg(short, long)]
    randomize: bool,
    /// Rng seed for randomized instances
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Build the routing model from this persisted placement assignment
    /// instead of an empty one
    #[arg(short, long)]
    placement: Option<PathBuf>,
    /// Write the topology summary and the three models here
    #[arg(short, long)]
    out_dir: Option<PathBuf>,
    #[command(flatten)]
    verbosity: clap_verbosity_flag::Verbosity,
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbosity.log_level_filter())
        .init();
    let params = TreeParams {
        depth: args.depth,
        server_capacity: args.server_capacity,
        link_capacity: args.link_capacity,
        idle_power: args.idle_power,
        dyn_power: args.dyn_power,
        avg_data_rate: args.data_rate,
        randomize: args.randomize,
        seed: args.seed,
    };
    let topology = match Topology::generate(&params) {
        Ok(topology) => topology,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(exitcode::CONFIG);
        }
    };
    info!("{topology}");

    let placement = model_builder::placement_model(&topology);
    let joint = model_builder::joint_model(&topology);
    let assignment = match &args.placement {
        Some(path) => match handoff::load_placement(path, &topology) {
            Ok(assignment) => assignment,
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(exitcode::DATAERR);
            }
        },
        None => {
            info!("no placement given, routing model covers an empty fabric");
            Assignment::new()
        }
    };
    let routing = model_builder::routing_model(&topology, &assignment);
    for model in [&placement, &routing, &joint] {
        info!("{model}");
    }

    if let Some(out_dir) = &args.out_dir {
        fs::create_dir_all(out_dir)?;
        fs::write(out_dir.join("topology.txt"), topology.to_string())?;
        for model in [&placement, &routing, &joint] {
            serde_json::to_writer_pretty(
                fs::File::create(
                    out_dir.join(format!("{}.json", model.name)),
                )?,
                model,
            )?;
        }
        info!("wrote instance to {}", out_dir.display());
    }
    Ok(())
}
