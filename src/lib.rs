pub mod ai;
pub mod battle;
pub mod battle_logger;
pub mod damage;
pub mod engine;
pub mod error;
pub mod faint;
pub mod items;
pub mod matrix;
pub mod model;
pub mod rewards;
pub mod roster;
pub mod stats;
pub mod status;
pub mod types;

use crate::ai::BattlePolicy;
use crate::battle::BattleOptions;
use crate::matrix::{cell_rng, compute_matrix, replay_battle, validate_roster, SimulationOptions};
use crate::model::RosterFile;
use anyhow::Context;
use rand::Rng;
use std::path::{Path, PathBuf};
use tracing::info;

pub use crate::battle::{reduce, BattleAction, BattleEvent, BattleState, TeamSelect};
pub use crate::engine::BattleEngine;
pub use crate::error::{BattleError, RosterError};

#[derive(Debug, Clone)]
pub struct CliOptions {
    pub roster_path: PathBuf,
    pub sims_per_cell: usize,
    pub seed: u64,
    pub output_path: PathBuf,
    pub policy: BattlePolicy,
    pub config_path: Option<PathBuf>,
    /// Row and column of a single battle to print instead of the matrix.
    pub replay: Option<(usize, usize)>,
}

pub fn load_roster(path: &Path) -> anyhow::Result<RosterFile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read roster file at {}", path.display()))?;
    let parsed: RosterFile = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse JSON from {}", path.display()))?;
    validate_roster(&parsed)?;
    Ok(parsed)
}

pub fn load_options(path: Option<&Path>) -> anyhow::Result<BattleOptions> {
    let Some(path) = path else {
        return Ok(BattleOptions::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse battle options from {}", path.display()))
}

pub fn run(opts: CliOptions) -> anyhow::Result<()> {
    if opts.sims_per_cell == 0 {
        anyhow::bail!("--sims-per-cell must be > 0");
    }
    let roster = load_roster(&opts.roster_path)?;
    let sim_options = SimulationOptions {
        policy_a: opts.policy,
        policy_b: opts.policy,
        battle: load_options(opts.config_path.as_deref())?,
        ..SimulationOptions::default()
    };
    let creatures = &roster.creatures;

    if let Some((row, col)) = opts.replay {
        let (a, b) = match (creatures.get(row), creatures.get(col)) {
            (Some(a), Some(b)) => (a, b),
            _ => anyhow::bail!(
                "--replay {row}:{col} is out of range for a roster of {}",
                creatures.len()
            ),
        };
        let battle_seed: u64 = cell_rng(opts.seed, row, col).gen();
        let (result, log) = replay_battle(a, b, battle_seed, &sim_options)
            .with_context(|| format!("Failed to replay {} vs {}", a.name, b.name))?;
        info!(result = ?result, "replay finished");
        println!("{}", serde_json::to_string_pretty(&log.to_json())?);
        return Ok(());
    }

    let matrix = compute_matrix(creatures, creatures, opts.sims_per_cell, opts.seed, &sim_options)
        .context("Simulation failed")?;
    matrix::write_csv(&matrix, creatures, creatures, &opts.output_path)?;
    println!(
        "Wrote {}x{} matrix to {}",
        matrix.len(),
        matrix.first().map(|r| r.len()).unwrap_or(0),
        opts.output_path.display()
    );
    Ok(())
}
