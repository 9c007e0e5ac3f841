use creature_battle_engine::ai::BattlePolicy;
use creature_battle_engine::{run, CliOptions};
use std::env;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn usage() -> ! {
    eprintln!(
        "Usage: cargo run --release -- [--roster roster.json] [--sims-per-cell N] [--seed SEED] \
[--output matrix.csv] [--policy greedy|random] [--config options.json] [--replay ROW:COL]"
    );
    std::process::exit(1);
}

fn parse_replay(val: &str) -> anyhow::Result<(usize, usize)> {
    let (row, col) = val
        .split_once(':')
        .ok_or_else(|| anyhow::anyhow!("--replay expects ROW:COL, got {val}"))?;
    Ok((row.trim().parse()?, col.trim().parse()?))
}

fn parse_args() -> anyhow::Result<CliOptions> {
    let mut roster_path = PathBuf::from("roster.json");
    let mut sims_per_cell = 100usize;
    let mut seed = 0u64;
    let mut output_path = PathBuf::from("matrix.csv");
    let mut policy = BattlePolicy::Greedy;
    let mut config_path = None;
    let mut replay = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--roster" => {
                roster_path = args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--roster requires a path (e.g. --roster roster.json)")
                })?;
            }
            "--sims-per-cell" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--sims-per-cell requires a number"))?;
                sims_per_cell = val.parse()?;
            }
            "--seed" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--seed requires a number"))?;
                seed = val.parse()?;
            }
            "--output" => {
                output_path = args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--output requires a path (e.g. --output matrix.csv)")
                })?;
            }
            "--policy" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--policy requires greedy or random"))?;
                policy = match val.to_ascii_lowercase().as_str() {
                    "greedy" => BattlePolicy::Greedy,
                    "random" => BattlePolicy::Random,
                    other => anyhow::bail!("Unknown policy {other} (use greedy or random)"),
                };
            }
            "--config" => {
                config_path = Some(args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--config requires a path (e.g. --config options.json)")
                })?);
            }
            "--replay" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--replay requires ROW:COL"))?;
                replay = Some(parse_replay(&val)?);
            }
            "--help" | "-h" => usage(),
            other => return Err(anyhow::anyhow!("Unknown argument {other}")),
        }
    }

    Ok(CliOptions {
        roster_path,
        sims_per_cell,
        seed,
        output_path,
        policy,
        config_path,
        replay,
    })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("creature_battle_engine=info")),
        )
        .init();
    let opts = parse_args()?;
    run(opts)
}
