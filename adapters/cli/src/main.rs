#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a Murder Town session without a display.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use murder_town_core::{config::Config, ActorKind, Event};
use murder_town_system_bootstrap::Session;
use murder_town_system_movement::PlayerAction;
use murder_town_world::query;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Generates a town, stages the murder, and lets the villagers go about their day.
#[derive(Parser, Debug)]
#[command(name = "murder-town", version, about)]
struct Args {
    /// Seed for the run. Overrides the configuration file; random when absent from both.
    #[arg(long)]
    seed: Option<u64>,
    /// Number of turns to play with the detective waiting.
    #[arg(long, default_value_t = 100)]
    ticks: u32,
    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Logs debug output when `RUST_LOG` is unset.
    #[arg(short, long)]
    verbose: bool,
}

/// Entry point for the Murder Town command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = load_config(args.config.as_ref())?;
    config.seed = Some(
        args.seed
            .or(config.seed)
            .unwrap_or_else(rand::random::<u64>),
    );

    let mut session = Session::new(&config).context("failed to generate the town")?;
    let mut moves = 0usize;
    let mut doors_opened = 0usize;
    for _ in 0..args.ticks {
        let Some(events) = session.advance(PlayerAction::Wait) else {
            break;
        };
        for event in &events {
            match event {
                Event::ActorMoved { .. } => moves += 1,
                Event::DoorOpened { .. } => doors_opened += 1,
                _ => {}
            }
        }
    }

    print!("{}", summary(&session, moves, doors_opened));
    Ok(())
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config = Config::from_toml_str(&contents)
        .with_context(|| format!("invalid configuration in {}", path.display()))?;
    info!(path = %path.display(), "configuration loaded");
    Ok(config)
}

fn summary(session: &Session, moves: usize, doors_opened: usize) -> String {
    let world = session.world();
    let view = query::actor_view(world);
    let count = |kind: ActorKind| view.iter().filter(|actor| actor.kind == kind).count();
    let en_route = view
        .iter()
        .filter(|actor| actor.remaining_path > 0)
        .count();
    let case = session.case();

    let mut lines = vec![
        format!("seed: {}", session.seed()),
        format!("turns: {}", session.turn()),
        format!("clock: {}", query::clock(world)),
        format!("houses: {}", session.town().lots().len()),
        format!("crime scene: house {}", case.crime_scene()),
        format!(
            "actors: {} villagers, {} police, {} player",
            count(ActorKind::Villager),
            count(ActorKind::Police),
            count(ActorKind::Player)
        ),
        format!("moves: {moves}, doors opened: {doors_opened}"),
        format!("actors en route: {en_route}"),
    ];
    lines.push(String::new());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_flags() {
        let args = Args::try_parse_from([
            "murder-town",
            "--seed",
            "7",
            "--ticks",
            "12",
            "--config",
            "town.toml",
            "-v",
        ])
        .expect("arguments parse");
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.ticks, 12);
        assert_eq!(args.config, Some(PathBuf::from("town.toml")));
        assert!(args.verbose);
    }

    #[test]
    fn defaults_to_a_hundred_waiting_turns() {
        let args = Args::try_parse_from(["murder-town"]).expect("arguments parse");
        assert_eq!(args.seed, None);
        assert_eq!(args.ticks, 100);
        assert!(args.config.is_none());
    }

    #[test]
    fn summary_reports_the_run() {
        let config = Config {
            seed: Some(3),
            ..Config::default()
        };
        let mut session = Session::new(&config).expect("session generates");
        for _ in 0..5 {
            let _ = session.advance(PlayerAction::Wait);
        }
        let text = summary(&session, 0, 0);
        assert!(text.contains("seed: 3"));
        assert!(text.contains("turns: 5"));
        assert!(text.contains("houses: 9"));
        assert!(text.contains("1 player"));
    }
}
