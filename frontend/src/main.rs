use std::path::PathBuf;
use std::process::ExitCode;

use ale_interface::config::{
    DIFFICULTY, FRAME_SKIP, MAX_NUM_FRAMES_PER_EPISODE, MODE, RANDOM_SEED,
    REPEAT_ACTION_PROBABILITY,
};
use ale_interface::{LoggerMode, Session, Settings, set_logger_mode};
use ale_machines::registry;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::util::SubscriberInitExt;

mod agent;
mod error;
mod rom_path;
mod runner;
mod settings_file;
mod state_file;

use agent::{Agent, AgentKind};
use error::CliError;
use runner::RunOptions;

/// Episodes the CLI caps at when no frame limit is configured, so an agent
/// that never loses still terminates.
const DEFAULT_EPISODE_FRAMES: i32 = 18_000;

#[derive(Parser)]
#[command(name = "ale")]
#[command(version, about = "Arcade learning environment driver", long_about = None)]
struct Cli {
    /// Minimum log severity: info, warning or error
    #[arg(long, global = true, default_value = "warning")]
    log_level: LoggerMode,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered games
    Games,

    /// Play episodes with a built-in agent
    Run {
        /// Cartridge file (raw or .zip), or the name of a bundled game
        rom: String,

        #[arg(short, long, default_value_t = 1)]
        episodes: u32,

        #[arg(short, long, value_enum, default_value_t = AgentKind::Random)]
        agent: AgentKind,

        /// Seed for both the session and the agent
        #[arg(long)]
        seed: Option<i32>,

        #[arg(long)]
        frame_skip: Option<i32>,

        /// Sticky-action probability
        #[arg(long)]
        sticky: Option<f32>,

        #[arg(long)]
        mode: Option<i32>,

        #[arg(long)]
        difficulty: Option<i32>,

        /// Truncate episodes after this many frames (0 = no limit)
        #[arg(long)]
        max_frames: Option<i32>,

        /// Write the final screen as PNG
        #[arg(long)]
        screenshot: Option<PathBuf>,

        /// Write the final system state (gzip) here
        #[arg(long)]
        save_state: Option<PathBuf>,

        /// Start the first episode from a saved state
        #[arg(long)]
        load_state: Option<PathBuf>,

        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,

        /// Settings file; defaults to <config dir>/ale/config.toml if present
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn setup_logging(mode: LoggerMode) {
    let level = match mode {
        LoggerMode::Info => Level::INFO,
        LoggerMode::Warning => Level::WARN,
        LoggerMode::Error => Level::ERROR,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .compact()
        .finish()
        .init();
    set_logger_mode(mode);
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.log_level);

    let result = match cli.command {
        Commands::Games => {
            list_games();
            Ok(())
        }
        Commands::Run {
            rom,
            episodes,
            agent,
            seed,
            frame_skip,
            sticky,
            mode,
            difficulty,
            max_frames,
            screenshot,
            save_state,
            load_state,
            json,
            config,
        } => settings_file::load(config.as_deref()).and_then(|mut settings| {
            let overrides: [(&str, Option<i32>); 5] = [
                (RANDOM_SEED, seed),
                (FRAME_SKIP, frame_skip),
                (MODE, mode),
                (DIFFICULTY, difficulty),
                (MAX_NUM_FRAMES_PER_EPISODE, max_frames),
            ];
            for (key, value) in overrides {
                if let Some(value) = value {
                    settings.set(key, value);
                }
            }
            if let Some(p) = sticky {
                settings.set(REPEAT_ACTION_PROBABILITY, p);
            }
            if !settings.contains(MAX_NUM_FRAMES_PER_EPISODE) {
                settings.set(MAX_NUM_FRAMES_PER_EPISODE, DEFAULT_EPISODE_FRAMES);
            }

            let options = RunOptions {
                episodes,
                screenshot,
                save_state,
                load_state,
            };
            run(&rom, settings, agent, &options, json)
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("ale: {e}");
            ExitCode::FAILURE
        }
    }
}

fn list_games() {
    for entry in registry::all() {
        let bundled = if entry.bundled.is_some() { " (bundled)" } else { "" };
        println!("{:<12} {}{bundled}", entry.name, entry.description);
    }
}

fn run(
    rom: &str,
    settings: Settings,
    agent: AgentKind,
    options: &RunOptions,
    json: bool,
) -> Result<(), CliError> {
    let cartridge = rom_path::resolve(rom)?;
    let mut session = Session::with_settings(settings);
    session.load_cartridge(cartridge)?;

    let seed: i32 = session.query(RANDOM_SEED)?;
    let mut agent = Agent::new(agent, u64::from(seed as u32));
    let summary = runner::run(&mut session, &mut agent, options)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "{} (crc32 {}) mode {} difficulty {}",
            summary.game, summary.crc32, summary.mode, summary.difficulty
        );
        for episode in &summary.episodes {
            let end = if episode.terminal { "game over" } else { "truncated" };
            println!(
                "  episode {:>3}: reward {:>6}  frames {:>6}  lives {}  ({end})",
                episode.episode, episode.reward, episode.frames, episode.lives
            );
        }
    }
    Ok(())
}
