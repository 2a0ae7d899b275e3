//! Episode loop: drive a loaded session with an agent and summarize.

use std::path::PathBuf;

use ale_interface::Session;
use serde::Serialize;

use crate::agent::Agent;
use crate::error::CliError;
use crate::state_file;

pub struct RunOptions {
    pub episodes: u32,
    pub screenshot: Option<PathBuf>,
    pub save_state: Option<PathBuf>,
    pub load_state: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EpisodeSummary {
    pub episode: u32,
    pub reward: i64,
    pub frames: u64,
    pub lives: i32,
    pub terminal: bool,
    pub truncated: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunSummary {
    pub game: String,
    pub crc32: String,
    pub mode: u32,
    pub difficulty: u32,
    pub total_frames: u64,
    pub episodes: Vec<EpisodeSummary>,
}

/// Play `options.episodes` episodes. A state loaded with `--load-state`
/// replaces the start of the first episode only.
pub fn run(
    session: &mut Session,
    agent: &mut Agent,
    options: &RunOptions,
) -> Result<RunSummary, CliError> {
    if let Some(path) = &options.load_state {
        let snapshot = state_file::read(path)?;
        session.restore_system_state(&snapshot)?;
        tracing::info!("resumed from {}", path.display());
    }

    let minimal = session.minimal_actions()?.to_vec();
    let mut episodes = Vec::new();
    for episode in 1..=options.episodes {
        if episode > 1 {
            session.reset()?;
        }
        let mut reward = 0i64;
        while !session.game_over()? {
            reward += i64::from(session.step(agent.act(&minimal))?);
        }
        let summary = EpisodeSummary {
            episode,
            reward,
            frames: session.episode_frame_number(),
            lives: session.lives()?,
            terminal: session.is_terminal()?,
            truncated: session.is_truncated()?,
        };
        tracing::info!(
            "episode {episode}: reward {reward} in {} frames",
            summary.frames
        );
        episodes.push(summary);
    }

    if let Some(path) = &options.screenshot {
        session.save_screen_png(path)?;
    }
    if let Some(path) = &options.save_state {
        state_file::write(path, &session.clone_system_state()?)?;
    }

    let cartridge = session.cartridge()?;
    Ok(RunSummary {
        game: session.game_name()?.to_string(),
        crc32: format!("{:08x}", cartridge.crc32()),
        mode: session.mode()?,
        difficulty: session.difficulty()?,
        total_frames: session.frame_number(),
        episodes,
    })
}
