//! Tickframe demo entry point.
//!
//! A frame-driven game-framework runtime:
//! - **framework** – priority-ordered module registry driven once per frame
//! - **fsm** – finite state machines owned and ticked by the `FsmManager`
//!   module
//! - **game** – demo `Player` with `Idle`/`Moving` states
//!
//! # Main Loop
//!
//! 1. Load `config.ini` (frame pacing, time scale)
//! 2. Build a `Framework` and fetch the `FsmManager` module
//! 3. Create the player machine and start it in `Idle`
//! 4. Tick the framework at the configured rate for the configured number of
//!    frames
//! 5. Shut the framework down, which tears every machine down in turn
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --frames 300
//! ```

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use log::{error, info};

use tickframe::clock::FrameClock;
use tickframe::config::RuntimeConfig;
use tickframe::framework::Framework;
use tickframe::fsm::manager::FsmManager;
use tickframe::game::{self, Player, PlayerStateKey};

/// Tickframe demo host
#[derive(Parser)]
#[command(version, about = "Frame-driven module & FSM runtime demo")]
struct Cli {
    /// Path to the INI configuration file.
    #[arg(long, value_name = "PATH", default_value = "./config.ini")]
    config: PathBuf,

    /// Number of frames to run; overrides the configured value.
    #[arg(long, value_name = "N")]
    frames: Option<u64>,

    /// Logical time multiplier; overrides the configured value.
    #[arg(long, value_name = "SCALE")]
    time_scale: Option<f32>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = RuntimeConfig::with_path(cli.config);
    config.load_from_file().ok(); // ignore errors, use defaults
    if let Some(frames) = cli.frames {
        config.frames = frames;
    }
    if let Some(scale) = cli.time_scale {
        config.time_scale = scale;
    }

    let mut framework = Framework::new();
    let fsm_manager = framework.module::<FsmManager>();

    let player = Rc::new(RefCell::new(Player::new()));
    let player_fsm = match game::create_player_fsm(&mut fsm_manager.borrow_mut(), &player) {
        Ok(fsm) => fsm,
        Err(e) => {
            error!("failed to create player FSM: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = player_fsm.borrow_mut().start(PlayerStateKey::Idle) {
        error!("failed to start player FSM: {}", e);
        std::process::exit(1);
    }

    info!(
        "running {} frames at {} fps (time scale {})",
        config.frames, config.target_fps, config.time_scale
    );

    let mut clock = FrameClock::default().with_time_scale(config.time_scale);
    let frame_budget = Duration::from_secs_f32(1.0 / config.target_fps.max(1) as f32);
    let mut last = Instant::now();

    for _ in 0..config.frames {
        let now = Instant::now();
        let real_dt = now.duration_since(last).as_secs_f32();
        last = now;

        let (elapsed, real_elapsed) = clock.tick(real_dt);
        framework.update(elapsed, real_elapsed);

        if let Some(remaining) = frame_budget.checked_sub(now.elapsed()) {
            thread::sleep(remaining);
        }
    }

    framework.shutdown();

    let p = player.borrow();
    info!(
        "done after {} frames, player ended at ({:.1}, {:.1})",
        clock.frame_count, p.x, p.y
    );
}
