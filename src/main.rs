//! Workout Timer - a drift-free interval timer for the terminal
//!
//! This is the main entry point for the workout-timer binary.

use std::sync::Arc;
use chrono::Utc;
use tracing::{error, info};

use workout_timer::{
    config::Config,
    report::WorkoutReport,
    tasks::{control_task, event_logger_task, OutputMode},
    utils::shutdown_signal,
    workouts::create_timer,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("workout_timer={}", config.log_level()))
        .with_writer(std::io::stderr)
        .init();

    info!("Starting workout-timer v1.0.0");

    let timer_config = match config.timer_config() {
        Ok(timer_config) => timer_config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(2);
        }
    };
    info!(
        "Workout: {}, countdown {:?}",
        timer_config.kind(),
        timer_config.countdown_duration()
    );

    let timer = Arc::new(create_timer(&timer_config)?);
    timer.set_sound_enabled(!config.mute);

    // Event sink runs until the timer is dropped and its channel closes
    let logger = tokio::spawn(event_logger_task(timer.subscribe(), config.output_mode()));
    let controls = tokio::spawn(control_task(Arc::clone(&timer)));

    let started_at = Utc::now();
    timer.start();

    tokio::select! {
        state = timer.wait_until_done() => {
            info!("Workout {}", state);
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
            timer.stop();
        }
    }

    let report = WorkoutReport::new(&timer, started_at);
    controls.abort();
    drop(timer);
    if let Err(e) = logger.await {
        error!("Event logger task failed: {}", e);
    }

    match config.output_mode() {
        OutputMode::Json => println!("{}", serde_json::to_string(&report)?),
        OutputMode::Human => {
            for line in report.lines() {
                println!("{}", line);
            }
        }
    }

    info!("Workout timer shutdown complete");
    // The blocking stdin read cannot be cancelled, so don't wait for it
    // during runtime shutdown.
    std::process::exit(0);
}
