use std::time::Duration;

use tokio::{sync::broadcast, time::sleep};
use workout_timer::{
    create_timer,
    events::drain,
    workouts::{TabataConfig, WorkoutConfig},
    ConfigError, Cue, TimerConfig, TimerEvent, TimerState, WorkoutKind,
};

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn non_tick(rx: &mut broadcast::Receiver<TimerEvent>) -> Vec<TimerEvent> {
    drain(rx).into_iter().filter(|e| !e.is_tick()).collect()
}

#[tokio::test(start_paused = true)]
async fn no_ticks_after_natural_finish() {
    let config = TimerConfig::from_json(r#"{"type": "amrap", "duration": 2}"#).expect("valid");
    let timer = create_timer(&config).expect("timer");
    let mut rx = timer.subscribe();

    timer.start();
    assert_eq!(timer.wait_until_done().await, TimerState::Finished);
    drain(&mut rx);

    sleep(ms(5_000)).await;
    assert!(drain(&mut rx).is_empty());
    assert!(!timer.is_ticking());
    assert_eq!(timer.elapsed(), ms(2_000));
}

#[tokio::test(start_paused = true)]
async fn laps_after_the_end_leave_elapsed_frozen() {
    let config = TimerConfig::from_json(r#"{"type": "amrap", "duration": 2}"#).expect("valid");
    let timer = create_timer(&config).expect("timer");
    timer.start();
    assert_eq!(timer.wait_until_done().await, TimerState::Finished);

    sleep(ms(30_000)).await;
    assert!(!timer.increment_round());
    assert_eq!(timer.elapsed(), ms(2_000));
    assert_eq!(timer.snapshot().elapsed, ms(2_000));

    let stopped = create_timer(&TimerConfig::preset(WorkoutKind::ForTime)).expect("timer");
    stopped.start();
    sleep(ms(1_050)).await;
    assert!(stopped.stop());
    let at_stop = stopped.elapsed();

    sleep(ms(60_000)).await;
    assert!(!stopped.complete_round());
    assert_eq!(stopped.elapsed(), at_stop);
}

#[tokio::test(start_paused = true)]
async fn no_ticks_after_reset() {
    let timer = create_timer(&TimerConfig::preset(WorkoutKind::Emom)).expect("timer");
    let mut rx = timer.subscribe();

    timer.start();
    sleep(ms(1_250)).await;
    timer.reset();
    assert_eq!(
        non_tick(&mut rx).last(),
        Some(&TimerEvent::StateChange {
            state: TimerState::Idle
        })
    );

    sleep(ms(3_000)).await;
    assert!(drain(&mut rx).is_empty());
    assert_eq!(timer.state(), TimerState::Idle);
    assert_eq!(timer.snapshot().elapsed, Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn zero_countdown_never_reports_countdown_snapshots() {
    let config = TimerConfig::preset(WorkoutKind::Tabata).with_countdown(0);
    let timer = create_timer(&config).expect("timer");
    let mut rx = timer.subscribe();

    timer.start();
    sleep(ms(350)).await;

    let events = drain(&mut rx);
    assert!(!events.contains(&TimerEvent::CountdownStart));
    let first_tick = events
        .iter()
        .find_map(|e| match e {
            TimerEvent::Tick { snapshot } => Some(snapshot.clone()),
            _ => None,
        })
        .expect("ticked");
    assert_eq!(first_tick.is_countdown, Some(false));
    assert_eq!(first_tick.elapsed, ms(100));
}

#[tokio::test(start_paused = true)]
async fn countdown_precedes_the_workout() {
    let config = TimerConfig::from_json(
        r#"{"type": "emom", "rounds": 2, "interval": 30, "countdown": 3}"#,
    )
    .expect("valid");
    let timer = create_timer(&config).expect("timer");
    let mut rx = timer.subscribe();

    timer.start();
    sleep(ms(1_050)).await;
    let snapshot = timer.snapshot();
    assert_eq!(snapshot.is_countdown, Some(true));
    assert_eq!(snapshot.countdown_remaining, Some(ms(2_000)));

    sleep(ms(3_000)).await;
    let snapshot = timer.snapshot();
    assert_eq!(snapshot.is_countdown, Some(false));
    assert_eq!(snapshot.current_round, Some(1));
    assert_eq!(snapshot.elapsed, ms(1_000));

    let events = non_tick(&mut rx);
    assert_eq!(events.first(), Some(&TimerEvent::CountdownStart));
    assert!(events.contains(&TimerEvent::Cue {
        cue: Cue::CountdownGo
    }));
    assert!(events.contains(&TimerEvent::Start));
    assert!(events.contains(&TimerEvent::RoundStart { round: 1 }));
}

#[tokio::test(start_paused = true)]
async fn paused_time_is_not_counted() {
    let timer = create_timer(&TimerConfig::preset(WorkoutKind::Amrap)).expect("timer");
    timer.start();
    sleep(ms(10_050)).await;
    timer.pause();

    sleep(ms(60_000)).await;
    timer.resume();
    sleep(ms(5_000)).await;

    let elapsed = timer.elapsed();
    assert!(elapsed >= ms(14_950) && elapsed <= ms(15_050), "{:?}", elapsed);
    assert_eq!(
        timer.snapshot().remaining,
        Duration::from_secs(300) - elapsed
    );
}

#[tokio::test(start_paused = true)]
async fn for_time_finishes_on_the_last_round() {
    let config = TimerConfig::from_json(
        r#"{"type": "forTime", "timeCapMinutes": 15, "rounds": 2}"#,
    )
    .expect("valid");
    let timer = create_timer(&config).expect("timer");
    let mut rx = timer.subscribe();

    timer.start();
    sleep(ms(40_000)).await;
    assert!(timer.complete_round());
    sleep(ms(50_000)).await;
    assert!(timer.complete_round());

    assert_eq!(timer.state(), TimerState::Finished);
    assert_eq!(timer.split_times(), vec![ms(40_000)]);
    assert!(non_tick(&mut rx).contains(&TimerEvent::TimeRecorded {
        final_time: ms(90_000),
        rounds: 2,
    }));

    sleep(ms(1_000)).await;
    assert!(!timer.is_ticking());
}

#[test]
fn invalid_configs_are_rejected_before_construction() {
    let err = TimerConfig::from_json(r#"{"type": "hiit"}"#).expect_err("unknown type");
    assert_eq!(err.to_string(), "unknown timer type: hiit");

    let err = TimerConfig::from_json(r#"{"type": "intervals", "intervals": []}"#)
        .expect_err("empty intervals");
    assert!(matches!(err, ConfigError::EmptyIntervals));
}

#[test]
fn oversized_workouts_fail_at_construction() {
    let config = TimerConfig::new(WorkoutConfig::Tabata(TabataConfig {
        work_time: u32::MAX,
        rest_time: u32::MAX,
        rounds: u32::MAX,
        sets: 2,
        rest_between_sets: 60,
    }));
    assert!(matches!(create_timer(&config), Err(ConfigError::TooLong)));
}
