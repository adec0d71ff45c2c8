//! End-to-end tests for the threaded clock driving a brew session.
//!
//! Time comes from a `ManualTimeSource` so readings are exact; only the
//! channel hand-off between threads runs on real time.

use brew_engine::clock::{ClockConfig, ManualTimeSource, PrecisionClock};
use brew_engine::core::{BrewStatus, Recipe, RecipeStep, State};
use brew_engine::session::{BrewSession, BrewView};
use std::time::{Duration, Instant};

const WAIT: Duration = Duration::from_secs(2);

fn config() -> ClockConfig {
    ClockConfig::default().with_tick_interval(Duration::from_millis(2))
}

fn v60() -> Recipe {
    Recipe::default().with_name("Standard V60")
}

fn session(recipe: Recipe) -> (BrewSession, ManualTimeSource) {
    let time = ManualTimeSource::new();
    let session = BrewSession::with_time_source(recipe, config(), time.clone()).unwrap();
    (session, time)
}

/// Start and wait until the worker has applied the start.
fn start(session: &mut BrewSession) {
    session.start();
    session.wait(WAIT);
}

/// Keep applying samples until `done` holds for the view.
fn wait_until(session: &mut BrewSession, done: impl Fn(&BrewView) -> bool) -> BrewView {
    let deadline = Instant::now() + WAIT;
    loop {
        let view = session.wait(Duration::from_millis(50));
        if done(&view) {
            return view;
        }
        assert!(Instant::now() < deadline, "session never reached expected view: {:?}", view);
    }
}

#[test]
fn scenario_a_volumes_follow_steps() {
    let (mut session, time) = session(Recipe::new(
        15.0,
        16.0,
        vec![
            RecipeStep::new("Bloom", 20.0, 45),
            RecipeStep::new("Pour", 40.0, 45),
            RecipeStep::new("Pour", 40.0, 45),
        ],
    ));

    let view = session.poll();
    assert_eq!(view.output.step_index, 0);
    assert_eq!(view.output.cumulative_target_volume, 48.0);

    start(&mut session);
    time.advance(Duration::from_secs(45));
    let view = wait_until(&mut session, |v| v.elapsed_ms >= 45_000.0);
    assert_eq!(view.output.step_index, 1);
    assert_eq!(view.output.step_progress, 0.0);
    assert_eq!(view.output.cumulative_target_volume, 144.0);

    time.advance(Duration::from_secs(45));
    let view = wait_until(&mut session, |v| v.elapsed_ms >= 90_000.0);
    assert_eq!(view.output.step_index, 2);
    assert_eq!(view.output.cumulative_target_volume, 240.0);

    time.advance(Duration::from_secs(45));
    let view = wait_until(&mut session, |v| v.output.finished);
    assert_eq!(view.output.step_progress, 1.0);
    assert_eq!(view.output.cumulative_target_volume, 240.0);
}

#[test]
fn scenario_b_sync_while_running_then_pause() {
    let (mut session, time) = session(v60());
    start(&mut session);

    session.sync(30_000.0);
    let view = session.wait(WAIT);
    assert_eq!(view.elapsed_ms, 30_000.0);

    time.advance(Duration::from_millis(5_000));
    session.pause();

    let view = wait_until(&mut session, |v| v.elapsed_ms >= 35_000.0);
    assert_eq!(view.elapsed_ms, 35_000.0);
    assert_eq!(view.output.step_index, 0);
}

#[test]
fn scenario_c_recipe_swap_resets_everything() {
    let (mut session, time) = session(v60());
    start(&mut session);
    time.advance(Duration::from_secs(200));
    let view = wait_until(&mut session, |v| v.output.finished);
    assert!(view.output.finished);

    let mut two_pours = v60();
    two_pours.steps.pop();
    assert!(session.load_recipe(two_pours).unwrap());

    let view = session.poll();
    assert_eq!(view.output.step_index, 0);
    assert!(!view.output.finished);
    assert_eq!(view.status, BrewStatus::Ready);

    // The clock itself was reset, not just the view.
    let view = session.wait(WAIT);
    assert_eq!(view.elapsed_ms, 0.0);
    assert!(!session.is_running());
}

#[test]
fn brew_stops_itself_when_last_step_ends() {
    let (mut session, time) = session(v60());
    start(&mut session);
    time.advance(Duration::from_secs(140));

    let view = wait_until(&mut session, |v| v.output.finished);
    assert!(!view.running);
    assert!(session.is_finished());
    assert!(view.status.is_final());

    // A finished brew ignores the run/pause toggle until reset.
    session.toggle();
    assert!(!session.is_running());

    session.reset();
    session.toggle();
    assert!(session.is_running());
}

#[test]
fn brew_log_records_every_phase() {
    let (mut session, time) = session(v60());
    start(&mut session);

    for _ in 0..3 {
        time.advance(Duration::from_secs(45));
        let target = session.view().elapsed_ms + 45_000.0;
        wait_until(&mut session, |v| v.elapsed_ms >= target || v.output.finished);
    }

    let path: Vec<BrewStatus> = session.history().get_path().into_iter().cloned().collect();
    assert_eq!(path.first(), Some(&BrewStatus::Ready));
    assert!(path.contains(&BrewStatus::Brewing { step: 1 }));
    assert!(path.contains(&BrewStatus::Brewing { step: 2 }));
    assert_eq!(path.last(), Some(&BrewStatus::Finished));
}

#[test]
fn snapshot_restores_into_a_new_session() {
    let (mut first, time) = session(v60());
    start(&mut first);
    time.advance(Duration::from_secs(60));
    first.pause();
    wait_until(&mut first, |v| v.elapsed_ms >= 60_000.0);

    let snapshot = first.snapshot();
    assert!(!snapshot.running);
    let bytes = snapshot.to_bytes().unwrap();
    drop(first);

    let (mut second, time) = session(v60());
    let restored = brew_engine::snapshot::SessionSnapshot::from_bytes(&bytes).unwrap();
    let view = second.restore(&restored).unwrap();
    assert_eq!(view.elapsed_ms, 60_000.0);
    assert_eq!(view.output.step_index, 1);
    assert_eq!(second.history(), &snapshot.history);

    // Paused snapshots stay paused.
    time.advance(Duration::from_secs(30));
    let view = second.wait(WAIT);
    assert_eq!(view.elapsed_ms, 60_000.0);
}

#[test]
fn running_snapshot_resumes_running() {
    let (mut first, time) = session(v60());
    start(&mut first);
    time.advance(Duration::from_secs(20));
    wait_until(&mut first, |v| v.elapsed_ms >= 20_000.0);
    let snapshot = first.snapshot();
    assert!(snapshot.running);

    let (mut second, time) = session(v60());
    second.restore(&snapshot).unwrap();
    assert!(second.is_running());
    // Let the worker apply the queued sync and start before time moves.
    std::thread::sleep(Duration::from_millis(100));

    time.advance(Duration::from_secs(30));
    let view = wait_until(&mut second, |v| v.elapsed_ms >= snapshot.elapsed_ms + 30_000.0);
    assert_eq!(view.output.step_index, 1);
}

#[test]
fn reset_start_pause_is_near_zero_on_the_system_clock() {
    let clock = PrecisionClock::spawn(ClockConfig::default()).unwrap();
    clock.reset();
    clock.start();
    clock.pause();

    let mut seen_running = false;
    let paused = loop {
        let sample = clock.next_sample(WAIT).expect("clock stopped emitting");
        if sample.running {
            seen_running = true;
        } else if seen_running {
            break sample;
        }
    };
    assert!(paused.elapsed_ms < 50.0, "expected ~0ms, got {}", paused.elapsed_ms);
    clock.shutdown();
}
