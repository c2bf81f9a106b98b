//! The stopwatch component: timer engine, idle-hide controller and their scheduled tasks

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Instant,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info, warn};

use super::{DisplaySnapshot, KeyPress, TimerState, VisibilityState};
use crate::{
    clock::{Clock, SystemClock},
    config::Timing,
    tasks::{idle_hide_task, ticker_task},
};

/// Result of forwarding a key-press
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyOutcome {
    /// The key toggled the stopwatch
    pub handled: bool,
    /// The page should suppress the key's default behaviour
    pub prevent_default: bool,
    pub display: DisplaySnapshot,
}

/// Everything guarded by the component lock
#[derive(Debug, Default)]
struct Stopwatch {
    timer: TimerState,
    visibility: VisibilityState,
    ticker: Option<JoinHandle<()>>,
    idle_hide: Option<JoinHandle<()>>,
    /// Bumped whenever the ticker is cancelled; a ticker with an older value is stale
    run_generation: u64,
    /// Same for the idle-hide task
    idle_generation: u64,
    torn_down: bool,
}

impl Stopwatch {
    fn snapshot(&self) -> DisplaySnapshot {
        DisplaySnapshot::capture(&self.timer, &self.visibility)
    }

    fn cancel_ticker(&mut self) {
        self.run_generation += 1;
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }

    fn cancel_idle_hide(&mut self) {
        self.idle_generation += 1;
        if let Some(handle) = self.idle_hide.take() {
            handle.abort();
        }
    }
}

/// Main application state: one stopwatch plus server metadata
#[derive(Debug)]
pub struct AppState {
    stopwatch: Mutex<Stopwatch>,
    clock: Arc<dyn Clock>,
    /// Tick cadence and idle-hide delay
    pub timing: Timing,
    pub title: String,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
    /// Published display, read by the presentation layer
    pub display_tx: watch::Sender<DisplaySnapshot>,
}

impl AppState {
    /// Create a new AppState reading time from the system clock
    pub fn new(port: u16, host: String, title: String, timing: Timing) -> Self {
        Self::with_clock(port, host, title, timing, Arc::new(SystemClock::new()))
    }

    /// Create a new AppState with an explicit time source
    pub fn with_clock(
        port: u16,
        host: String,
        title: String,
        timing: Timing,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (display_tx, _) = watch::channel(DisplaySnapshot::default());

        Self {
            stopwatch: Mutex::new(Stopwatch::default()),
            clock,
            timing,
            title,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            display_tx,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Stopwatch>, String> {
        self.stopwatch
            .lock()
            .map_err(|e| format!("Failed to lock stopwatch state: {}", e))
    }

    /// Apply a state change under the lock, then record and flush it.
    ///
    /// `apply` returns the name of the action it performed, or `None` when
    /// the call was a no-op in the current state.
    fn transition<F>(self: &Arc<Self>, requested: &str, apply: F) -> Result<DisplaySnapshot, String>
    where
        F: FnOnce(&Arc<Self>, &mut Stopwatch, i64) -> Option<&'static str>,
    {
        let mut stopwatch = self.lock()?;
        if stopwatch.torn_down {
            warn!("Ignoring {} after teardown", requested);
            return Ok(stopwatch.snapshot());
        }

        let now = self.clock.now_ms();
        let performed = apply(self, &mut *stopwatch, now);
        let snapshot = stopwatch.snapshot();

        match performed {
            // Publish before releasing the lock so a later transition can't be overwritten
            Some(action) => {
                self.flush(snapshot.clone());
                drop(stopwatch);
                self.record_action(action);
            }
            None => debug!("{} had no effect", requested),
        }

        Ok(snapshot)
    }

    fn start_locked(self: &Arc<Self>, stopwatch: &mut Stopwatch, now: i64) -> Option<&'static str> {
        if !stopwatch.timer.start(now) {
            return None;
        }

        stopwatch.cancel_ticker();
        let generation = stopwatch.run_generation;
        stopwatch.ticker = Some(tokio::spawn(ticker_task(
            Arc::downgrade(self),
            generation,
            self.timing.tick,
        )));
        self.arm_idle_timer_locked(stopwatch, now);

        info!("Stopwatch started at {}", stopwatch.timer.display());
        Some("start")
    }

    fn stop_locked(&self, stopwatch: &mut Stopwatch, now: i64) -> Option<&'static str> {
        if !stopwatch.timer.is_running() {
            return None;
        }

        stopwatch.cancel_ticker();
        stopwatch.timer.stop(now);
        stopwatch.cancel_idle_hide();
        stopwatch.visibility.reveal();

        info!("Stopwatch stopped at {}", stopwatch.timer.display());
        Some("stop")
    }

    fn arm_idle_timer_locked(self: &Arc<Self>, stopwatch: &mut Stopwatch, now: i64) {
        stopwatch.cancel_idle_hide();
        stopwatch
            .visibility
            .arm(now, self.timing.idle_hide.as_millis() as u64);

        let generation = stopwatch.idle_generation;
        stopwatch.idle_hide = Some(tokio::spawn(idle_hide_task(
            Arc::downgrade(self),
            generation,
            self.timing.idle_hide,
        )));
    }

    /// Start or resume timing. No effect while already running.
    pub fn start(self: &Arc<Self>) -> Result<DisplaySnapshot, String> {
        self.transition("start", |state, stopwatch, now| state.start_locked(stopwatch, now))
    }

    /// Freeze the elapsed time and show the display. No effect while stopped.
    pub fn stop(self: &Arc<Self>) -> Result<DisplaySnapshot, String> {
        self.transition("stop", |state, stopwatch, now| state.stop_locked(stopwatch, now))
    }

    /// Start when stopped, stop when running
    pub fn toggle(self: &Arc<Self>) -> Result<DisplaySnapshot, String> {
        self.transition("toggle", |state, stopwatch, now| {
            if stopwatch.timer.is_running() {
                state.stop_locked(stopwatch, now)
            } else {
                state.start_locked(stopwatch, now)
            }
        })
    }

    /// Cancel both tasks and zero the stopwatch
    pub fn reset(self: &Arc<Self>) -> Result<DisplaySnapshot, String> {
        self.transition("reset", |_, stopwatch, _| {
            stopwatch.cancel_ticker();
            stopwatch.cancel_idle_hide();
            stopwatch.timer.reset();
            stopwatch.visibility.reveal();

            info!("Stopwatch reset");
            Some("reset")
        })
    }

    /// Pointer movement: reveal the display and restart the idle window while running
    pub fn activity(self: &Arc<Self>) -> Result<DisplaySnapshot, String> {
        self.transition("activity", |state, stopwatch, now| {
            if !stopwatch.timer.is_running() {
                return None;
            }

            state.arm_idle_timer_locked(stopwatch, now);
            debug!("Activity, display hides after {:?}", state.timing.idle_hide);
            Some("activity")
        })
    }

    /// Space toggles the stopwatch; every other key is left to the page
    pub fn key_press(self: &Arc<Self>, key: &KeyPress) -> Result<KeyOutcome, String> {
        if !key.is_space() {
            debug!("Ignoring key {:?} ({:?})", key.key, key.code);
            return Ok(KeyOutcome {
                handled: false,
                prevent_default: false,
                display: self.snapshot()?,
            });
        }

        let display = self.toggle()?;
        Ok(KeyOutcome {
            handled: true,
            prevent_default: true,
            display,
        })
    }

    /// One ticker step. Returns false once the ticker is stale and should exit.
    ///
    /// Publishes only when the rendered snapshot changed.
    pub fn tick(&self, generation: u64) -> Result<bool, String> {
        let mut stopwatch = self.lock()?;
        if stopwatch.torn_down
            || !stopwatch.timer.is_running()
            || stopwatch.run_generation != generation
        {
            return Ok(false);
        }

        stopwatch.timer.recompute(self.clock.now_ms());
        let snapshot = stopwatch.snapshot();

        self.display_tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });

        Ok(true)
    }

    /// Idle-hide expiry. Hides the display if the stopwatch is still running
    /// and no newer activity re-armed the timer.
    ///
    /// A current generation means the full idle period has passed since the last arm.
    pub fn hide_if_idle(&self, generation: u64) -> Result<(), String> {
        let mut stopwatch = self.lock()?;
        if stopwatch.torn_down || stopwatch.idle_generation != generation {
            return Ok(());
        }

        stopwatch.idle_hide = None;
        if !stopwatch.timer.is_running() {
            return Ok(());
        }

        stopwatch.visibility.hide();
        debug!("No activity for {:?}, hiding display", self.timing.idle_hide);
        self.flush(stopwatch.snapshot());

        Ok(())
    }

    /// Cancel the ticker and idle-hide task for good. Later actions are ignored.
    pub fn teardown(&self) -> Result<(), String> {
        let mut stopwatch = self.lock()?;
        if stopwatch.torn_down {
            return Ok(());
        }

        stopwatch.cancel_ticker();
        stopwatch.cancel_idle_hide();
        stopwatch.timer.halt();
        stopwatch.torn_down = true;

        info!("Stopwatch torn down at {}", stopwatch.timer.display());
        Ok(())
    }

    /// Push a snapshot to every subscriber unconditionally
    fn flush(&self, snapshot: DisplaySnapshot) {
        self.display_tx.send_replace(snapshot);
    }

    /// Subscribe to published snapshots
    pub fn subscribe(&self) -> watch::Receiver<DisplaySnapshot> {
        self.display_tx.subscribe()
    }

    /// Current snapshot as held by the component
    pub fn snapshot(&self) -> Result<DisplaySnapshot, String> {
        self.lock().map(|stopwatch| stopwatch.snapshot())
    }

    /// Get current timer state
    pub fn get_timer_state(&self) -> Result<TimerState, String> {
        self.lock().map(|stopwatch| stopwatch.timer.clone())
    }

    /// Get current visibility state
    pub fn get_visibility_state(&self) -> Result<VisibilityState, String> {
        self.lock().map(|stopwatch| stopwatch.visibility.clone())
    }

    pub fn is_torn_down(&self) -> Result<bool, String> {
        self.lock().map(|stopwatch| stopwatch.torn_down)
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use tokio::time::sleep;

    fn stopwatch() -> Arc<AppState> {
        Arc::new(AppState::new(
            0,
            "127.0.0.1".to_string(),
            "STOPWATCH".to_string(),
            Timing::default(),
        ))
    }

    fn visible(state: &AppState) -> bool {
        state.get_visibility_state().unwrap().is_visible()
    }

    #[tokio::test(start_paused = true)]
    async fn start_then_immediate_stop_shows_zero() {
        let state = stopwatch();
        state.start().unwrap();
        let display = state.stop().unwrap();

        assert_eq!(display.formatted, "00:00:00");
        assert_eq!(display.elapsed_ms, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn measures_simulated_time() {
        let state = stopwatch();
        state.start().unwrap();
        sleep(Duration::from_millis(1500)).await;
        let display = state.stop().unwrap();

        assert_eq!(display.elapsed_ms, 1500);
        assert_eq!(display.formatted, "00:01:50");
        assert!(!display.running);
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_keeps_published_display_current() {
        let state = stopwatch();
        let rx = state.subscribe();
        state.start().unwrap();

        sleep(Duration::from_millis(255)).await;

        let published = rx.borrow().clone();
        assert!(published.running);
        assert!(published.elapsed_ms >= 240 && published.elapsed_ms <= 255);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_then_start_resumes() {
        let state = stopwatch();
        state.start().unwrap();
        sleep(Duration::from_millis(700)).await;
        state.stop().unwrap();

        sleep(Duration::from_millis(5_000)).await;

        state.start().unwrap();
        sleep(Duration::from_millis(300)).await;
        let display = state.stop().unwrap();

        assert_eq!(display.elapsed_ms, 1_000);
        assert_eq!(display.formatted, "00:01:00");
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_display_does_not_advance() {
        let state = stopwatch();
        state.start().unwrap();
        sleep(Duration::from_millis(120)).await;
        state.stop().unwrap();
        let frozen = state.snapshot().unwrap();

        sleep(Duration::from_millis(1_000)).await;
        assert_eq!(state.snapshot().unwrap(), frozen);
        assert_eq!(*state.subscribe().borrow(), frozen);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_from_any_state_zeroes() {
        let state = stopwatch();

        state.start().unwrap();
        sleep(Duration::from_millis(2_500)).await;
        assert!(!visible(&state));
        let display = state.reset().unwrap();
        assert_eq!(display.formatted, "00:00:00");
        assert_eq!(display.elapsed_ms, 0);
        assert!(!display.running);
        assert!(display.visible);

        // the cancelled ticker must not bring the old time back
        sleep(Duration::from_millis(100)).await;
        assert_eq!(state.snapshot().unwrap().elapsed_ms, 0);

        state.start().unwrap();
        sleep(Duration::from_millis(40)).await;
        state.stop().unwrap();
        let display = state.reset().unwrap();
        assert_eq!(display, DisplaySnapshot::default());
    }

    #[tokio::test(start_paused = true)]
    async fn hides_after_idle_period_while_running() {
        let state = stopwatch();
        state.start().unwrap();

        sleep(Duration::from_millis(1_990)).await;
        assert!(visible(&state));

        sleep(Duration::from_millis(20)).await;
        assert!(!visible(&state));
        assert!(!state.subscribe().borrow().visible);
    }

    #[tokio::test(start_paused = true)]
    async fn activity_restarts_idle_window() {
        let state = stopwatch();
        state.start().unwrap();

        sleep(Duration::from_millis(1_500)).await;
        state.activity().unwrap();

        sleep(Duration::from_millis(1_500)).await;
        assert!(visible(&state));

        sleep(Duration::from_millis(600)).await;
        assert!(!visible(&state));

        let display = state.activity().unwrap();
        assert!(display.visible);
    }

    #[tokio::test(start_paused = true)]
    async fn activity_while_stopped_is_ignored() {
        let state = stopwatch();
        state.activity().unwrap();

        assert_eq!(state.get_last_action(), (None, None));
        assert_eq!(state.get_visibility_state().unwrap(), VisibilityState::new());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_reveals_hidden_display() {
        let state = stopwatch();
        state.start().unwrap();
        sleep(Duration::from_millis(2_100)).await;
        assert!(!visible(&state));

        let display = state.stop().unwrap();
        assert!(display.visible);

        sleep(Duration::from_millis(5_000)).await;
        assert!(visible(&state));
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_start_and_stop_are_no_ops() {
        let state = stopwatch();
        state.start().unwrap();
        let epoch = state.get_timer_state().unwrap().start_epoch;

        sleep(Duration::from_millis(300)).await;
        state.start().unwrap();
        assert_eq!(state.get_timer_state().unwrap().start_epoch, epoch);

        let stopped = state.stop().unwrap();
        sleep(Duration::from_millis(300)).await;
        assert_eq!(state.stop().unwrap(), stopped);
        assert_eq!(state.get_last_action().0.as_deref(), Some("stop"));
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_alternates() {
        let state = stopwatch();
        assert!(state.toggle().unwrap().running);
        assert!(!state.toggle().unwrap().running);
        assert_eq!(state.get_last_action().0.as_deref(), Some("stop"));
    }

    #[tokio::test(start_paused = true)]
    async fn space_toggles_and_prevents_default() {
        let state = stopwatch();

        let outcome = state.key_press(&KeyPress::new(" ", "Space")).unwrap();
        assert!(outcome.handled);
        assert!(outcome.prevent_default);
        assert!(outcome.display.running);

        let outcome = state.key_press(&KeyPress::new("Enter", "Enter")).unwrap();
        assert!(!outcome.handled);
        assert!(!outcome.prevent_default);
        assert!(outcome.display.running);

        let outcome = state.key_press(&KeyPress::new("", "Space")).unwrap();
        assert!(!outcome.display.running);
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_cancels_tasks_and_ignores_later_actions() {
        let state = stopwatch();
        state.start().unwrap();
        sleep(Duration::from_millis(100)).await;

        state.teardown().unwrap();
        let at_teardown = state.get_timer_state().unwrap();
        assert!(!at_teardown.running);

        sleep(Duration::from_millis(3_000)).await;
        assert_eq!(state.get_timer_state().unwrap(), at_teardown);
        assert!(visible(&state));

        assert!(!state.start().unwrap().running);
        assert!(state.is_torn_down().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_tick_generation_is_rejected() {
        let state = stopwatch();
        state.start().unwrap();
        let stale = state.lock().unwrap().run_generation;
        state.stop().unwrap();
        state.start().unwrap();

        assert!(!state.tick(stale).unwrap());
        assert!(state.tick(stale + 2).unwrap());
    }

    #[derive(Debug)]
    struct FrozenClock(i64);

    impl Clock for FrozenClock {
        fn now_ms(&self) -> i64 {
            self.0
        }
    }

    #[tokio::test(start_paused = true)]
    async fn hides_after_idle_period_with_unrelated_clock() {
        let state = Arc::new(AppState::with_clock(
            0,
            "127.0.0.1".to_string(),
            "STOPWATCH".to_string(),
            Timing::default(),
            Arc::new(FrozenClock(1_000)),
        ));
        state.start().unwrap();

        sleep(Duration::from_millis(2_100)).await;
        assert!(!visible(&state));
        assert!(state.snapshot().unwrap().running);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn published_display_matches_state_after_concurrent_transitions() {
        let state = Arc::new(AppState::new(
            0,
            "127.0.0.1".to_string(),
            "STOPWATCH".to_string(),
            Timing {
                tick: Duration::from_millis(1),
                idle_hide: Duration::from_millis(2_000),
            },
        ));
        let rx = state.subscribe();

        for _ in 0..500 {
            state.start().unwrap();

            let stopper = {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    state.stop().unwrap();
                })
            };
            let resetter = {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    state.reset().unwrap();
                    state.toggle().unwrap();
                })
            };
            let (stopped, reset) = tokio::join!(stopper, resetter);
            stopped.unwrap();
            reset.unwrap();

            state.stop().unwrap();
            sleep(Duration::from_millis(2)).await;

            let published = rx.borrow().clone();
            assert_eq!(published, state.snapshot().unwrap());
            assert!(!published.running);
        }
    }
}
