//! Tick scheduler.
//!
//! One timer thread per attack, running off the authoritative thread. A
//! timer owns nothing but its attack's [`TimerState`] atomics; every
//! effect on domain state is requested by sending an [`EngineTask`] over
//! the crossbeam channel and executed by the authoritative thread in
//! [`crate::engine::ConquestEngine::pump`].
//!
//! ## Stop/fire race
//!
//! Stopping a timer while a tick is in flight is legal and benign: a
//! stopped timer exits at its next wake-up, and a task sent by a tick that
//! raced the stop finds its attack already deregistered and is dropped.
//! Progress stages are discretized so the steady state sends no
//! cross-thread work at all unless the stage changed.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::Sender;

use conquest_shared::AttackId;

/// Number of discrete progress stages (marker colors).
pub const PROGRESS_STAGES: u8 = 10;

/// Work requested of the authoritative thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineTask {
    /// An attack reached its required duration; finalize it.
    FinishAttack(AttackId),
    /// An attack crossed a progress stage boundary; repaint its marker.
    RepaintMarker {
        /// The attack whose marker should be repainted.
        attack: AttackId,
        /// The new progress stage.
        stage: u8,
    },
    /// The dirty flag was set; copy the current state and hand it to the
    /// snapshot writer.
    Flush,
}

/// Progress counters shared between an attack's timer thread and the
/// authoritative thread.
#[derive(Debug)]
pub struct TimerState {
    /// Elapsed progress in ticks. Written by the timer thread, read by the
    /// authoritative thread for snapshots.
    progress: AtomicU64,
    /// Required total duration in ticks.
    required: u64,
    /// Last published progress stage.
    stage: AtomicU8,
    /// Set once the timer must not fire again.
    stopped: AtomicBool,
}

impl TimerState {
    /// Creates timer state with pre-seeded progress (used when restoring a
    /// persisted attack).
    #[must_use]
    pub fn new(required: u64, progress: u64) -> Self {
        Self {
            progress: AtomicU64::new(progress),
            required,
            stage: AtomicU8::new(Self::stage_for(progress, required)),
            stopped: AtomicBool::new(false),
        }
    }

    /// Current elapsed progress in ticks.
    #[must_use]
    pub fn progress(&self) -> u64 {
        self.progress.load(Ordering::Acquire)
    }

    /// Required total duration in ticks.
    #[must_use]
    pub const fn required(&self) -> u64 {
        self.required
    }

    /// Last published progress stage.
    #[must_use]
    pub fn stage(&self) -> u8 {
        self.stage.load(Ordering::Acquire)
    }

    /// Whether the timer has been stopped.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Discretizes progress into one of [`PROGRESS_STAGES`] buckets.
    #[must_use]
    pub fn stage_for(progress: u64, required: u64) -> u8 {
        if required == 0 {
            return PROGRESS_STAGES - 1;
        }
        let stage = progress.saturating_mul(u64::from(PROGRESS_STAGES)) / required;
        stage.min(u64::from(PROGRESS_STAGES - 1)) as u8
    }
}

/// Handle to a running attack timer. Held by the attack; stopping is
/// idempotent and safe to call while a tick is in flight.
#[derive(Debug)]
pub struct TimerHandle {
    state: Arc<TimerState>,
    thread: Option<JoinHandle<()>>,
}

impl TimerHandle {
    /// Shared progress state.
    #[must_use]
    pub fn state(&self) -> &Arc<TimerState> {
        &self.state
    }

    /// Stops the timer and wakes its thread so it exits promptly; any task
    /// it already sent is dropped by the authoritative thread.
    pub fn stop(&self) {
        self.state.stopped.store(true, Ordering::Release);
        if let Some(handle) = &self.thread {
            handle.thread().unpark();
        }
    }

    /// Stops the timer and blocks until its thread has exited. Used only
    /// during engine shutdown.
    pub fn stop_and_join(&mut self) {
        self.stop();
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

/// Spawns the periodic timer for one attack.
///
/// Each fire advances progress by one tick. When progress reaches the
/// required duration the timer stops itself and submits
/// [`EngineTask::FinishAttack`]; otherwise it publishes the discretized
/// stage and submits [`EngineTask::RepaintMarker`] only when the stage
/// changed.
pub fn spawn_attack_timer(
    attack: AttackId,
    state: Arc<TimerState>,
    period: Duration,
    tasks: Sender<EngineTask>,
) -> TimerHandle {
    let shared = Arc::clone(&state);
    let thread = std::thread::spawn(move || {
        'ticks: loop {
            // interruptible sleep: stop() unparks the thread
            let deadline = std::time::Instant::now() + period;
            loop {
                if shared.stopped.load(Ordering::Acquire) {
                    break 'ticks;
                }
                let now = std::time::Instant::now();
                if now >= deadline {
                    break;
                }
                std::thread::park_timeout(deadline - now);
            }

            let progress = shared.progress.fetch_add(1, Ordering::AcqRel) + 1;
            if progress >= shared.required {
                shared.stopped.store(true, Ordering::Release);
                let _ = tasks.send(EngineTask::FinishAttack(attack));
                break;
            }

            let stage = TimerState::stage_for(progress, shared.required);
            let previous = shared.stage.swap(stage, Ordering::AcqRel);
            if stage != previous
                && tasks
                    .send(EngineTask::RepaintMarker { attack, stage })
                    .is_err()
            {
                break;
            }
        }
    });

    TimerHandle {
        state,
        thread: Some(thread),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn test_stage_buckets() {
        assert_eq!(TimerState::stage_for(0, 100), 0);
        assert_eq!(TimerState::stage_for(9, 100), 0);
        assert_eq!(TimerState::stage_for(10, 100), 1);
        assert_eq!(TimerState::stage_for(99, 100), 9);
        assert_eq!(TimerState::stage_for(100, 100), 9);
        assert_eq!(TimerState::stage_for(500, 100), 9);
    }

    #[test]
    fn test_seeded_progress_sets_stage() {
        let state = TimerState::new(100, 55);
        assert_eq!(state.progress(), 55);
        assert_eq!(state.stage(), 5);
    }

    #[test]
    fn test_timer_finishes_and_stops() {
        let (tx, rx) = unbounded();
        let state = Arc::new(TimerState::new(3, 0));
        let mut handle = spawn_attack_timer(
            AttackId::new(1),
            Arc::clone(&state),
            Duration::from_millis(2),
            tx,
        );

        let task = rx
            .recv_timeout(Duration::from_secs(2))
            .expect("timer should submit finish");
        assert_eq!(task, EngineTask::FinishAttack(AttackId::new(1)));
        assert!(state.is_stopped());
        assert_eq!(state.progress(), 3);
        handle.stop_and_join();
    }

    #[test]
    fn test_stage_change_submits_repaint() {
        let (tx, rx) = unbounded();
        // required=20: stage changes every 2 ticks
        let state = Arc::new(TimerState::new(20, 0));
        let mut handle = spawn_attack_timer(
            AttackId::new(2),
            Arc::clone(&state),
            Duration::from_millis(2),
            tx,
        );

        let task = rx
            .recv_timeout(Duration::from_secs(2))
            .expect("timer should publish a stage change");
        assert!(matches!(
            task,
            EngineTask::RepaintMarker {
                attack,
                stage: 1..,
            } if attack == AttackId::new(2)
        ));
        handle.stop_and_join();
    }

    #[test]
    fn test_stop_is_idempotent_and_quiet() {
        let (tx, rx) = unbounded();
        let state = Arc::new(TimerState::new(1000, 0));
        let mut handle = spawn_attack_timer(
            AttackId::new(3),
            Arc::clone(&state),
            Duration::from_millis(1),
            tx,
        );

        handle.stop();
        handle.stop();
        handle.stop_and_join();

        // after the thread exits, no further tasks can arrive
        while rx.try_recv().is_ok() {}
        std::thread::sleep(Duration::from_millis(10));
        assert!(rx.try_recv().is_err());
    }
}
