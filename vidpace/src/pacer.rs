/*!
    Fixed-rate frame pacing.

    A timer thread emits one tick per frame interval into a channel with room
    for a single tick. The consumer blocks on [`FramePacer::wait`] before each
    presentation, which throttles the pipeline to the target rate. Ticks that
    arrive while the previous one is still unconsumed are dropped, so a slow
    consumer never sees a burst of catch-up frames.

    Stopping goes through an owned stop token (a flag behind a mutex plus a
    condition variable), so a timer asleep mid-interval wakes immediately.
*/

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError, bounded};
use parking_lot::{Condvar, Mutex};
use thiserror::Error;

const TIMER_THREAD_NAME: &str = "vidpace-pacer";

/// Extra slack on top of a few intervals before `wait` checks the timer is still alive.
const WAIT_CHECK_SLACK: Duration = Duration::from_millis(50);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PacerError {
    #[error("pacer is already running")]
    AlreadyRunning,
    #[error("pacer is not running")]
    NotRunning,
    #[error("frame rate must be at least 1 fps")]
    InvalidRate,
    #[error("failed to spawn timer thread: {0}")]
    Spawn(String),
    #[error("timer thread exited unexpectedly")]
    TimerExited,
}

/**
    Shared stop flag and its wakeup.

    The flag is only read or written while holding the mutex.
*/
#[derive(Default)]
struct StopToken {
    stopped: Mutex<bool>,
    wake: Condvar,
}

impl StopToken {
    fn stop(&self) {
        *self.stopped.lock() = true;
        self.wake.notify_all();
    }
}

struct Timer {
    token: Arc<StopToken>,
    thread: JoinHandle<()>,
    interval: Duration,
}

/**
    Handle to a stopping timer thread.

    Returned by [`FramePacer::stop`]. Joining guarantees the thread has exited
    and posts no further ticks.
*/
#[must_use = "join the handle to wait for the timer thread to exit"]
pub struct PacerHandle {
    thread: JoinHandle<()>,
}

impl PacerHandle {
    pub fn join(self) -> Result<(), PacerError> {
        self.thread.join().map_err(|_| PacerError::TimerExited)
    }
}

/**
    Frame pacer.

    Stopped on creation. [`FramePacer::start`] moves it to running,
    [`FramePacer::stop`] back to stopped; the cycle can repeat. Dropping a
    running pacer stops it and joins the timer thread.
*/
pub struct FramePacer {
    ticks_tx: Sender<Instant>,
    ticks_rx: Receiver<Instant>,
    timer: Option<Timer>,
}

impl FramePacer {
    pub fn new() -> Self {
        let (ticks_tx, ticks_rx) = bounded(1);
        Self {
            ticks_tx,
            ticks_rx,
            timer: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /**
        Interval between ticks, while running.
    */
    pub fn interval(&self) -> Option<Duration> {
        self.timer.as_ref().map(|t| t.interval)
    }

    /**
        Spawn the timer thread and return immediately.

        The first tick arrives one interval after this call.
    */
    pub fn start(&mut self, target_fps: u32) -> Result<(), PacerError> {
        if self.timer.is_some() {
            return Err(PacerError::AlreadyRunning);
        }
        if target_fps == 0 {
            return Err(PacerError::InvalidRate);
        }

        // A tick left over from a previous run would release the first wait early
        while self.ticks_rx.try_recv().is_ok() {}

        let interval = Duration::from_secs(1) / target_fps;
        let token = Arc::new(StopToken::default());

        let thread = {
            let token = Arc::clone(&token);
            let ticks = self.ticks_tx.clone();
            thread::Builder::new()
                .name(TIMER_THREAD_NAME.into())
                .spawn(move || run_timer(&token, &ticks, interval))
                .map_err(|e| PacerError::Spawn(e.to_string()))?
        };

        tracing::debug!(target_fps, ?interval, "pacer started");

        self.timer = Some(Timer {
            token,
            thread,
            interval,
        });
        Ok(())
    }

    /**
        Signal the timer thread to exit.

        Returns `None` if the pacer was not running. The timer wakes at once
        even when it is mid-interval; join the handle to wait for it.
    */
    pub fn stop(&mut self) -> Option<PacerHandle> {
        let timer = self.timer.take()?;
        timer.token.stop();
        tracing::debug!("pacer stopped");
        Some(PacerHandle {
            thread: timer.thread,
        })
    }

    /**
        Block until the next tick.

        Fails with [`PacerError::NotRunning`] when stopped, and with
        [`PacerError::TimerExited`] if the timer thread died.
    */
    pub fn wait(&self) -> Result<(), PacerError> {
        let Some(timer) = &self.timer else {
            return Err(PacerError::NotRunning);
        };

        let check_every = timer.interval.saturating_mul(4) + WAIT_CHECK_SLACK;
        loop {
            match self.ticks_rx.recv_timeout(check_every) {
                Ok(_) => return Ok(()),
                Err(RecvTimeoutError::Timeout) if !timer.thread.is_finished() => {}
                Err(_) => return Err(PacerError::TimerExited),
            }
        }
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for FramePacer {
    fn drop(&mut self) {
        if let Some(handle) = self.stop() {
            let _ = handle.join();
        }
    }
}

impl std::fmt::Debug for FramePacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FramePacer")
            .field("running", &self.is_running())
            .field("interval", &self.interval())
            .finish_non_exhaustive()
    }
}

fn run_timer(token: &StopToken, ticks: &Sender<Instant>, interval: Duration) {
    let mut deadline = Instant::now() + interval;
    let mut stopped = token.stopped.lock();

    loop {
        while !*stopped {
            if token.wake.wait_until(&mut stopped, deadline).timed_out() {
                break;
            }
        }
        if *stopped {
            break;
        }

        match ticks.try_send(Instant::now()) {
            Ok(()) | Err(TrySendError::Full(_)) => {}
            Err(TrySendError::Disconnected(_)) => break,
        }

        // Schedule from the deadline, not from now, so intervals do not drift.
        // After a long stall restart the schedule instead of bursting.
        deadline += interval;
        let now = Instant::now();
        if deadline < now {
            deadline = now + interval;
        }
    }
}
