//! Game orchestration - session lifecycle around the match engine.
//!
//! A [`Game`] owns the pad and speaker between sessions and lends them
//! to a dedicated game thread while one runs:
//! 1. START: wire pad callbacks to a fresh event queue, spawn the thread
//! 2. RUN: the thread drains presses through [`MatchEngine`]
//! 3. RECLAIM: join the thread, take the hardware back for the next round
//!
//! The queue is rebuilt on every start, so a new session can never see
//! presses left over from the previous one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::GameConfig;
use crate::event::PadEvent;
use crate::hardware::{ButtonPad, HardwareError, PadCallbacks, Speaker};
use crate::matching::{MatchEngine, StepOutcome};
use crate::pairing::Pairing;
use crate::queue::{event_queue, EventReceiver, EventSender};

/// Errors from driving a game's lifecycle.
#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Hardware(#[from] HardwareError),
    #[error("game thread panicked")]
    WorkerPanicked,
    #[error("hardware unavailable after a game thread panic")]
    HardwareLost,
}

/// A running session: the game thread plus its liveness flags.
struct Session<P: ButtonPad, S: Speaker> {
    thread: JoinHandle<(MatchEngine<P, S>, Result<(), HardwareError>)>,
    /// Cleared to ask the thread to exit.
    running: Arc<AtomicBool>,
    /// Set by the thread on its way out, however it ends.
    finished: Arc<AtomicBool>,
}

/// Owner of the hardware and of at most one session at a time.
pub struct Game<P: ButtonPad + Send + 'static, S: Speaker + Send + 'static> {
    config: GameConfig,
    rng: ChaCha8Rng,
    /// Present between sessions; `None` while a session holds it.
    hardware: Option<(P, S)>,
    session: Option<Session<P, S>>,
}

impl<P: ButtonPad + Send + 'static, S: Speaker + Send + 'static> Game<P, S> {
    /// Take ownership of the hardware. A configured seed makes every
    /// pairing sequence reproducible; without one the RNG is seeded
    /// from entropy.
    pub fn new(pad: P, speaker: S, config: GameConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            config,
            rng,
            hardware: Some((pad, speaker)),
            session: None,
        }
    }

    /// Start a session: draw a fresh pairing and hand the hardware to a
    /// new game thread. Any previous session is stopped and joined
    /// first, and its error (if it had one) surfaces here.
    pub fn start(&mut self) -> Result<(), GameError> {
        self.stop();
        self.reclaim()?;

        let (mut pad, speaker) = self.hardware.take().ok_or(GameError::HardwareLost)?;
        let pairing = Pairing::generate(&mut self.rng);
        let (sender, receiver) = event_queue();
        pad.assign_button_events(pad_callbacks(&sender));

        let running = Arc::new(AtomicBool::new(true));
        let finished = Arc::new(AtomicBool::new(false));
        let engine = MatchEngine::new(pad, speaker, pairing, &self.config);
        let poll = self.config.poll_interval().max(Duration::from_millis(1));

        info!("starting a new game session");
        let thread = thread::spawn({
            let running = Arc::clone(&running);
            let finished = Arc::clone(&finished);
            move || {
                let mut engine = engine;
                let result = run_session(&mut engine, &receiver, &running, poll);
                running.store(false, Ordering::Release);
                finished.store(true, Ordering::Release);
                (engine, result)
            }
        });

        self.session = Some(Session {
            thread,
            running,
            finished,
        });
        Ok(())
    }

    /// Tear down any current session and start a new round.
    pub fn restart(&mut self) -> Result<(), GameError> {
        self.start()
    }

    /// Ask the game thread to exit. Returns immediately; the thread is
    /// joined by the next [`start`](Self::start) or by
    /// [`shutdown`](Self::shutdown).
    pub fn stop(&mut self) {
        if let Some(session) = &self.session {
            session.running.store(false, Ordering::Release);
        }
    }

    /// Join the session (if any) and take the hardware back.
    fn reclaim(&mut self) -> Result<(), GameError> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };
        match session.thread.join() {
            Ok((engine, result)) => {
                self.hardware = Some(engine.into_hardware());
                Ok(result?)
            }
            // The engine (and the hardware inside it) died with the thread.
            Err(_) => Err(GameError::WorkerPanicked),
        }
    }

    /// Block until the round is won or the exit channel fires (or its
    /// sender drops), then stop and join the session. The hardware is
    /// kept afterwards, so another round can follow.
    pub fn run_until_exit(&mut self, exit: &Receiver<()>) -> Result<(), GameError> {
        let poll = self.config.poll_interval().max(Duration::from_millis(1));
        loop {
            match exit.recv_timeout(poll) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {
                    if self.is_finished() {
                        break;
                    }
                }
            }
        }
        self.stop();
        self.reclaim()
    }

    /// Stop, join, and power the board down. A session error takes
    /// precedence over a cleanup error, which is then only logged.
    pub fn shutdown(mut self) -> Result<(), GameError> {
        self.stop();
        let session_result = self.reclaim();
        let cleanup_result = match &mut self.hardware {
            Some((pad, _)) => pad.cleanup().map_err(GameError::from),
            None => Ok(()),
        };
        match (session_result, cleanup_result) {
            (Err(session_err), Err(cleanup_err)) => {
                warn!(error = %cleanup_err, "pad cleanup also failed during shutdown");
                Err(session_err)
            }
            (Err(session_err), Ok(())) => Err(session_err),
            (Ok(()), cleanup) => cleanup,
        }
    }

    /// Whether a session's thread is still alive.
    pub fn is_running(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| !s.finished.load(Ordering::Acquire))
    }

    /// Whether a session ran to its end (won, stopped, or errored) and
    /// is waiting to be joined.
    pub fn is_finished(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.finished.load(Ordering::Acquire))
    }
}

/// Callbacks that forward presses and holds into the event queue.
/// Releases carry no game meaning and are dropped at the boundary.
fn pad_callbacks(sender: &EventSender) -> PadCallbacks {
    let press = sender.clone();
    let held = sender.clone();
    PadCallbacks {
        on_press: Box::new(move |slot| press.push(PadEvent::Pressed(slot))),
        on_held: Box::new(move |slot| held.push(PadEvent::Held(slot))),
        on_released: Box::new(|_| {}),
    }
}

/// The game thread body: announce the round, then drain the queue until
/// the round is won or the owner asks for a stop.
fn run_session<P: ButtonPad, S: Speaker>(
    engine: &mut MatchEngine<P, S>,
    events: &EventReceiver,
    running: &AtomicBool,
    poll: Duration,
) -> Result<(), HardwareError> {
    engine.begin()?;
    while running.load(Ordering::Acquire) {
        let Some(event) = events.try_pop() else {
            thread::sleep(poll);
            continue;
        };
        match event {
            PadEvent::Pressed(slot) => {
                if engine.handle_press(slot)? == StepOutcome::Completed {
                    break;
                }
            }
            PadEvent::Held(slot) => engine.handle_hold(slot)?,
        }
    }
    Ok(())
}
