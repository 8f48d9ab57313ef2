//! Lifecycle Test - threaded sessions end to end.
//!
//! Drives a whole [`Game`] (worker thread, event queue, pad callbacks)
//! against the in-memory hardware, watching effects from the outside
//! the way a front-end would.

use std::thread;
use std::time::{Duration, Instant};

use matchpad::{
    Game, GameConfig, GameError, HardwareError, PadHandle, Pairing, SimPad, SimSpeaker, Slot,
    SpeakerHandle, END_OF_GAME_SOUND, START_SOUND,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const WAIT: Duration = Duration::from_secs(5);

/// Poll until the condition holds or the timeout runs out.
fn wait_for(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    cond()
}

/// Instant timings and a fixed seed, so boards are predictable.
fn test_config() -> GameConfig {
    GameConfig {
        poll_interval_ms: 1,
        mismatch_delay_ms: 0,
        sweep_step_ms: 0,
        seed: Some(7),
    }
}

/// The first board a game seeded with 7 will draw.
fn expected_first_board() -> Pairing {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    Pairing::generate(&mut rng)
}

fn rig() -> (Game<SimPad, SimSpeaker>, PadHandle, SpeakerHandle) {
    let pad = SimPad::new();
    let speaker = SimSpeaker::new();
    let (pad_handle, speaker_handle) = (pad.handle(), speaker.handle());
    let game = Game::new(pad, speaker, test_config());
    (game, pad_handle, speaker_handle)
}

fn slot(n: u8) -> Slot {
    Slot::new(n).unwrap()
}

#[test]
fn test_start_announces_and_shutdown_cleans() {
    let (mut game, pad, speaker) = rig();

    game.start().unwrap();
    assert!(wait_for(WAIT, || speaker.count() >= 1));
    assert_eq!(speaker.played()[0], START_SOUND);
    assert!(game.is_running());

    game.shutdown().unwrap();
    assert!(pad.cleaned());
}

#[test]
fn test_presses_flow_in_order_uncoalesced() {
    let (mut game, pad, speaker) = rig();
    game.start().unwrap();
    assert!(wait_for(WAIT, || speaker.count() >= 1));

    // Three presses on one slot are three queue entries, not one: each
    // reveals, so each writes the same LED value again.
    for _ in 0..3 {
        pad.press(slot(5));
    }
    assert!(wait_for(WAIT, || speaker.count() >= 4));

    let writes = pad.led_writes();
    assert_eq!(writes.len(), 3);
    assert!(writes.iter().all(|w| *w == writes[0]));

    game.shutdown().unwrap();
}

#[test]
fn test_round_completes_when_the_solution_is_pressed() {
    let (mut game, pad, speaker) = rig();
    game.start().unwrap();

    // Presses land in the queue even while the start cue still plays.
    let board = expected_first_board();
    for pair in board.pairs() {
        pad.press(pair.low);
        pad.press(pair.high);
    }

    assert!(wait_for(WAIT, || game.is_finished()));
    game.shutdown().unwrap();

    assert_eq!(
        speaker.played().last().map(String::as_str),
        Some(END_OF_GAME_SOUND)
    );
    assert!(pad.cleaned());
}

#[test]
fn test_restart_draws_the_next_board() {
    let (mut game, pad, speaker) = rig();
    game.start().unwrap();
    assert!(wait_for(WAIT, || speaker.count() >= 1));

    game.restart().unwrap();
    assert!(wait_for(WAIT, || {
        speaker.played().iter().filter(|s| *s == START_SOUND).count() >= 2
    }));

    // The second session owns the second draw from the seeded stream.
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let _first = Pairing::generate(&mut rng);
    let second = Pairing::generate(&mut rng);
    for pair in second.pairs() {
        pad.press(pair.low);
        pad.press(pair.high);
    }

    assert!(wait_for(WAIT, || game.is_finished()));
    game.shutdown().unwrap();
    assert_eq!(
        speaker.played().last().map(String::as_str),
        Some(END_OF_GAME_SOUND)
    );
}

#[test]
fn test_run_until_exit_returns_on_signal() {
    let (mut game, _, _) = rig();
    game.start().unwrap();

    let (tx, rx) = crossbeam_channel::bounded(1);
    tx.send(()).unwrap();
    game.run_until_exit(&rx).unwrap();

    assert!(!game.is_running());
    game.shutdown().unwrap();
}

#[test]
fn test_run_until_exit_returns_when_round_is_won() {
    let (mut game, pad, _) = rig();
    game.start().unwrap();

    let solver = thread::spawn({
        let pad = pad.clone();
        move || {
            let board = expected_first_board();
            for pair in board.pairs() {
                pad.press(pair.low);
                pad.press(pair.high);
            }
        }
    });

    // The exit sender stays alive and silent; only the win can end this.
    let (_tx, rx) = crossbeam_channel::bounded::<()>(1);
    game.run_until_exit(&rx).unwrap();

    solver.join().unwrap();
    game.shutdown().unwrap();
}

#[test]
fn test_stale_events_do_not_leak_into_a_new_session() {
    let (mut game, pad, speaker) = rig();
    game.start().unwrap();
    assert!(wait_for(WAIT, || speaker.count() >= 1));

    game.stop();
    assert!(wait_for(WAIT, || game.is_finished()));
    speaker.clear();

    // This press lands in the dead session's queue and goes nowhere.
    pad.press(slot(3));

    game.restart().unwrap();
    assert!(wait_for(WAIT, || speaker.count() >= 1));
    assert_eq!(speaker.played(), vec![START_SOUND]);

    game.shutdown().unwrap();
}

#[test]
fn test_press_after_shutdown_is_harmless() {
    let (mut game, pad, _) = rig();
    game.start().unwrap();
    game.shutdown().unwrap();

    pad.press(slot(1));
    assert!(pad.cleaned());
}

#[test]
fn test_speaker_failure_surfaces_at_shutdown() {
    let pad = SimPad::new();
    let pad_handle = pad.handle();
    let mut game = Game::new(pad, SimSpeaker::empty(), test_config());

    // The session dies on its opening cue.
    game.start().unwrap();
    assert!(wait_for(WAIT, || game.is_finished()));

    let err = game.shutdown().unwrap_err();
    assert!(matches!(
        err,
        GameError::Hardware(HardwareError::UnknownSound(_))
    ));
    assert!(pad_handle.cleaned());
}

#[test]
fn test_session_error_surfaces_on_restart() {
    let pad = SimPad::new();
    let pad_handle = pad.handle();
    let mut game = Game::new(pad, SimSpeaker::empty(), test_config());

    game.start().unwrap();
    assert!(wait_for(WAIT, || game.is_finished()));

    let err = game.restart().unwrap_err();
    assert!(matches!(err, GameError::Hardware(_)));

    // The hardware was reclaimed before the error surfaced, so the
    // lifecycle is not wedged.
    game.shutdown().unwrap();
    assert!(pad_handle.cleaned());
}

#[test]
fn test_stop_parks_the_session() {
    let (mut game, _, speaker) = rig();
    game.start().unwrap();
    assert!(wait_for(WAIT, || speaker.count() >= 1));

    game.stop();
    assert!(wait_for(WAIT, || game.is_finished()));
    assert!(!game.is_running());

    game.shutdown().unwrap();
}
