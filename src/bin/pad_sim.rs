use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};
use std::{io, path::PathBuf, time::Duration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use matchpad::Color as LedColor;
use matchpad::{
    Game, GameConfig, PadHandle, SimPad, SimSpeaker, Slot, SpeakerHandle, CORRECT_SOUND,
    START_SOUND,
};

/// Terminal front-end for the matchpad engine: a simulated 4x4 pad,
/// played from the keyboard.
#[derive(Parser, Debug)]
#[command(name = "pad-sim")]
struct Args {
    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// RNG seed override, for reproducible boards
    #[arg(long)]
    seed: Option<u64>,
}

/// Key per slot, in slot order: top row is slots 1-4, bottom is 13-16.
const KEY_LABELS: [char; 16] = [
    '1', '2', '3', '4', '5', '6', '7', '8', '9', '0', 'a', 'b', 'c', 'd', 'e', 'f',
];

/// Map a key to the slot it stands for (the layout of `KEY_LABELS`).
fn key_to_slot(code: KeyCode) -> Option<Slot> {
    let KeyCode::Char(c) = code else {
        return None;
    };
    let n = match c {
        '1'..='9' => c as u8 - b'0',
        '0' => 10,
        'a'..='f' => c as u8 - b'a' + 11,
        _ => return None,
    };
    Slot::new(n)
}

/// Shifted 1 and 2 stand for holds on slots 1 and 2.
fn key_to_hold(code: KeyCode) -> Option<Slot> {
    match code {
        KeyCode::Char('!') => Slot::new(1),
        KeyCode::Char('@') => Slot::new(2),
        _ => None,
    }
}

/// Correct-answer cues since the last start cue; the score display.
fn matches_on_board(played: &[String]) -> usize {
    let start = played
        .iter()
        .rposition(|name| name == START_SOUND)
        .map(|i| i + 1)
        .unwrap_or(0);
    played[start..]
        .iter()
        .filter(|name| *name == CORRECT_SOUND)
        .count()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let pad = SimPad::new();
    let speaker = SimSpeaker::new();
    let (pad_handle, speaker_handle) = (pad.handle(), speaker.handle());
    let mut game = Game::new(pad, speaker, config);
    game.start()?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let ui_result = run_ui(&mut terminal, &mut game, &pad_handle, &speaker_handle);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    let shutdown_result = game.shutdown();
    ui_result?;
    shutdown_result?;
    Ok(())
}

fn run_ui(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    game: &mut Game<SimPad, SimSpeaker>,
    pad: &PadHandle,
    speaker: &SpeakerHandle,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        // Handle input
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') => break,
                    KeyCode::Char('r') => game.restart()?,
                    code => {
                        if let Some(slot) = key_to_hold(code) {
                            pad.hold(slot);
                        } else if let Some(slot) = key_to_slot(code) {
                            pad.press(slot);
                        }
                    }
                }
            }
        }

        let leds = pad.leds();
        let played = speaker.played();
        let finished = game.is_finished();
        terminal.draw(|f| draw(f, &leds, &played, finished))?;
    }
    Ok(())
}

fn draw(f: &mut Frame<'_>, leds: &[LedColor; 16], played: &[String], finished: bool) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3), // Header
                Constraint::Min(12),   // Pad grid
                Constraint::Length(8), // Speaker
                Constraint::Length(3), // Help
            ]
            .as_ref(),
        )
        .split(f.size());

    // 1. Header
    let title = if finished {
        "round over | press 'r' for a new board"
    } else {
        "find the eight pairs"
    };
    let header = Paragraph::new(title)
        .block(Block::default().borders(Borders::ALL).title("MATCHPAD"))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Cyan));
    f.render_widget(header, chunks[0]);

    // 2. Pad grid, 4x4 in slot order
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(25); 4].as_ref())
        .split(chunks[1]);
    for (r, row) in rows.iter().enumerate() {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(25); 4].as_ref())
            .split(*row);
        for (c, cell) in cells.iter().enumerate() {
            let i = r * 4 + c;
            let led = leds[i];
            let style = if led.is_off() {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
                    .bg(Color::Rgb(led.r, led.g, led.b))
                    .fg(Color::Black)
            };
            let label = Paragraph::new(format!("[{}]", KEY_LABELS[i]))
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL))
                .style(style);
            f.render_widget(label, *cell);
        }
    }

    // 3. Speaker log, most recent at the bottom
    let tail: Vec<&str> = played
        .iter()
        .rev()
        .take(6)
        .rev()
        .map(String::as_str)
        .collect();
    let score = format!("Speaker | {} matched", matches_on_board(played));
    let sounds = Paragraph::new(tail.join("\n"))
        .block(Block::default().borders(Borders::ALL).title(score))
        .style(Style::default().fg(Color::Yellow));
    f.render_widget(sounds, chunks[2]);

    // 4. Help
    let help = Paragraph::new(
        "1-9 0 a-f press a slot | '!' reset board | '@' replay pairs | 'r' new round | 'q' quit",
    )
    .block(Block::default().borders(Borders::ALL))
    .alignment(Alignment::Center);
    f.render_widget(help, chunks[3]);
}
