//! matrix-othello: host simulator for the dot-matrix Othello console.
//!
//! ## Usage
//!
//! - `matrix-othello` - Run one AI-vs-AI exhibition game
//! - `matrix-othello demo --games 5` - Run several exhibition games
//! - `matrix-othello play` - Play at the terminal

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};

use matrix_othello::board::Color;
use matrix_othello::constants::{AI_DEPTH, MAX_SEARCH_DEPTH, PULSE_DIFF_PER_CLICK};
use matrix_othello::eval::stone_differential;
use matrix_othello::game::{Game, GameConfig, Options, State, Timing};
use matrix_othello::host::{self, HostGame, HostSound, Timer, cursor_lit, render_screen};
use matrix_othello::shared::SharedState;

/// matrix-othello: Othello on an 8x8 two-color LED matrix
#[derive(Parser)]
#[command(name = "matrix-othello")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// AI search depth in plies
    #[arg(long, global = true, default_value_t = AI_DEPTH as u8,
          value_parser = clap::value_parser!(u8).range(1..=MAX_SEARCH_DEPTH as i64))]
    depth: u8,

    /// Skip all animation and result pauses
    #[arg(long, global = true)]
    fast: bool,

    /// Trace decisions and tones to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Seed the entropy source for reproducible games
    #[arg(long, global = true)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch the AI play itself
    Demo {
        /// Number of games to run
        #[arg(long, default_value_t = 1)]
        games: u32,
    },
    /// Play at the terminal: a/d rotate, x flips the axis switch, empty line
    /// confirms, s toggles sound, reset holds the reset button, q quits
    Play,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = GameConfig {
        ai_depth: usize::from(cli.depth),
        timing: if cli.fast {
            Timing::instant()
        } else {
            Timing::default()
        },
        verbose: cli.verbose,
    };

    match cli.command {
        Some(Commands::Play) => run_play(config, cli.seed),
        Some(Commands::Demo { games }) => run_demo(config, cli.seed, games),
        None => run_demo(config, cli.seed, 1),
    }
}

fn new_game(config: GameConfig, seed: Option<u64>) -> (Arc<SharedState>, HostGame) {
    let shared = Arc::new(SharedState::new());
    let devices = host::devices(&shared, config.verbose, seed);
    let game = Game::new(Arc::clone(&shared), devices, config);
    (shared, game)
}

fn run_demo(config: GameConfig, seed: Option<u64>, games: u32) -> Result<()> {
    let echo = config.verbose;
    let (shared, game) = new_game(config, seed);
    let mut game = game.with_options(Options::EXHIBITION);
    let _timer = Timer::start(
        Arc::clone(&shared),
        Arc::new(AtomicBool::new(false)),
        HostSound { echo },
    );

    let mut out = io::stdout();
    let (mut red_wins, mut green_wins, mut draws) = (0, 0, 0);
    let mut reported = 0;
    while reported < games {
        game.step();
        if let State::Fault(fault) = game.state() {
            return Err(anyhow!("state machine fault: {fault}"));
        }
        if game.completed_games() == reported {
            continue;
        }
        reported = game.completed_games();

        let red = game.player(Color::Red).result;
        let green = game.player(Color::Green).result;
        match matrix_othello::game::winner(red, green) {
            Some(Color::Red) => red_wins += 1,
            Some(_) => green_wins += 1,
            None => draws += 1,
        }
        writeln!(
            out,
            "=== game {reported} ===\n{}red {red} - green {green} (margin {})\n",
            game.board(),
            stone_differential(game.board(), Color::Red).abs()
        )
        .context("writing to stdout")?;
    }
    writeln!(out, "red wins {red_wins}, green wins {green_wins}, draws {draws}")
        .context("writing to stdout")?;
    Ok(())
}

fn run_play(config: GameConfig, seed: Option<u64>) -> Result<()> {
    let echo = config.verbose;
    let (shared, mut game) = new_game(config, seed);
    let reset_button = Arc::new(AtomicBool::new(false));
    let quit = Arc::new(AtomicBool::new(false));
    let _timer = Timer::start(
        Arc::clone(&shared),
        Arc::clone(&reset_button),
        HostSound { echo },
    );

    let console = {
        let shared = Arc::clone(&shared);
        let axis = game.devices().input.axis_switch();
        let reset_button = Arc::clone(&reset_button);
        let quit = Arc::clone(&quit);
        thread::spawn(move || -> Result<()> {
            let result = read_console(&shared, &axis, &reset_button);
            quit.store(true, Ordering::Relaxed);
            result
        })
    };

    let mut out = io::stdout();
    let mut last_seen = None;
    while !quit.load(Ordering::Relaxed) {
        game.step();
        let dev = game.devices();
        let ticks = shared.ticks_2ms();
        let seen = (
            dev.matrix.generation(),
            dev.text.generation(),
            shared.cursor(),
            cursor_lit(ticks),
        );
        if last_seen != Some(seen) {
            last_seen = Some(seen);
            let screen = render_screen(dev.matrix.shown(), shared.cursor(), ticks, &dev.text);
            write!(out, "\n{screen}")
                .and_then(|_| out.flush())
                .context("writing to stdout")?;
        }
        thread::sleep(Duration::from_millis(1));
    }

    console
        .join()
        .map_err(|_| anyhow!("console thread panicked"))?
}

/// Translate console lines into button edges and encoder pulses.
fn read_console(shared: &SharedState, axis: &AtomicBool, reset_button: &AtomicBool) -> Result<()> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("reading stdin")?;
        match line.trim() {
            "" => {
                if !shared.on_select_edge() {
                    eprintln!("(too fast, ignored)");
                }
            }
            "q" | "quit" => return Ok(()),
            "reset" => reset_button.store(true, Ordering::Relaxed),
            "s" => {
                shared.on_sound_edge();
                let state = if shared.sound_enabled() { "on" } else { "off" };
                eprintln!("sound {state}");
            }
            "x" => {
                axis.fetch_xor(true, Ordering::Relaxed);
            }
            clicks => {
                for ch in clicks.chars() {
                    match ch {
                        'a' => shared.on_rotary_pulses(PULSE_DIFF_PER_CLICK),
                        'd' => shared.on_rotary_pulses(-PULSE_DIFF_PER_CLICK),
                        _ => {
                            eprintln!("unknown input '{ch}'");
                            break;
                        }
                    }
                    // Give the main loop a chance to take each click.
                    thread::sleep(Duration::from_millis(30));
                }
            }
        }
    }
    Ok(())
}
