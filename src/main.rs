mod display;

use std::io::{stdout, BufWriter, Write};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal,
    ExecutableCommand,
};
use rand::thread_rng;

use sea_strike::engine::Engine;
use sea_strike::entities::{Field, Status, World};
use sea_strike::world::{Intent, Mutation, SharedWorld};

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

// ── Modal prompts ─────────────────────────────────────────────────────────────

enum Answer {
    Yes,
    No,
}

/// Block until the user answers the on-screen Y/N question. Esc counts
/// as No; a closed input channel means the terminal is gone.
fn await_yes_no(rx: &mpsc::Receiver<Event>) -> Answer {
    loop {
        match rx.recv() {
            Ok(Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            })) => match code {
                KeyCode::Char('y') | KeyCode::Char('Y') => return Answer::Yes,
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => return Answer::No,
                _ => {}
            },
            Ok(_) => {}
            Err(_) => return Answer::No,
        }
    }
}

// ── Session loop ──────────────────────────────────────────────────────────────

fn run<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>) -> std::io::Result<()> {
    let mut rng = thread_rng();

    let world = SharedWorld::new(World::new(Field::default()));
    world.reset(&mut rng);
    let mut engine = Engine::start(world.clone())?;

    loop {
        let frame_start = Instant::now();

        // ── Drain pending input into intents ─────────────────────────────────
        while let Ok(ev) = rx.try_recv() {
            let Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                modifiers,
                ..
            }) = ev
            else {
                continue;
            };

            match code {
                KeyCode::Char('q') | KeyCode::Char('Q') => {
                    engine.stop();
                    return Ok(());
                }
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                    engine.stop();
                    return Ok(());
                }
                KeyCode::Esc => {
                    // Pause: suspend the loops, show the summary, and
                    // resume or quit on the user's answer. The world is
                    // untouched either way until the loops run again.
                    engine.pause();
                    display::render(out, &world.snapshot(), true)?;
                    match await_yes_no(rx) {
                        Answer::Yes => engine.resume(),
                        Answer::No => {
                            engine.stop();
                            return Ok(());
                        }
                    }
                }
                KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => {
                    world.apply(&[Mutation::Intent(Intent::MoveLeft)], &mut rng);
                }
                KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => {
                    world.apply(&[Mutation::Intent(Intent::MoveRight)], &mut rng);
                }
                KeyCode::Char(' ') => {
                    world.apply(&[Mutation::Intent(Intent::Shoot)], &mut rng);
                }
                KeyCode::Up => {
                    world.apply(&[Mutation::Intent(Intent::SpeedUp)], &mut rng);
                }
                KeyCode::Down => {
                    world.apply(&[Mutation::Intent(Intent::SlowDown)], &mut rng);
                }
                _ => {}
            }
        }

        // ── Render one frame; handle the terminal transition ─────────────────
        let snap = world.snapshot();
        if snap.status == Status::GameOver {
            // Join the loops before any entity is dropped, then ask.
            engine.stop();
            display::render(out, &snap, false)?;
            match await_yes_no(rx) {
                Answer::Yes => {
                    world.reset(&mut rng);
                    engine = Engine::start(world.clone())?;
                }
                Answer::No => return Ok(()),
            }
        } else {
            display::render(out, &snap, engine.is_paused())?;
        }

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> std::io::Result<()> {
    // A broken RUST_LOG filter is not worth dying for; the session just
    // runs without logging.
    let _ = env_logger::try_init();

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Dedicate a thread exclusively to blocking event reads, sending
    // them through a channel so the session loop never blocks on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(_) => break,
        }
    });

    let result = run(&mut out, &rx);

    // Always restore the terminal
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    if let Err(err) = &result {
        log::error!("session ended with error: {err}");
    }
    result
}
