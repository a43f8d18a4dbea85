use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    style, terminal, QueueableCommand,
};
use softrast::{
    extra, Color, FrameBuffer, Mesh, RasterConfig, RenderStats, Shading, Texture,
};
use std::io::{stdout, Write};

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::{Duration, Instant};

/// Frames per statistics window.
const STATS_FRAMES: u64 = 120;

fn main() -> anyhow::Result<()> {
    // Either an OBJ file from the command line, or the built-in cube.
    let geometry = match std::env::args().nth(1) {
        Some(path) => extra::obj::parse(&std::fs::read_to_string(path)?),
        None => extra::cube(1.0),
    };

    let mut mesh = Mesh::load(&geometry)?;
    mesh.set_color(Color::new(250, 200, 120));

    let texture = Texture::checker(64, 8, Color::WHITE, Color::new(60, 60, 60))?;
    let mut config = RasterConfig::default();

    let (w, h) = render_size()?;
    let mut camera = extra::frame_bounds(mesh.bounds(), 60.0, w, h)?;
    let mut fb = FrameBuffer::new(w, h);

    let mut stats = RenderStats::default();
    let mut window = RenderStats::default();
    let mut status = String::new();

    let mut stdout = stdout();
    stdout.queue(cursor::Hide)?;

    // In case we get an outside sigterm/sigint, we want to gracefully shutdown without leaving the
    // terminal in raw mode.
    let stop = Arc::new(AtomicBool::new(false));

    signal_hook::flag::register(signal_hook::consts::SIGTERM, stop.clone())?;
    signal_hook::flag::register(signal_hook::consts::SIGINT, stop.clone())?;

    terminal::enable_raw_mode()?;

    let (tx, rx) = std::sync::mpsc::channel();
    let _ = std::thread::spawn(move || {
        while let Ok(e) = event::read() {
            if tx.send(e).is_err() {
                break;
            }
        }
    });

    let time = Instant::now();
    let mut window_start = time.elapsed();
    let mut frame = 0u64;

    while !stop.load(Ordering::SeqCst) {
        while let Ok(e) = rx.try_recv() {
            match e {
                Event::Key(KeyEvent {
                    code: KeyCode::Char('c'),
                    modifiers,
                    ..
                }) if modifiers.contains(KeyModifiers::CONTROL) => stop.store(true, Ordering::SeqCst),
                Event::Key(KeyEvent { code, .. }) => match code {
                    KeyCode::Char('q') | KeyCode::Esc => stop.store(true, Ordering::SeqCst),
                    KeyCode::Char('s') => {
                        config.shading = match config.shading {
                            Shading::Flat => Shading::Smooth,
                            Shading::Smooth => Shading::Flat,
                        }
                    }
                    KeyCode::Char('t') => config.textured = !config.textured,
                    _ => (),
                },
                Event::Resize(..) => {
                    let (w, h) = render_size()?;
                    camera.set_viewport(w, h)?;
                    fb.resize(w, h);
                }
                _ => (),
            }
        }

        let start = time.elapsed();

        mesh.set_local_rotation(20.0, start.as_secs_f32() * 40.0, 0.0);

        fb.clear();
        stats.reset();
        mesh.project(&mut camera);
        mesh.render(&mut fb.target(), Some(&texture), &config, &mut stats);
        window.merge(&stats);

        // Two pixel rows per terminal row, the top one in the foreground of an upper half block.
        for (row, y) in (0..fb.height()).step_by(2).enumerate() {
            stdout.queue(cursor::MoveTo(0, row as u16 + 1))?;
            for x in 0..fb.width() {
                let top = fb.pixel(x, y);
                let bottom = if y + 1 < fb.height() {
                    fb.pixel(x, y + 1)
                } else {
                    [0; 4]
                };
                stdout.queue(style::SetColors(style::Colors {
                    foreground: Some(term_color(top)),
                    background: Some(term_color(bottom)),
                }))?;
                stdout.queue(style::Print('\u{2580}'))?;
            }
        }

        frame += 1;
        if frame % STATS_FRAMES == 0 {
            let elapsed = (time.elapsed() - window_start).as_secs_f32();
            status = format!(
                "{:.02}FPS, per frame: {}",
                STATS_FRAMES as f32 / elapsed,
                window.per_frame(STATS_FRAMES)
            );
            window.reset();
            window_start = time.elapsed();
        }

        stdout.queue(cursor::MoveTo(0, 0))?;
        stdout.queue(style::ResetColor)?;
        stdout.queue(terminal::Clear(terminal::ClearType::CurrentLine))?;
        stdout.queue(style::Print(format!(
            "{:?} shading, texture {} (s/t to toggle, q to quit) {status}",
            config.shading,
            if config.textured { "on" } else { "off" }
        )))?;

        stdout.flush()?;

        let frametime_target = Duration::from_millis(16);
        let drawn_delta = time.elapsed() - start;
        if drawn_delta < frametime_target {
            std::thread::sleep(frametime_target - drawn_delta);
        }
    }

    terminal::disable_raw_mode()?;

    stdout.queue(style::ResetColor)?;
    stdout.queue(terminal::Clear(terminal::ClearType::All))?;
    stdout.queue(cursor::Show)?;
    stdout.flush()?;

    Ok(())
}

fn term_color([r, g, b, _]: [u8; 4]) -> style::Color {
    style::Color::Rgb { r, g, b }
}

/// Pixel dimensions of the terminal, minus the status line.
fn render_size() -> anyhow::Result<(usize, usize)> {
    let (w, h) = terminal::size()?;
    let w = (w as usize).max(1);
    let h = (h.saturating_sub(1) as usize * 2).max(1);
    Ok((w, h))
}
