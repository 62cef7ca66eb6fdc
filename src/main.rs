// Copyright (c) 2026 rezky_nightky

mod cell;
mod charset;
mod column;
mod config;
mod frame;
mod rain;
mod rainbow;
mod terminal;

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::config::{
    after_help_for_help, color_enabled_stdout, default_params_usage_for_help, require_f64_range,
    require_u8_range, Args,
};
use crate::frame::Frame;
use crate::rain::Rain;
use crate::terminal::{
    clamp_dimensions, query_dimensions, restore_terminal_best_effort, Terminal,
};

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

fn interrupted() -> bool {
    INTERRUPTED.load(Ordering::Relaxed)
}

fn is_quit_key(k: &KeyEvent) -> bool {
    if k.kind != KeyEventKind::Press {
        return false;
    }
    match k.code {
        KeyCode::Esc | KeyCode::Char('q') => true,
        // Raw mode turns Ctrl+C into a key event rather than SIGINT.
        KeyCode::Char('c') => k.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

fn note_event(ev: Event, pending_resize: &mut Option<(u16, u16)>) -> bool {
    match ev {
        Event::Resize(w, h) => {
            *pending_resize = Some((w, h));
            false
        }
        Event::Key(k) => is_quit_key(&k),
        _ => false,
    }
}

fn main() -> std::io::Result<()> {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if signals.forever().next().is_some() {
                    INTERRUPTED.store(true, Ordering::Relaxed);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            INTERRUPTED.store(true, Ordering::Relaxed);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }

    let mut cmd = Args::command();
    cmd = cmd.styles(clap_styles());
    cmd = cmd.before_help(default_params_usage_for_help());
    cmd = cmd.after_help(after_help_for_help());
    let help_template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    cmd = cmd.help_template(help_template);
    cmd.build();

    let matches = cmd.get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let speed = require_u8_range("--speed", args.speed, 1, 10);
    let density = require_u8_range("--density", args.density, 1, 100);
    let duration_s = args.duration.map(|s| {
        if !s.is_finite() {
            eprintln!("failed to apply --duration {} (must be a finite number)", s);
            std::process::exit(1);
        }
        if s > 0.0 {
            return require_f64_range("--duration", s, 0.1, 86400.0);
        }
        s
    });

    let delay = config::frame_delay(speed);

    let (w, h) = query_dimensions();
    let (w, h) = clamp_dimensions(w, h);

    let mut rain = Rain::new(density);
    rain.reset(w, h);

    let mut term = Terminal::new()?;
    let mut frame = Frame::new(w, h);

    let start_time = Instant::now();
    let end_time = duration_s.and_then(|s| {
        if s <= 0.0 {
            return None;
        }
        Some(start_time + Duration::from_secs_f64(s))
    });

    let mut pending_resize: Option<(u16, u16)> = None;

    'rain: loop {
        if interrupted() {
            break;
        }
        if end_time.is_some_and(|end| Instant::now() >= end) {
            break;
        }

        while Terminal::poll_event(Duration::from_millis(0))? {
            if note_event(Terminal::read_event()?, &mut pending_resize) {
                break 'rain;
            }
        }

        if let Some((nw, nh)) = pending_resize.take() {
            let (nw, nh) = clamp_dimensions(nw, nh);
            rain.reset(nw, nh);
            frame = Frame::new(nw, nh);
        }

        let tick_start = Instant::now();
        rain.tick(&mut frame);
        term.draw(&mut frame)?;

        // Sleep only what is left of the period; a slow frame starts the
        // next tick immediately. Events cut the wait short and are acted
        // on at the top of the next tick.
        let mut deadline = tick_start + delay;
        if let Some(end) = end_time {
            deadline = deadline.min(end);
        }
        loop {
            if interrupted() {
                break 'rain;
            }
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            if Terminal::poll_event(deadline - now)? {
                if note_event(Terminal::read_event()?, &mut pending_resize) {
                    break 'rain;
                }
            }
        }
    }

    drop(term);
    Ok(())
}
