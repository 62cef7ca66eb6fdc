// Copyright (c) 2026 rezky_nightky

use std::io::IsTerminal;
use std::time::Duration;

use clap::Parser;

pub const DEFAULT_SPEED: u8 = 5;
pub const DEFAULT_DENSITY: u8 = 80;

pub const DEFAULT_PARAMS_USAGE: &str =
    "DEFAULT PARAMS USAGE:\n  prismatrix --speed 5 --density 80";

const AFTER_HELP: &str = "\
EXAMPLES:
  prismatrix                  Default settings
  prismatrix -s 8 -d 100      Fast animation, full density
  prismatrix -s 2 -d 50       Slow animation, sparse columns

CONTROLS:
  q / Esc / Ctrl+C    Stop the animation";

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

fn colorize_headings(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 64);
    for chunk in text.split_inclusive('\n') {
        let (line, nl) = chunk
            .strip_suffix('\n')
            .map(|l| (l, "\n"))
            .unwrap_or((chunk, ""));

        let is_heading =
            !line.starts_with(' ') && line.ends_with(':') && line == line.to_ascii_uppercase();

        if is_heading {
            out.push_str("\x1b[1;36m");
            out.push_str(line);
            out.push_str("\x1b[0m");
        } else {
            out.push_str(line);
        }
        out.push_str(nl);
    }
    out
}

pub fn default_params_usage_for_help() -> String {
    if color_enabled_stdout() {
        colorize_headings(DEFAULT_PARAMS_USAGE)
    } else {
        DEFAULT_PARAMS_USAGE.to_string()
    }
}

pub fn after_help_for_help() -> String {
    if color_enabled_stdout() {
        colorize_headings(AFTER_HELP)
    } else {
        AFTER_HELP.to_string()
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "prismatrix",
    version,
    about = "Rainbow digital rain for the terminal"
)]
pub struct Args {
    #[arg(
        short = 's',
        long = "speed",
        default_value_t = DEFAULT_SPEED,
        help_heading = "ANIMATION",
        help = "Animation speed (min 1 max 10): 1=slow, 10=fast"
    )]
    pub speed: u8,

    #[arg(
        short = 'd',
        long = "density",
        default_value_t = DEFAULT_DENSITY,
        help_heading = "ANIMATION",
        help = "Column density in percent of terminal width (min 1 max 100)"
    )]
    pub density: u8,

    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,
}

pub fn require_u8_range(name: &str, v: u8, min: u8, max: u8) -> u8 {
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

pub fn require_f64_range(name: &str, v: f64, min: f64, max: f64) -> f64 {
    if !v.is_finite() {
        eprintln!("failed to apply {} {} (must be a finite number)", name, v);
        std::process::exit(1);
    }
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

/// Frame period for a speed step; floors at 20ms however fast.
pub fn frame_delay(speed: u8) -> Duration {
    let ms = (160 - i32::from(speed) * 12).max(20);
    Duration::from_millis(ms as u64)
}

/// How many of the leftmost terminal cells carry a falling column.
pub fn column_count(width: u16, density: u8) -> u16 {
    let count = u32::from(width) * u32::from(density) / 100;
    (count as u16).clamp(1, width.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_delay_is_monotonically_non_increasing() {
        for speed in 1..10u8 {
            assert!(frame_delay(speed) >= frame_delay(speed + 1));
        }
    }

    #[test]
    fn frame_delay_endpoints_and_floor() {
        assert_eq!(frame_delay(1), Duration::from_millis(148));
        assert_eq!(frame_delay(10), Duration::from_millis(40));
        assert_eq!(frame_delay(12), Duration::from_millis(20));
        assert_eq!(frame_delay(u8::MAX), Duration::from_millis(20));
    }

    #[test]
    fn column_count_at_default_density() {
        assert_eq!(column_count(80, 80), 64);
    }

    #[test]
    fn column_count_stays_within_terminal_width() {
        assert_eq!(column_count(80, 100), 80);
        assert_eq!(column_count(20, 1), 1);
        for density in 1..=100u8 {
            let count = column_count(80, density);
            assert!((1..=80).contains(&count));
        }
    }

    #[test]
    fn args_defaults() {
        let args = Args::try_parse_from(["prismatrix"]).unwrap();
        assert_eq!(args.speed, DEFAULT_SPEED);
        assert_eq!(args.density, DEFAULT_DENSITY);
        assert!(args.duration.is_none());
    }

    #[test]
    fn args_reject_non_integer_values() {
        assert!(Args::try_parse_from(["prismatrix", "--speed", "fast"]).is_err());
        assert!(Args::try_parse_from(["prismatrix", "-d", "8.5"]).is_err());
    }

    #[test]
    fn args_reject_unknown_flags() {
        assert!(Args::try_parse_from(["prismatrix", "--warp"]).is_err());
    }
}
