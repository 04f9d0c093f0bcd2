// UI layer: spinner while a request is in flight, coloured result lines and
// the interactive host prompt. Nothing here decides outcomes; it only shows
// what `commands` produced.

use crate::commands::{validate_host, Line, Progress, Report};
use crate::error::CliError;
use crossterm::style::{style, Color, Stylize};
use crossterm::tty::IsTty;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// indicatif spinner drawn on stderr. Hidden when stderr is not a terminal.
#[derive(Default)]
pub struct Spinner {
    bar: Option<ProgressBar>,
}

impl Progress for Spinner {
    fn start(&mut self, message: &str) {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            bar.set_style(style);
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        self.bar = Some(bar);
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

fn colour_enabled(is_tty: bool) -> bool {
    is_tty && std::env::var_os("NO_COLOR").is_none()
}

/// `text` in `colour`, or unchanged when colour is off.
fn paint(text: &str, colour: Color, enabled: bool) -> String {
    if enabled {
        style(text).with(colour).to_string()
    } else {
        text.to_string()
    }
}

/// Print a successful command result to stdout.
pub fn print_report(report: &Report) {
    print!("{}", render_report(report, colour_enabled(std::io::stdout().is_tty())));
}

fn render_report(report: &Report, colour: bool) -> String {
    let mut out = format!(
        "{} {}\n",
        paint("✔", Color::Green, colour),
        paint(&report.headline, Color::Green, colour)
    );
    for (i, line) in report.lines.iter().enumerate() {
        // Headings, labels and notes start a new block.
        let opens_block = !matches!(line, Line::Json(_) | Line::Item(..));
        if opens_block || i == 0 {
            out.push('\n');
        }
        let text = match line {
            Line::Heading(text) => paint(text, Color::Cyan, colour),
            Line::Label(text) | Line::Note(text) => paint(text, Color::Yellow, colour),
            Line::Item(n, name) => format!("{}. {}", n, paint(name, Color::Cyan, colour)),
            Line::Json(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
        };
        out.push_str(&text);
        out.push('\n');
    }
    out
}

pub fn print_error(err: &CliError) {
    let colour = colour_enabled(std::io::stderr().is_tty());
    eprintln!(
        "{} {}",
        paint("✖", Color::Red, colour),
        paint(&err.to_string(), Color::Red, colour)
    );
}

/// Ask for a host until a valid one is entered.
pub fn prompt_host(current: &str) -> Result<String, CliError> {
    let host = Input::<String>::new()
        .with_prompt("Enter the ChainDB host")
        .default(current.to_string())
        .validate_with(|input: &String| validate_host(input))
        .interact_text()?;
    Ok(host)
}
