//! Terminal rendering and prompts
//!
//! Styling is a pure function of the message and its kind, driven by a static
//! table. [`Terminal`] is the interaction front end used by the binary: it
//! prints styled messages and asks yes/no questions on stdin.

use std::io::{self, BufRead, Write};

use crossterm::style::{Attribute, Color, ContentStyle};

use crate::app::models::{FrameListing, FrameLog};
use crate::app::{Interaction, MessageKind};

/// Style applied to one kind of message
#[derive(Debug, Clone, Copy)]
pub struct StyleRule {
    pub color: Option<Color>,
    pub attributes: &'static [Attribute],
}

static STYLES: &[(MessageKind, StyleRule)] = &[
    (
        MessageKind::Info,
        StyleRule {
            color: Some(Color::Cyan),
            attributes: &[],
        },
    ),
    (
        MessageKind::Success,
        StyleRule {
            color: Some(Color::Green),
            attributes: &[Attribute::Bold],
        },
    ),
    (
        MessageKind::Warning,
        StyleRule {
            color: Some(Color::Yellow),
            attributes: &[],
        },
    ),
    (
        MessageKind::Error,
        StyleRule {
            color: Some(Color::Red),
            attributes: &[Attribute::Bold],
        },
    ),
    (
        MessageKind::Debug,
        StyleRule {
            color: None,
            attributes: &[Attribute::Dim],
        },
    ),
    (
        MessageKind::Note,
        StyleRule {
            color: Some(Color::Blue),
            attributes: &[Attribute::Bold],
        },
    ),
    (
        MessageKind::Highlight,
        StyleRule {
            color: Some(Color::Magenta),
            attributes: &[Attribute::Bold],
        },
    ),
];

/// Style rule for a message kind
pub fn style_for(kind: MessageKind) -> StyleRule {
    STYLES
        .iter()
        .find(|(candidate, _)| *candidate == kind)
        .map(|(_, rule)| *rule)
        .unwrap_or(StyleRule {
            color: None,
            attributes: &[],
        })
}

/// Render a message with the ANSI style of its kind
pub fn render(message: &str, kind: MessageKind) -> String {
    let rule = style_for(kind);
    let mut style = ContentStyle::new();
    style.foreground_color = rule.color;
    for attribute in rule.attributes {
        style.attributes.set(*attribute);
    }
    style.apply(message).to_string()
}

/// Lines describing the upload statistics of one frame
pub fn frame_log_lines(frame: &FrameLog, verbose: bool) -> Vec<(MessageKind, String)> {
    let mut lines = vec![
        (MessageKind::Success, frame.name.clone()),
        (MessageKind::Debug, format!(" └ Frame slug: {}", frame.slug)),
        (
            MessageKind::Info,
            format!(
                " {:<10} {:<7} {:<7} {:<8} {}",
                "Uploaded", "Passed", "Failed", "Waiting", "Score"
            ),
        ),
        (
            MessageKind::Note,
            format!(
                " {:<10} {:<7} {:<7} {:<8} {:.2}",
                format!("{}/{}", frame.uploaded, frame.available),
                frame.passed,
                frame.failed,
                frame.waiting,
                frame.score()
            ),
        ),
    ];

    if verbose {
        for assignment in &frame.assignments {
            let line = match assignment.passed {
                Some(true) => (MessageKind::Success, format!("· {} ✔", assignment.slug)),
                Some(false) => (MessageKind::Error, format!("· {} ✖", assignment.slug)),
                None => (MessageKind::Debug, format!("· {}", assignment.slug)),
            };
            lines.push(line);
        }
    }
    lines
}

/// Lines describing the exercises published in one frame
pub fn frame_listing_lines(frame: &FrameListing) -> Vec<(MessageKind, String)> {
    let mut lines = vec![
        (MessageKind::Success, frame.name.clone()),
        (MessageKind::Debug, format!(" └ Frame slug: {}", frame.slug)),
    ];
    if frame.exercises.is_empty() {
        lines.push((
            MessageKind::Warning,
            "There's no exercises in this frame with the given criteria".to_string(),
        ));
        return lines;
    }

    let width = frame
        .exercises
        .iter()
        .map(|exercise| exercise.slug.chars().count())
        .max()
        .unwrap_or(0)
        .max("Exercise".len());
    lines.push((
        MessageKind::Info,
        format!(" {:<width$}  {}", "Exercise", "Topic", width = width),
    ));
    for exercise in &frame.exercises {
        lines.push((
            MessageKind::Note,
            format!(" {:<width$}  {}", exercise.slug, exercise.topic, width = width),
        ));
    }
    lines
}

/// Interactive terminal front end
#[derive(Debug, Clone)]
pub struct Terminal {
    styled: bool,
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal {
    /// Styles output only when stdout is a terminal
    pub fn new() -> Self {
        Self {
            styled: atty::is(atty::Stream::Stdout),
        }
    }

    /// Print a message (errors go to stderr)
    pub fn print(&self, kind: MessageKind, message: &str) {
        let text = if self.styled {
            render(message, kind)
        } else {
            message.to_string()
        };
        match kind {
            MessageKind::Error => eprintln!("{}", text),
            _ => println!("{}", text),
        }
    }
}

impl Interaction for Terminal {
    fn notify(&self, kind: MessageKind, message: &str) {
        self.print(kind, message);
    }

    fn confirm(&self, question: &str) -> bool {
        print!("{} [y/N] ", question);
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }
}
