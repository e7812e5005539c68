//! Page markup to terminal text.
//!
//! Pages use a small subset of markdown:
//!
//! ```text
//! # tar
//!
//! > Archiving utility.
//!
//! - Create an archive from files:
//!
//! `tar cf {{target.tar}} {{file1}} {{file2}}`
//! ```
//!
//! Rendering is a single pass over the lines. The only state is whether the
//! next non-blank line is the command sample of an example.

use std::io::{BufRead, Write};

use crossterm::style::{Attribute, Color, SetAttribute, SetForegroundColor};
use tracing::debug;

use crate::error::Result;

/// Indentation of example samples.
const SAMPLE_INDENT: &str = "    ";

/// Opens a placeholder inside a sample.
const VARIABLE_OPEN: &str = "{{";

/// Closes a placeholder inside a sample.
const VARIABLE_CLOSE: &str = "}}";

/// Escape sequences used while rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    /// Example descriptions.
    pub highlight: String,
    /// Example command samples.
    pub sample: String,
    /// Placeholders inside samples.
    pub variable: String,
    /// Restores the default style.
    pub reset: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self::colored()
    }
}

impl Palette {
    /// Bold green descriptions, red samples, blue placeholders.
    #[must_use]
    pub fn colored() -> Self {
        let bold = SetAttribute(Attribute::Bold);
        Self {
            highlight: format!("{}{}", bold, SetForegroundColor(Color::Green)),
            sample: format!("{}{}", bold, SetForegroundColor(Color::Red)),
            variable: format!("{}{}", bold, SetForegroundColor(Color::Blue)),
            reset: SetAttribute(Attribute::Reset).to_string(),
        }
    }

    /// No escape sequences at all.
    #[must_use]
    pub fn plain() -> Self {
        Self {
            highlight: String::new(),
            sample: String::new(),
            variable: String::new(),
            reset: String::new(),
        }
    }
}

/// Renderer state between two lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderState {
    /// Lines are classified by their leading marker.
    #[default]
    Normal,
    /// An example description was seen; its sample comes next.
    AwaitingExample,
}

/// Streams page markup into styled terminal lines.
#[derive(Debug, Clone, Default)]
pub struct MarkdownRenderer {
    palette: Palette,
}

impl MarkdownRenderer {
    /// Creates a renderer with the given palette.
    #[must_use]
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    /// Returns the palette.
    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Renders all of `input` into a string.
    pub fn render<R: BufRead>(&self, input: R) -> Result<String> {
        let mut out = Vec::new();
        self.write(input, &mut out)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    /// Renders `input` line by line into `dest`.
    ///
    /// A page that ends while an example sample is still expected simply
    /// finishes; the description line has already been written.
    pub fn write<R: BufRead, W: Write>(&self, input: R, dest: &mut W) -> Result<()> {
        let mut state = RenderState::Normal;
        let mut rendered = String::new();

        for line in input.lines() {
            let line = line?;
            rendered.clear();
            state = self.render_line(state, &line, &mut rendered);
            dest.write_all(rendered.as_bytes())?;
        }

        if state == RenderState::AwaitingExample {
            debug!("Page ended before the example sample");
        }
        dest.flush()?;
        Ok(())
    }

    /// Renders one line and returns the next state.
    pub fn render_line(&self, state: RenderState, line: &str, out: &mut String) -> RenderState {
        let palette = &self.palette;

        if state == RenderState::AwaitingExample {
            if line.trim().is_empty() {
                return RenderState::AwaitingExample;
            }
            let sample = line
                .replace(VARIABLE_OPEN, &palette.variable)
                .replace(VARIABLE_CLOSE, &palette.sample);
            push_line(
                out,
                &[
                    SAMPLE_INDENT,
                    &palette.sample,
                    sample.trim_matches('`'),
                    &palette.reset,
                ],
            );
            return RenderState::Normal;
        }

        if let Some(heading) = strip_marker(line, '#') {
            push_line(out, &[heading]);
            out.push('\n');
            RenderState::Normal
        } else if let Some(quote) = strip_marker(line, '>') {
            push_line(out, &[quote]);
            RenderState::Normal
        } else if line.starts_with('-') {
            push_line(out, &[&palette.highlight, line, &palette.reset]);
            RenderState::AwaitingExample
        } else {
            push_line(out, &[line]);
            RenderState::Normal
        }
    }
}

/// Appends `parts` followed by a newline.
fn push_line(out: &mut String, parts: &[&str]) {
    for part in parts {
        out.push_str(part);
    }
    out.push('\n');
}

/// Strips a leading marker and the single space after it.
fn strip_marker(line: &str, marker: char) -> Option<&str> {
    let rest = line.strip_prefix(marker)?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}
