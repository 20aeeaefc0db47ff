//! Terminal sink
//!
//! [`ConsoleSink`] writes rendered lines through `console::Term`: `log`,
//! `info` and custom levels to stdout, `warn` and `error` to stderr. On a
//! styled stream every segment's inline declarations are translated into
//! an ANSI [`Style`]; otherwise lines are written as plain text. Each stream
//! is styled or plain on its own, so redirecting stderr to a file keeps
//! escape codes out of it.

use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use console::{Color, Style, Term};

use crate::config::LoggerConfig;
use crate::detection::Stream;
use crate::logging::targets;
use crate::render::Line;
use crate::sink::Sink;

enum Target {
    Terminal { out: Term, err: Term },
    Writer(Mutex<Box<dyn Write + Send>>),
}

/// Sink writing to the terminal (or any writer, for testing)
pub struct ConsoleSink {
    target: Target,
    styled_out: bool,
    styled_err: bool,
    depth: AtomicUsize,
    timers: Mutex<HashMap<String, Instant>>,
}

impl ConsoleSink {
    /// Create with automatic detection
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(&LoggerConfig::from_env())
    }

    /// Create from a resolved configuration
    #[must_use]
    pub fn from_config(config: &LoggerConfig) -> Self {
        Self::terminal(
            config.should_style_stream(Stream::Stdout),
            config.should_style_stream(Stream::Stderr),
        )
    }

    /// Create with explicit styling on/off
    #[must_use]
    pub fn with_styles(styled: bool) -> Self {
        Self::terminal(styled, styled)
    }

    fn terminal(styled_out: bool, styled_err: bool) -> Self {
        Self::build(
            Target::Terminal {
                out: Term::stdout(),
                err: Term::stderr(),
            },
            styled_out,
            styled_err,
        )
    }

    /// Create with custom writer (for testing); both streams share it
    #[must_use]
    pub fn with_writer<W: Write + Send + 'static>(writer: W, styled: bool) -> Self {
        Self::build(Target::Writer(Mutex::new(Box::new(writer))), styled, styled)
    }

    fn build(target: Target, styled_out: bool, styled_err: bool) -> Self {
        Self {
            target,
            styled_out,
            styled_err,
            depth: AtomicUsize::new(0),
            timers: Mutex::new(HashMap::new()),
        }
    }

    // ─────────────────────────────────────────────────
    // Rendering
    // ─────────────────────────────────────────────────

    /// Render a line the way it is written to stdout, without the group indent
    #[must_use]
    pub fn format_line(&self, line: &Line) -> String {
        self.format_for(Stream::Stdout, line)
    }

    fn is_styled(&self, stream: Stream) -> bool {
        match stream {
            Stream::Stdout => self.styled_out,
            Stream::Stderr => self.styled_err,
        }
    }

    fn format_for(&self, stream: Stream, line: &Line) -> String {
        let mut out = if self.is_styled(stream) {
            line.segments()
                .into_iter()
                .map(|segment| match segment.style {
                    Some(css) => style_for(css).apply_to(segment.text).to_string(),
                    None => segment.text.to_string(),
                })
                .collect::<String>()
        } else {
            line.text()
        };

        for extra in line.extras() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&extra.to_string());
        }
        out
    }

    fn write(&self, stream: Stream, text: &str) {
        let indent = "  ".repeat(self.depth.load(Ordering::SeqCst));
        let text = if indent.is_empty() {
            text.to_string()
        } else {
            text.lines()
                .map(|l| format!("{indent}{l}"))
                .collect::<Vec<_>>()
                .join("\n")
        };

        let result = match &self.target {
            Target::Terminal { out, err } => {
                let term = match stream {
                    Stream::Stdout => out,
                    Stream::Stderr => err,
                };
                term.write_line(&text)
            }
            Target::Writer(writer) => {
                let mut writer = writer.lock().unwrap_or_else(PoisonError::into_inner);
                writeln!(writer, "{text}")
            }
        };
        if let Err(err) = result {
            log::debug!(target: targets::SINK, "console write failed: {}", err);
        }
    }

    fn write_line(&self, stream: Stream, line: &Line) {
        self.write(stream, &self.format_for(stream, line));
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConsoleSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleSink")
            .field("styled_out", &self.styled_out)
            .field("styled_err", &self.styled_err)
            .field("depth", &self.depth.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl Sink for ConsoleSink {
    fn supports_styles(&self) -> bool {
        self.styled_out || self.styled_err
    }

    fn print(&self, line: &Line) {
        self.write_line(Stream::Stdout, line);
    }

    fn warn(&self, line: &Line) {
        self.write_line(Stream::Stderr, line);
    }

    fn error(&self, line: &Line) {
        self.write_line(Stream::Stderr, line);
    }

    fn group(&self, label: &str) {
        let label = if self.styled_out {
            Style::new().force_styling(true).bold().apply_to(label).to_string()
        } else {
            label.to_string()
        };
        self.write(Stream::Stdout, &label);
        self.depth.fetch_add(1, Ordering::SeqCst);
    }

    fn group_end(&self) {
        let _ = self
            .depth
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |d| d.checked_sub(1));
    }

    fn time(&self, label: &str) {
        let mut timers = self.timers.lock().unwrap_or_else(PoisonError::into_inner);
        timers.insert(label.to_string(), Instant::now());
    }

    fn time_end(&self, label: &str) {
        let started = self
            .timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(label);

        match started {
            Some(started) => {
                let ms = started.elapsed().as_secs_f64() * 1000.0;
                self.write(Stream::Stdout, &format!("{label}: {ms:.3}ms"));
            }
            None => self.write(Stream::Stderr, &format!("Timer '{label}' does not exist")),
        }
    }
}

// ─────────────────────────────────────────────────────────
// Inline style translation
// ─────────────────────────────────────────────────────────

/// Split `prop: value;` declarations into pairs
fn declarations(css: &str) -> impl Iterator<Item = (&str, &str)> {
    css.split(';').filter_map(|decl| {
        let (property, value) = decl.split_once(':')?;
        Some((property.trim(), value.trim()))
    })
}

/// Translate inline declarations into a terminal style
///
/// Supported: `color`, `background`/`background-color`, `font-weight: bold`,
/// `font-style: italic`, `text-decoration: underline`. Anything else is
/// ignored.
#[must_use]
pub fn style_for(css: &str) -> Style {
    let mut style = Style::new().force_styling(true);

    for (property, value) in declarations(css) {
        match property {
            "color" => {
                if let Some(color) = parse_color(value) {
                    style = style.fg(color);
                }
            }
            "background" | "background-color" => {
                if let Some(color) = parse_color(value) {
                    style = style.bg(color);
                }
            }
            "font-weight" if value == "bold" || value.parse::<u16>().is_ok_and(|w| w >= 600) => {
                style = style.bold();
            }
            "font-style" if value == "italic" => style = style.italic(),
            "text-decoration" if value.contains("underline") => style = style.underlined(),
            _ => {}
        }
    }

    style
}

/// Parse a named or `#rgb`/`#rrggbb` color
#[must_use]
pub fn parse_color(value: &str) -> Option<Color> {
    let value = value.trim().to_ascii_lowercase();
    let named = match value.as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" | "purple" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "white" => Some(Color::White),
        "gray" | "grey" => Some(Color::Color256(244)),
        "orange" => Some(Color::Color256(208)),
        _ => None,
    };
    if named.is_some() {
        return named;
    }

    let hex = value.strip_prefix('#')?;
    let (r, g, b) = match hex.len() {
        6 => (
            u8::from_str_radix(hex.get(0..2)?, 16).ok()?,
            u8::from_str_radix(hex.get(2..4)?, 16).ok()?,
            u8::from_str_radix(hex.get(4..6)?, 16).ok()?,
        ),
        3 => {
            let digit = |i: usize| {
                hex.get(i..=i)
                    .and_then(|d| u8::from_str_radix(d, 16).ok())
                    .map(|d| d * 17)
            };
            (digit(0)?, digit(1)?, digit(2)?)
        }
        _ => return None,
    };
    Some(Color::Color256(rgb_to_ansi256(r, g, b)))
}

/// Nearest entry of the 6×6×6 color cube (or the gray ramp)
fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    if r == g && g == b {
        return match r {
            0..=7 => 16,
            249..=255 => 231,
            v => 232 + ((u16::from(v) - 8) * 24 / 241) as u8,
        };
    }
    let level = |c: u8| ((u16::from(c) * 5 + 127) / 255) as u8;
    16 + 36 * level(r) + 6 * level(g) + level(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Template;
    use serde_json::json;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<Vec<u8>>>);

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Shared {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn styled_line() -> Line {
        let mut template = Template::new();
        template.push_marker();
        template.push_text("Hi");
        template.push_marker();
        Line::new(
            "log",
            template,
            vec!["color: red;".to_string(), String::new()],
            vec![json!({ "a": 1 })],
        )
    }

    #[test]
    fn test_plain_output() {
        let buf = Shared::default();
        let sink = ConsoleSink::with_writer(buf.clone(), false);
        sink.log(&Line::new("log", Template::text("hello"), Vec::new(), vec![json!(10)]));
        assert_eq!(buf.contents(), "hello 10\n");
    }

    #[test]
    fn test_styled_output_has_ansi() {
        let buf = Shared::default();
        let sink = ConsoleSink::with_writer(buf.clone(), true);
        sink.log(&styled_line());

        let raw = buf.contents();
        assert!(raw.contains("\u{1b}["), "expected ANSI codes in {raw:?}");
        let stripped = String::from_utf8(strip_ansi_escapes::strip(raw.as_bytes())).unwrap();
        assert_eq!(stripped, "Hi {\"a\":1}\n");
    }

    #[test]
    fn test_streams_styled_independently() {
        let buf = Shared::default();
        let sink = ConsoleSink::build(
            Target::Writer(Mutex::new(Box::new(buf.clone()))),
            true,
            false,
        );
        assert!(sink.supports_styles());

        sink.log(&styled_line());
        let stdout = buf.contents();
        assert!(stdout.contains("\u{1b}["), "expected ANSI codes in {stdout:?}");

        buf.0.lock().unwrap().clear();
        sink.warn(&styled_line());
        sink.error(&styled_line());
        assert_eq!(buf.contents(), "Hi {\"a\":1}\nHi {\"a\":1}\n");
    }

    #[test]
    fn test_group_indents() {
        let buf = Shared::default();
        let sink = ConsoleSink::with_writer(buf.clone(), false);
        sink.group("Group");
        sink.log(&Line::new("log", Template::text("inside"), Vec::new(), Vec::new()));
        sink.group_end();
        sink.group_end();
        sink.log(&Line::new("log", Template::text("outside"), Vec::new(), Vec::new()));

        assert_eq!(buf.contents(), "Group\n  inside\noutside\n");
    }

    #[test]
    fn test_timer() {
        let buf = Shared::default();
        let sink = ConsoleSink::with_writer(buf.clone(), false);
        sink.time("t");
        sink.time_end("t");
        sink.time_end("t");

        let out = buf.contents();
        assert!(out.starts_with("t: "));
        assert!(out.contains("ms\n"));
        assert!(out.contains("Timer 't' does not exist"));
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("red"), Some(Color::Red));
        assert_eq!(parse_color("#000000"), Some(Color::Color256(16)));
        assert_eq!(parse_color("#ffffff"), Some(Color::Color256(231)));
        assert_eq!(parse_color("#f00"), Some(Color::Color256(196)));
        assert_eq!(parse_color("inherit"), None);
        assert_eq!(parse_color("#12"), None);
    }

    #[test]
    fn test_declarations() {
        let pairs: Vec<_> = declarations("color: white;background: #000000;padding: 3px 5px;").collect();
        assert_eq!(
            pairs,
            vec![("color", "white"), ("background", "#000000"), ("padding", "3px 5px")]
        );
    }

    #[test]
    fn test_style_for_applies() {
        let styled = style_for("font-weight: bold;color: red;").apply_to("x").to_string();
        assert!(styled.contains("\u{1b}["));
        let plain = String::from_utf8(strip_ansi_escapes::strip(styled.as_bytes())).unwrap();
        assert_eq!(plain, "x");
    }

    #[test]
    fn test_supports_styles() {
        assert!(ConsoleSink::with_writer(Vec::new(), true).supports_styles());
        assert!(!ConsoleSink::with_writer(Vec::new(), false).supports_styles());
    }
}
