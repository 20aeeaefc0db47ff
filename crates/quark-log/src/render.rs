//! Message rendering.
//!
//! Turns a composed emission into a [`Line`]: one template made of text
//! pieces and style markers, the style arguments those markers consume in
//! order, and the non-textual items left for the sink to format.
//!
//! The template keeps markers as explicit [`Piece::Marker`] entries and only
//! flattens them to the positional `%c` token at the sink boundary
//! ([`Line::template`]). Sinks that want styled runs instead of a template
//! use [`Line::segments`], which pairs every text run with the style argument
//! its preceding marker consumed.

use serde::Serialize;
use serde_json::Value;

use crate::compose::Composition;
use crate::plugin::LevelInfo;
use crate::style::{RESET, merge_styles, serialize_style_list, serialize_styles};

/// Positional token a styling sink substitutes with the next style argument.
pub const STYLE_TOKEN: &str = "%c";

/// One element of a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Piece {
    Text(String),
    /// Applies the next style argument to the text that follows.
    Marker,
}

/// Ordered text pieces and style markers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Template {
    pieces: Vec<Piece>,
}

impl Template {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A template holding plain text.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        let mut template = Self::new();
        template.push_text(text);
        template
    }

    /// `text` enclosed in a marker pair.
    #[must_use]
    pub fn wrapped(text: impl Into<String>) -> Self {
        let mut template = Self::new();
        template.push_marker();
        template.push_text(text);
        template.push_marker();
        template
    }

    /// Appends text, coalescing with a preceding text piece.
    pub fn push_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        if let Some(Piece::Text(last)) = self.pieces.last_mut() {
            last.push_str(&text);
        } else {
            self.pieces.push(Piece::Text(text));
        }
    }

    pub fn push_marker(&mut self) {
        self.pieces.push(Piece::Marker);
    }

    /// Appends every piece of `other`.
    pub fn append(&mut self, other: Template) {
        for piece in other.pieces {
            match piece {
                Piece::Text(text) => self.push_text(text),
                Piece::Marker => self.push_marker(),
            }
        }
    }

    /// Concatenates templates with a text separator between them.
    #[must_use]
    pub fn join(parts: impl IntoIterator<Item = Template>, separator: &str) -> Self {
        let mut joined = Self::new();
        for (index, part) in parts.into_iter().enumerate() {
            if index > 0 {
                joined.push_text(separator);
            }
            joined.append(part);
        }
        joined
    }

    #[must_use]
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.pieces
            .iter()
            .filter(|piece| matches!(piece, Piece::Marker))
            .count()
    }

    /// Removes every marker, keeping the text.
    #[must_use]
    pub fn without_markers(self) -> Self {
        Self::text(self.plain_text())
    }

    /// Text with markers dropped.
    #[must_use]
    pub fn plain_text(&self) -> String {
        self.pieces
            .iter()
            .filter_map(|piece| match piece {
                Piece::Text(text) => Some(text.as_str()),
                Piece::Marker => None,
            })
            .collect()
    }

    /// Text with each marker written as [`STYLE_TOKEN`].
    ///
    /// A `%` inside text is written as `%%`, so only markers produce a
    /// placeholder.
    #[must_use]
    pub fn to_positional(&self) -> String {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Text(text) => out.push_str(&text.replace('%', ESCAPED_PERCENT)),
                Piece::Marker => out.push_str(STYLE_TOKEN),
            }
        }
        out
    }
}

/// How a literal `%` appears in the positional template.
pub const ESCAPED_PERCENT: &str = "%%";

/// Counts the [`STYLE_TOKEN`] placeholders in a positional template,
/// skipping escaped `%%` sequences.
#[must_use]
pub fn count_placeholders(positional: &str) -> usize {
    let mut count = 0;
    let mut chars = positional.chars();
    while let Some(c) = chars.next() {
        if c == '%' {
            match chars.next() {
                Some('c') => count += 1,
                Some(_) | None => {}
            }
        }
    }
    count
}

/// A text run and the inline style in effect for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    /// `None` when unstyled or after a reset.
    pub style: Option<&'a str>,
}

/// A fully rendered emission, ready for a sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    level: String,
    template: Template,
    styles: Vec<String>,
    extras: Vec<Value>,
}

impl Line {
    #[must_use]
    pub fn new(
        level: impl Into<String>,
        template: Template,
        styles: Vec<String>,
        extras: Vec<Value>,
    ) -> Self {
        Self {
            level: level.into(),
            template,
            styles,
            extras,
        }
    }

    /// A line with no content.
    #[must_use]
    pub fn empty(level: impl Into<String>) -> Self {
        Self::new(level, Template::new(), Vec::new(), Vec::new())
    }

    /// Name of the level that produced this line.
    #[must_use]
    pub fn level(&self) -> &str {
        &self.level
    }

    /// The template with markers written as `%c`.
    ///
    /// Literal `%` in message text is escaped as `%%`, so the Nth `%c`
    /// always consumes the Nth style argument.
    #[must_use]
    pub fn template(&self) -> String {
        self.template.to_positional()
    }

    /// The template text without any marker.
    #[must_use]
    pub fn text(&self) -> String {
        self.template.plain_text()
    }

    #[must_use]
    pub fn pieces(&self) -> &[Piece] {
        self.template.pieces()
    }

    /// Style arguments, one per marker.
    #[must_use]
    pub fn styles(&self) -> &[String] {
        &self.styles
    }

    /// Non-textual items, in their original relative order.
    #[must_use]
    pub fn extras(&self) -> &[Value] {
        &self.extras
    }

    /// Everything after the template, as a console call would receive it.
    #[must_use]
    pub fn args(&self) -> Vec<Value> {
        self.styles
            .iter()
            .map(|style| Value::String(style.clone()))
            .chain(self.extras.iter().cloned())
            .collect()
    }

    /// Pairs each text run with the style argument of the marker before it.
    ///
    /// The Nth marker consumes the Nth style argument; an empty argument
    /// resets styling, and markers beyond the argument list reset as well.
    #[must_use]
    pub fn segments(&self) -> Vec<Segment<'_>> {
        let mut styles = self.styles.iter();
        let mut current: Option<&str> = None;
        let mut segments = Vec::new();

        for piece in self.template.pieces() {
            match piece {
                Piece::Marker => {
                    current = styles
                        .next()
                        .map(String::as_str)
                        .filter(|style| !style.is_empty());
                }
                Piece::Text(text) => segments.push(Segment {
                    text,
                    style: current,
                }),
            }
        }

        segments
    }
}

/// Renders a composed emission for a sink.
///
/// `styled` tells whether the sink renders inline styles; when it does not,
/// markers are stripped and the style arguments dropped.
#[must_use]
pub fn render(level: &LevelInfo, composition: Composition, styled: bool) -> Line {
    let Composition {
        messages,
        before,
        after,
        styles: plugin_styles,
    } = composition;
    let level_styles = level.options.styles();

    // Level styles take precedence over whatever the plugins proposed
    let plugin_styles = match level_styles {
        Some(level_styles) => merge_styles(level_styles, &plugin_styles),
        None => plugin_styles,
    };

    let mut style_args = serialize_style_list(&plugin_styles);
    if let Some(level_styles) = level_styles {
        style_args.push(serialize_styles(level_styles));
        style_args.push(RESET.to_string());
    }

    let (texts, extras): (Vec<Value>, Vec<Value>) =
        messages.into_iter().partition(Value::is_string);
    let texts: Vec<String> = texts
        .into_iter()
        .filter_map(|value| match value {
            Value::String(text) => Some(text),
            _ => None,
        })
        .collect();

    let mut body = Template::text(texts.join(" "));
    if level_styles.is_some() {
        let mut scoped = Template::new();
        scoped.push_marker();
        scoped.append(body);
        scoped.push_marker();
        body = scoped;
    }

    let mut parts = Vec::with_capacity(3);
    if !before.is_empty() {
        parts.push(Template::join(before, " "));
    }
    parts.push(body);
    if !after.is_empty() {
        parts.push(Template::text(after.join(" ")));
    }
    let template = Template::join(parts, " ");

    if styled {
        Line::new(level.name.clone(), template, style_args, extras)
    } else {
        Line::new(level.name.clone(), template.without_markers(), Vec::new(), extras)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::LevelOptions;
    use crate::style::StyleMap;
    use serde_json::json;

    fn plain_level(name: &str) -> LevelInfo {
        LevelInfo::new(name, LevelOptions::new())
    }

    fn red_level(name: &str) -> LevelInfo {
        LevelInfo::new(name, LevelOptions::styled(StyleMap::new().with("color", "red")))
    }

    fn composition(messages: Vec<Value>) -> Composition {
        Composition {
            messages,
            ..Composition::default()
        }
    }

    #[test]
    fn test_template_push_coalesces_text() {
        let mut template = Template::text("a");
        template.push_text("b");
        template.push_marker();
        template.push_text("c");
        assert_eq!(template.pieces().len(), 3);
        assert_eq!(template.to_positional(), "ab%cc");
        assert_eq!(template.plain_text(), "abc");
        assert_eq!(template.marker_count(), 1);
    }

    #[test]
    fn test_template_join() {
        let joined = Template::join([Template::wrapped("[a]"), Template::wrapped("[b]")], " ");
        assert_eq!(joined.to_positional(), "%c[a]%c %c[b]%c");
    }

    #[test]
    fn test_render_plain_messages() {
        let line = render(&plain_level("log"), composition(vec![json!("a"), json!("b")]), true);
        assert_eq!(line.template(), "a b");
        assert!(line.styles().is_empty());
        assert!(line.extras().is_empty());
    }

    #[test]
    fn test_render_partitions_non_textual() {
        let line = render(
            &plain_level("log"),
            composition(vec![json!("Test"), json!({ "test": true }), json!(10), json!("x")]),
            true,
        );
        assert_eq!(line.template(), "Test x");
        assert_eq!(line.extras(), &[json!({ "test": true }), json!(10)]);
    }

    #[test]
    fn test_render_level_styles_styled_sink() {
        let line = render(&red_level("log"), composition(vec![json!("Hi")]), true);
        assert_eq!(line.template(), "%cHi%c");
        assert_eq!(line.styles(), &["color: red;".to_string(), String::new()]);
        assert_eq!(line.args(), vec![json!("color: red;"), json!("")]);
    }

    #[test]
    fn test_render_escapes_percent_in_text() {
        let line = render(&red_level("log"), composition(vec![json!("50%complete")]), true);
        assert_eq!(line.template(), "%c50%%complete%c");
        assert_eq!(count_placeholders(&line.template()), line.styles().len());
        assert_eq!(line.text(), "50%complete");
    }

    #[test]
    fn test_count_placeholders() {
        assert_eq!(count_placeholders("%c[a]%c %cmsg%c"), 4);
        assert_eq!(count_placeholders("100%% %%c done"), 0);
        assert_eq!(count_placeholders("trailing %"), 0);
    }

    #[test]
    fn test_render_level_styles_plain_sink() {
        let line = render(&red_level("log"), composition(vec![json!("Hi")]), false);
        assert_eq!(line.template(), "Hi");
        assert!(line.styles().is_empty());
    }

    #[test]
    fn test_render_level_styles_without_text() {
        let line = render(&red_level("log"), composition(vec![json!(1)]), true);
        assert_eq!(line.template(), "%c%c");
        assert_eq!(line.styles().len(), 2);
        assert_eq!(line.extras(), &[json!(1)]);
    }

    #[test]
    fn test_render_before_and_after() {
        let composition = Composition {
            messages: vec![json!("msg")],
            before: vec![Template::wrapped("[A]"), Template::wrapped("[B]")],
            after: vec!["(1)".to_string(), "(2)".to_string()],
            styles: vec![
                StyleMap::new().with("color", "white"),
                StyleMap::new(),
            ],
        };

        let line = render(&plain_level("info"), composition, true);
        assert_eq!(line.template(), "%c[A]%c %c[B]%c msg (1) (2)");
        assert_eq!(
            line.styles(),
            &["color: white;".to_string(), String::new(), String::new(), String::new()]
        );
        assert_eq!(line.text(), "[A] [B] msg (1) (2)");
    }

    #[test]
    fn test_render_merges_level_over_plugin_styles() {
        let composition = Composition {
            messages: vec![json!("m")],
            before: vec![Template::wrapped("[ns]")],
            after: Vec::new(),
            styles: vec![StyleMap::new().with("color", "white").with("padding", "1px")],
        };

        let line = render(&red_level("log"), composition, true);
        assert_eq!(line.template(), "%c[ns]%c %cm%c");
        assert_eq!(
            line.styles(),
            &[
                "color: red;padding: 1px;".to_string(),
                String::new(),
                "color: red;".to_string(),
                String::new(),
            ]
        );
    }

    #[test]
    fn test_render_empty_messages_keeps_text_part() {
        let composition = Composition {
            messages: Vec::new(),
            before: vec![Template::wrapped("[t]")],
            ..Composition::default()
        };
        let line = render(&plain_level("log"), composition, false);
        assert_eq!(line.template(), "[t] ");
    }

    #[test]
    fn test_segments_pair_styles() {
        let composition = Composition {
            messages: vec![json!("Hi")],
            before: vec![Template::wrapped("[ns]")],
            after: Vec::new(),
            styles: vec![StyleMap::new().with("color", "white")],
        };
        let line = render(&red_level("log"), composition, true);
        let segments = line.segments();

        assert_eq!(
            segments,
            vec![
                Segment { text: "[ns]", style: Some("color: red;") },
                Segment { text: " ", style: None },
                Segment { text: "Hi", style: Some("color: red;") },
            ]
        );
    }

    #[test]
    fn test_segments_without_markers() {
        let line = Line::new("log", Template::text("plain"), Vec::new(), Vec::new());
        assert_eq!(line.segments(), vec![Segment { text: "plain", style: None }]);
    }

    #[test]
    fn test_line_serializes() {
        let line = render(&red_level("log"), composition(vec![json!("Hi"), json!(1)]), true);
        let value = serde_json::to_value(&line).unwrap();
        assert_eq!(value["level"], json!("log"));
        assert_eq!(value["template"], json!(["marker", { "text": "Hi" }, "marker"]));
        assert_eq!(value["extras"], json!([1]));
    }
}
