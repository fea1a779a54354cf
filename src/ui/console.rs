//! A crossterm render sink drawing the log into a terminal region.
use crate::config::style::{normalize_color_name, parse_hex};
use crate::config::StyleSheet;
use crate::logging::format::{markup_class, to_plain};
use crate::logging::{RenderLine, RenderSink, Severity, SinkError};
use crossterm::{
    cursor, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use std::collections::VecDeque;
use std::io::Write;
use unicode_width::UnicodeWidthChar;

/// One display row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleLine {
    pub text: String,
    pub severity: Option<Severity>,
}

/// Keeps the rendered rows and draws the visible window of them.
///
/// `scroll_offset` counts rows hidden below the window; zero means the
/// view sits at the bottom.
pub struct ConsoleSink {
    lines: VecDeque<ConsoleLine>,
    max_lines: usize,
    scroll_offset: usize,
    style: StyleSheet,
    alive: bool,
}

impl ConsoleSink {
    pub fn new(max_lines: usize, style: StyleSheet) -> Self {
        Self {
            lines: VecDeque::new(),
            max_lines: max_lines.max(1),
            scroll_offset: 0,
            style,
            alive: true,
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &ConsoleLine> + '_ {
        self.lines.iter()
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn scroll_up(&mut self, rows: usize) {
        self.scroll_offset = (self.scroll_offset + rows).min(self.lines.len());
    }

    pub fn scroll_down(&mut self, rows: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(rows);
    }

    pub fn jump_to_bottom(&mut self) {
        self.scroll_offset = 0;
    }

    /// Marks the terminal as gone; later appends fail.
    pub fn close(&mut self) {
        self.alive = false;
    }

    /// Draws the window ending `scroll_offset` rows above the last line.
    pub fn render(
        &self,
        out: &mut impl Write,
        area: (u16, u16, u16, u16), // x, y, width, height
    ) -> std::io::Result<()> {
        let (x, y, width, height) = area;
        let visible = height as usize;
        let total = self.lines.len();

        let end = total.saturating_sub(self.scroll_offset);
        let start = end.saturating_sub(visible);

        for row in 0..height {
            queue!(out, cursor::MoveTo(x, y + row), Clear(ClearType::CurrentLine))?;
        }

        for (row, line) in self.lines.range(start..end).enumerate() {
            let style = line.severity.map(|s| self.style.for_severity(s));
            queue!(out, cursor::MoveTo(x, y + row as u16))?;
            if let Some(style) = style {
                queue!(out, SetForegroundColor(parse_color(&style.color)))?;
                if style.bold {
                    queue!(out, SetAttribute(Attribute::Bold))?;
                }
            }
            queue!(
                out,
                Print(fit_width(&line.text, width as usize)),
                SetAttribute(Attribute::Reset),
                ResetColor
            )?;
        }

        if self.scroll_offset > 0 {
            let marker = format!("\u{2191} +{} more", self.scroll_offset);
            let column = width.saturating_sub(marker.chars().count() as u16);
            queue!(
                out,
                cursor::MoveTo(x + column, y),
                SetForegroundColor(Color::Yellow),
                Print(marker),
                ResetColor
            )?;
        }

        Ok(())
    }

    fn push(&mut self, line: ConsoleLine, follow: bool) {
        if self.lines.len() >= self.max_lines {
            self.lines.pop_front();
        }
        self.lines.push_back(line);

        if follow {
            self.scroll_offset = 0;
        } else {
            // Keep the window pinned on what the user is reading.
            self.scroll_offset = (self.scroll_offset + 1).min(self.lines.len());
        }
    }
}

impl RenderSink for ConsoleSink {
    fn is_alive(&self) -> bool {
        self.alive
    }

    fn append(&mut self, line: &RenderLine<'_>, follow: bool) -> Result<(), SinkError> {
        if !self.alive {
            return Err(SinkError::Unavailable);
        }

        let severity = line
            .severity
            .or_else(|| markup_class(line.markup).and_then(|class| class.parse().ok()));

        let text = to_plain(line.markup);
        for row in text.lines().filter(|row| !row.trim().is_empty()) {
            self.push(
                ConsoleLine {
                    text: row.trim_end().to_string(),
                    severity,
                },
                follow,
            );
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), SinkError> {
        if !self.alive {
            return Err(SinkError::Unavailable);
        }
        self.lines.clear();
        self.scroll_offset = 0;
        Ok(())
    }
}

/// Maps a style color name or `#rrggbb` to a terminal color. Unknown names
/// and malformed hex fall back to the terminal default.
pub fn parse_color(name: &str) -> Color {
    if name.starts_with('#') {
        return match parse_hex(name) {
            Some((r, g, b)) => Color::Rgb { r, g, b },
            None => Color::Reset,
        };
    }

    match normalize_color_name(name).as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "dark_red" => Color::DarkRed,
        "green" => Color::Green,
        "dark_green" => Color::DarkGreen,
        "yellow" => Color::Yellow,
        "dark_yellow" | "orange" => Color::DarkYellow,
        "blue" => Color::Blue,
        "dark_blue" => Color::DarkBlue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "white" => Color::White,
        "grey" | "gray" => Color::Grey,
        "dark_grey" | "dark_gray" => Color::DarkGrey,
        _ => Color::Reset,
    }
}

/// Truncates to `width` terminal columns, ending in `...` when cut.
pub fn fit_width(text: &str, width: usize) -> String {
    let total: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= width {
        return text.to_string();
    }

    let budget = width.saturating_sub(3);
    let mut used = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(markup: &str, severity: Option<Severity>) -> RenderLine<'_> {
        RenderLine {
            source: Some("a"),
            severity,
            markup,
        }
    }

    fn texts(sink: &ConsoleSink) -> Vec<String> {
        sink.lines().map(|l| l.text.clone()).collect()
    }

    #[test]
    fn appends_plain_text_and_splits_breaks() {
        let mut sink = ConsoleSink::new(10, StyleSheet::default());
        sink.append(
            &line("<span class=\"ERROR\"><pre>a: x &amp; y</pre></span>", Some(Severity::Error)),
            true,
        )
        .unwrap();
        sink.append(
            &RenderLine {
                source: None,
                severity: None,
                markup: "<span class=\"WARNING\"><h3>Hi</h3></span><br><b>Tip: </b> z",
            },
            true,
        )
        .unwrap();

        assert_eq!(texts(&sink), vec!["a: x & y", "Hi", "Tip:  z"]);
        assert_eq!(sink.lines().nth(1).unwrap().severity, Some(Severity::Warning));
    }

    #[test]
    fn not_following_keeps_window_pinned() {
        let mut sink = ConsoleSink::new(10, StyleSheet::default());
        sink.append(&line("one", None), true).unwrap();
        sink.append(&line("two", None), false).unwrap();
        sink.append(&line("three", None), false).unwrap();
        assert_eq!(sink.scroll_offset(), 2);

        sink.scroll_down(1);
        assert_eq!(sink.scroll_offset(), 1);
        sink.append(&line("four", None), true).unwrap();
        assert_eq!(sink.scroll_offset(), 0);
    }

    #[test]
    fn keeps_at_most_max_lines() {
        let mut sink = ConsoleSink::new(2, StyleSheet::default());
        for text in ["r1", "r2", "r3"] {
            sink.append(&line(text, None), true).unwrap();
        }
        assert_eq!(texts(&sink), vec!["r2", "r3"]);
    }

    #[test]
    fn closed_sink_rejects_appends() {
        let mut sink = ConsoleSink::new(2, StyleSheet::default());
        sink.close();

        assert!(!sink.is_alive());
        assert!(matches!(
            sink.append(&line("x", None), true),
            Err(SinkError::Unavailable)
        ));
    }

    #[test]
    fn renders_window_into_writer() {
        let mut sink = ConsoleSink::new(10, StyleSheet::default());
        for text in ["first", "second", "third"] {
            sink.append(&line(text, Some(Severity::Info)), true).unwrap();
        }

        let mut out = Vec::new();
        sink.render(&mut out, (0, 0, 40, 2)).unwrap();
        let drawn = String::from_utf8_lossy(&out);

        assert!(!drawn.contains("first"));
        assert!(drawn.contains("second"));
        assert!(drawn.contains("third"));
    }

    #[test]
    fn parses_named_and_hex_colors() {
        assert_eq!(parse_color("Dark-Grey"), Color::DarkGrey);
        assert_eq!(parse_color("#ff8c00"), Color::Rgb { r: 255, g: 140, b: 0 });
        assert_eq!(parse_color("#zz"), Color::Reset);
        assert_eq!(parse_color("chartreuse"), Color::Reset);
    }

    #[test]
    fn non_ascii_hex_color_renders_with_default_color() {
        let style: StyleSheet =
            serde_json::from_str(r##"{"info": {"color": "#a\u00e9\u20ac"}}"##).unwrap();
        let mut sink = ConsoleSink::new(10, style);
        sink.append(&line("hello", Some(Severity::Info)), true).unwrap();

        let mut out = Vec::new();
        sink.render(&mut out, (0, 0, 40, 2)).unwrap();

        assert!(String::from_utf8_lossy(&out).contains("hello"));
        assert_eq!(parse_color("#a\u{e9}\u{20ac}"), Color::Reset);
    }

    #[test]
    fn fits_wide_text() {
        assert_eq!(fit_width("short", 10), "short");
        assert_eq!(fit_width("abcdefghij", 6), "abc...");
        assert_eq!(fit_width("日本語テキスト", 7), "日本...");
    }
}
