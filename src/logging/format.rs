//! Record formatting and the markup transforms applied at render time.
use super::record::Severity;
use chrono::{DateTime, Local};
use std::borrow::Cow;

/// Width of the timestamp prefix, `%Y-%m-%d %H:%M:%S`.
pub const TIMESTAMP_LEN: usize = 19;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Where in the code an event came from.
#[derive(Debug, Clone, Copy)]
pub struct Location<'a> {
    pub module: &'a str,
    pub line: Option<u32>,
}

/// Builds the markup payload stored in a `LogRecord`.
///
/// The layout is `<span class="LEVEL"><pre>TIMESTAMP NAME: MESSAGE [MODULE:LINE]</pre></span>`
/// with everything inside `<pre>` HTML-escaped.
#[derive(Debug, Clone)]
pub struct RecordFormatter {
    with_location: bool,
}

impl Default for RecordFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordFormatter {
    pub fn new() -> Self {
        Self {
            with_location: true,
        }
    }

    /// A formatter that omits the trailing `[module:line]` part.
    pub fn without_location() -> Self {
        Self {
            with_location: false,
        }
    }

    pub fn format(
        &self,
        timestamp: &DateTime<Local>,
        source_name: &str,
        severity: Severity,
        message: &str,
        location: Option<Location<'_>>,
    ) -> String {
        let mut line = format!(
            "{} {}: {}",
            timestamp.format(TIMESTAMP_FORMAT),
            source_name,
            message
        );

        if self.with_location {
            if let Some(location) = location {
                match location.line {
                    Some(number) => line.push_str(&format!(" [{}:{}]", location.module, number)),
                    None => line.push_str(&format!(" [{}]", location.module)),
                }
            }
        }

        format!(
            "<span class=\"{}\"><pre>{}</pre></span>",
            severity.as_str(),
            html_escape::encode_text(&line)
        )
    }
}

/// Removes the timestamp prefix (and the space after it) from a formatted
/// record. Text without a `<pre>` block is returned unchanged.
pub fn strip_timestamp(rendered: &str) -> Cow<'_, str> {
    let Some((head, body)) = rendered.split_once("<pre>") else {
        return Cow::Borrowed(rendered);
    };

    let rest = match body.char_indices().nth(TIMESTAMP_LEN + 1) {
        Some((idx, _)) => &body[idx..],
        None => "",
    };

    Cow::Owned(format!("{}<pre>{}", head, rest))
}

/// Turns markup into display text: tags dropped, `<br>` as a newline,
/// entities decoded.
pub fn to_plain(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut tag = String::new();
    let mut in_tag = false;

    for c in markup.chars() {
        match (in_tag, c) {
            (false, '<') => {
                in_tag = true;
                tag.clear();
            }
            (false, c) => out.push(c),
            (true, '>') => {
                in_tag = false;
                let name = tag.trim().trim_end_matches('/').to_ascii_lowercase();
                if name == "br" {
                    out.push('\n');
                }
            }
            (true, c) => tag.push(c),
        }
    }

    html_escape::decode_html_entities(&out).into_owned()
}

/// Reads the severity class back out of a formatted record, if present.
pub fn markup_class(markup: &str) -> Option<&str> {
    let start = markup.find("class=\"")? + "class=\"".len();
    let len = markup[start..].find('"')?;
    Some(&markup[start..start + len])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at_noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 1, 12, 0, 5).unwrap()
    }

    #[test]
    fn formats_escaped_record_with_location() {
        let text = RecordFormatter::new().format(
            &at_noon(),
            "design",
            Severity::Warning,
            "width < 0 & height > 2",
            Some(Location {
                module: "qubit",
                line: Some(42),
            }),
        );

        assert_eq!(
            text,
            "<span class=\"WARNING\"><pre>2024-03-01 12:00:05 design: width &lt; 0 &amp; height &gt; 2 [qubit:42]</pre></span>"
        );
    }

    #[test]
    fn strip_drops_timestamp_and_separator() {
        let text = RecordFormatter::without_location().format(
            &at_noon(),
            "gui",
            Severity::Info,
            "ready",
            None,
        );

        assert_eq!(
            strip_timestamp(&text),
            "<span class=\"INFO\"><pre>gui: ready</pre></span>"
        );
    }

    #[test]
    fn strip_leaves_unstamped_text_alone() {
        let text = "<b>Tip:</b> right click the log";
        assert_eq!(strip_timestamp(text), text);
    }

    #[test]
    fn strip_handles_short_body() {
        assert_eq!(strip_timestamp("<pre>short</pre>"), "<pre>");
    }

    #[test]
    fn plain_text_decodes_entities_and_breaks() {
        assert_eq!(
            to_plain("<span class=\"INFO\"><pre>a &lt;b&gt;</pre></span><br/>c"),
            "a <b>\nc"
        );
    }

    #[test]
    fn reads_markup_class() {
        assert_eq!(
            markup_class("<span class=\"ERROR\"><pre>x</pre></span>"),
            Some("ERROR")
        );
        assert_eq!(markup_class("plain"), None);
    }
}
