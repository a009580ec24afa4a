//! Escaping for values embedded in an ffmpeg filter graph
//!
//! A value inside `-filter_complex` goes through up to three unescaping passes:
//!
//! 0. the filter's own parser (drawtext text expansion: `\` and `%`)
//! 1. filter option parsing (`key=value:key=value`: `\`, `'` and `:`)
//! 2. filter graph parsing (`filter,filter;chain`: `\`, `'`, `[`, `]`, `,`, `;`)
//!
//! Helpers below are named after the pass they protect against.

use regex::Regex;
use std::sync::OnceLock;

const LINE_BREAK: &str = "\\n";

/// Number of rendered lines: literal `\n` sequences plus one.
pub fn count_lines(text: &str) -> usize {
    text.matches(LINE_BREAK).count() + 1
}

/// Option-level escaping (pass 1).
pub fn escape_option_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '\'' | ':') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Wrap in single quotes for the graph parser (pass 2). Embedded quotes
/// close the quoted run, appear escaped, then reopen it.
pub fn quote_graph_value(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

/// Any free-form value embedded as a filter option, escaped for both the
/// option and graph parsers.
pub fn quote_option_value(value: &str) -> String {
    quote_graph_value(&escape_option_value(value))
}

/// A path embedded as a filter option, e.g. the `subtitles` filename.
pub fn escape_filter_path(path: &str) -> String {
    quote_option_value(path)
}

fn apostrophe_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b'\b").expect("valid apostrophe regex"))
}

fn double_quote_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new("\\B\"\\b([^\"\u{201C}\u{201D}\u{201E}\u{201F}\u{2033}\u{2036}\r\n]+)\"\\B")
            .expect("valid double quote regex")
    })
}

fn single_quote_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new("\\B'\\b([^'\u{2018}\u{2019}\u{201A}\u{201B}\u{2032}\u{2035}\r\n]+)'\\B")
            .expect("valid single quote regex")
    })
}

/// Straight quotes → typographic ones.
///
/// Apostrophes inside words become `’`, `"quoted"` becomes `“quoted”` and
/// `'quoted'` becomes `‘quoted’`. Any straight `'` left over is turned into
/// `’` as well since it could never survive inside a quoted filter value.
pub fn smarten_quotes(text: &str) -> String {
    let text = apostrophe_regex().replace_all(text, "\u{2019}");
    let text = double_quote_regex().replace_all(&text, "\u{201C}${1}\u{201D}");
    let text = single_quote_regex().replace_all(&text, "\u{2018}${1}\u{2019}");
    text.replace('\'', "\u{2019}")
}

/// Body of the drawtext `text` option, ready to be wrapped in single quotes.
///
/// Literal `\n` sequences become real line breaks before anything else is
/// escaped.
pub fn escape_drawtext(text: &str) -> String {
    let text = text.replace(LINE_BREAK, "\n");
    let text = smarten_quotes(&text);

    // pass 0: drawtext expansion
    let text = text.replace('\\', "\\\\").replace('%', "\\%");

    // pass 1: option parsing; commas are harmless but escaped for readability
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ':' => out.push_str("\\:"),
            ',' => out.push_str("\\,"),
            _ => out.push(c),
        }
    }
    out
}
