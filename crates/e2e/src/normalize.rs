//! Output normalization for format-insensitive containment checks
//!
//! CLI tables and help text reflow differently across terminal widths and
//! platforms. Normalization removes the incidental differences (ANSI styling,
//! line-ending style, runs of horizontal whitespace, trailing spaces) while
//! leaving the visible words and their order untouched.

use std::sync::LazyLock;

use regex::Regex;

/// Separator used between lines of normalized text
pub const LINE_SEPARATOR: char = '\n';

/// CSI sequences (colors, cursor movement) and two-byte escapes
static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-?]*[ -/]*[@-~]|\x1b[@-Z\\-_]").unwrap());

fn is_horizontal_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{0b}' | '\u{0c}' | '\u{a0}')
}

/// Produce the canonical comparable form of `text`.
///
/// Idempotent: `normalize(&normalize(s)) == normalize(s)`.
pub fn normalize(text: &str) -> String {
    // Collapsing can turn a tab or NBSP inside an escape body into a space,
    // which is a valid CSI byte; a single pass is not a fixed point.
    let mut current = normalize_pass(text);
    loop {
        let next = normalize_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn normalize_pass(text: &str) -> String {
    let stripped = ANSI_ESCAPE.replace_all(text, "");
    let unified = stripped.replace("\r\n", "\n").replace('\r', "\n");

    let mut out = String::with_capacity(unified.len());
    for (i, line) in unified.split('\n').enumerate() {
        if i > 0 {
            out.push(LINE_SEPARATOR);
        }
        collapse_line(line, &mut out);
    }
    out
}

/// Append `line` to `out` with whitespace runs collapsed and ends trimmed.
fn collapse_line(line: &str, out: &mut String) {
    let mut pending_space = false;
    let mut wrote_any = false;

    for c in line.chars() {
        if is_horizontal_space(c) {
            pending_space = wrote_any;
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(c);
        wrote_any = true;
    }
}

/// Normalized containment: both sides pass through [`normalize`] first.
pub fn contains_normalized(haystack: &str, needle: &str) -> bool {
    normalize(haystack).contains(&normalize(needle))
}
