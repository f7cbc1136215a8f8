use std::borrow::Cow;

use unicode_width::UnicodeWidthChar;

const ELLIPSIS: &str = "...";

/// Truncates a string to at most `max_width` terminal columns, appending
/// `...` when anything was cut.
///
/// Widths are Unicode-aware, so accented product names and CJK text are
/// measured the way the terminal renders them. The ellipsis is added on top
/// of `max_width`.
///
/// ```
/// use parentsku::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("Camiseta", 20), "Camiseta");
/// assert_eq!(truncate_to_width("Camiseta Básica", 8), "Camiseta...");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    let mut width = 0;
    for (idx, c) in s.char_indices() {
        width += UnicodeWidthChar::width(c).unwrap_or(0);
        if width > max_width {
            return Cow::Owned(format!("{}{}", &s[..idx], ELLIPSIS));
        }
    }
    Cow::Borrowed(s)
}

/// SEC-001: Removes ASCII control characters and ANSI escape sequences from
/// feed-supplied text before it is echoed to the terminal.
///
/// Tab and newline are kept. Returns `Cow::Borrowed` for clean input.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    let is_control = |c: char| c == '\x7f' || (c < ' ' && c != '\t' && c != '\n');
    if !s.chars().any(is_control) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            // CSI: skip parameters through the final byte (0x40..=0x7e)
            chars.next();
            for c in chars.by_ref() {
                if ('\x40'..='\x7e').contains(&c) {
                    break;
                }
            }
        } else if !is_control(c) {
            out.push(c);
        }
    }
    Cow::Owned(out)
}
