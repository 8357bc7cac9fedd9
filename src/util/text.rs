use std::borrow::Cow;

use unicode_width::UnicodeWidthChar;

/// Marker appended to any text that was cut short.
pub const ELLIPSIS: &str = "...";

/// Shortens `s` to at most `max_chars` characters, appending [`ELLIPSIS`]
/// when anything was cut.
///
/// This is the list display rule for free-text record fields: a value longer
/// than the limit renders as its first `max_chars` characters followed by
/// `"..."`. The ellipsis is added on top of the limit, so a 60-char value with
/// a limit of 50 renders as 53 chars. Values at or under the limit come back
/// borrowed.
///
/// Counts `char`s, not bytes, so multi-byte text is never split mid-codepoint.
///
/// # Examples
///
/// ```
/// use crudknut::util::shorten;
///
/// assert_eq!(shorten("short", 10), "short");
/// assert_eq!(shorten("abcdefgh", 5), "abcde...");
/// ```
pub fn shorten(s: &str, max_chars: usize) -> Cow<'_, str> {
    match s.char_indices().nth(max_chars) {
        Some((cut, _)) => Cow::Owned(format!("{}{}", &s[..cut], ELLIPSIS)),
        None => Cow::Borrowed(s),
    }
}

/// Display width of a string in terminal columns.
///
/// Sums per-char widths; characters without a defined width count as zero.
pub fn display_width(s: &str) -> usize {
    s.chars().map(|c| c.width().unwrap_or(0)).sum()
}

/// Fits `s` into `max_width` terminal columns, ellipsis included.
///
/// Unlike [`shorten`], this is about layout: the result never exceeds the
/// column budget. Below 4 columns there is no room for text plus ellipsis,
/// so the string is cut hard.
pub fn fit_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }

    let ellipsis_width = display_width(ELLIPSIS);
    let (budget, suffix) = if max_width > ellipsis_width {
        (max_width - ellipsis_width, ELLIPSIS)
    } else {
        (max_width, "")
    };

    let mut used = 0;
    let mut end = 0;
    for (idx, c) in s.char_indices() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        end = idx + c.len_utf8();
    }

    Cow::Owned(format!("{}{}", &s[..end], suffix))
}

fn is_stripped_control(c: char) -> bool {
    (c.is_ascii_control() && !matches!(c, '\t' | '\n' | '\r')) || c == '\u{7f}'
}

/// Removes terminal control characters and ANSI escape sequences.
///
/// Server-provided text goes straight into the terminal, so CSI (`ESC [`)
/// and OSC (`ESC ]`, ended by BEL or `ESC \`) sequences are dropped whole,
/// along with every other C0 control except tab, newline and carriage return.
/// Clean input comes back borrowed.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    if !s.chars().any(is_stripped_control) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            match chars.peek() {
                Some('[') => {
                    chars.next();
                    // parameters run until a final byte in 0x40..=0x7e
                    for c in chars.by_ref() {
                        if ('\u{40}'..='\u{7e}').contains(&c) {
                            break;
                        }
                    }
                }
                Some(']') => {
                    chars.next();
                    while let Some(c) = chars.next() {
                        if c == '\u{07}' {
                            break;
                        }
                        if c == '\u{1b}' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            }
        } else if !is_stripped_control(c) {
            out.push(c);
        }
    }

    Cow::Owned(out)
}
