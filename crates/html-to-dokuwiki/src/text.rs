//! Text-level helpers shared by the converter handlers.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static BLANK_LINE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Collapse every run of whitespace (including newlines) to a single space.
///
/// Word-flavoured HTML is full of soft line breaks and indentation inside
/// text nodes; they carry no meaning in wiki markup.
pub(crate) fn collapse_whitespace(text: &str) -> Cow<'_, str> {
    WHITESPACE_RUN.replace_all(text, " ")
}

/// Squeeze runs of three or more newlines down to exactly two.
///
/// Idempotent: re-applying to its own output changes nothing.
pub(crate) fn squeeze_blank_lines(text: &str) -> Cow<'_, str> {
    BLANK_LINE_RUN.replace_all(text, "\n\n")
}

/// Decode the HTML entities that commonly survive in clipboard payloads.
///
/// Not a full entity table; numeric references and the handful of named
/// entities word processors actually emit.
pub(crate) fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let Some(end) = rest.find(';').filter(|&end| end <= 12) else {
            out.push('&');
            rest = &rest[1..];
            continue;
        };
        let entity = &rest[1..end];
        match decode_entity(entity) {
            Some(ch) => out.push(ch),
            None => out.push_str(&rest[..=end]),
        }
        rest = &rest[end + 1..];
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let code = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")).map_or_else(
                || entity.strip_prefix('#').and_then(|d| d.parse::<u32>().ok()),
                |h| u32::from_str_radix(h, 16).ok(),
            )?;
            // Non-breaking space renders as a plain space in wiki markup.
            if code == 0xA0 {
                return Some(' ');
            }
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_mixed_whitespace_runs() {
        assert_eq!(collapse_whitespace("a \t\n  b"), "a b");
    }

    #[test]
    fn squeeze_is_idempotent() {
        let once = squeeze_blank_lines("a\n\n\n\n\nb").into_owned();
        assert_eq!(once, "a\n\nb");
        assert_eq!(squeeze_blank_lines(&once), once);
    }

    #[test]
    fn squeeze_leaves_single_and_double_newlines_alone() {
        assert_eq!(squeeze_blank_lines("a\nb\n\nc"), "a\nb\n\nc");
    }

    #[test]
    fn decodes_common_entities() {
        assert_eq!(decode_entities("a&nbsp;&amp;&#65;&#xe9;"), "a &A\u{e9}");
    }

    #[test]
    fn leaves_unknown_entities_verbatim() {
        assert_eq!(decode_entities("&bogus; & plain"), "&bogus; & plain");
    }
}
