//! Token classification.
//!
//! Each argv entry is one of: the `--` boundary, a long flag (`--name`,
//! `--name=value`), a cluster of short aliases (`-x`, `-abc`, `-x=value`), or
//! a plain value. A dash followed by a digit is a negative number, not a flag.

use std::sync::LazyLock;

use regex::Regex;

static NEGATIVE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-\d").expect("static regex must compile"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    /// `--`: everything after it is positional.
    Boundary,
    Long {
        name: &'a str,
        inline: Option<&'a str>,
    },
    Short {
        letters: &'a str,
        inline: Option<&'a str>,
    },
    Value(&'a str),
}

pub(crate) fn classify(token: &str) -> Token<'_> {
    if token == "--" {
        return Token::Boundary;
    }
    if let Some(body) = token.strip_prefix("--") {
        let (name, inline) = split_inline(body);
        return Token::Long { name, inline };
    }
    if is_flag_like(token) {
        let body = &token[1..];
        let (letters, inline) = match body.split_once('=') {
            Some((letters, value)) => (letters, Some(value)),
            None => (body, None),
        };
        return Token::Short { letters, inline };
    }
    Token::Value(token)
}

/// Whether `token` would be read as a flag rather than a value.
///
/// A lone `-` is a value (conventionally stdin), and so is a negative number.
pub(crate) fn is_flag_like(token: &str) -> bool {
    token.len() > 1 && token.starts_with('-') && !NEGATIVE_NUMBER_RE.is_match(token)
}

pub(crate) fn is_bool_literal(token: &str) -> bool {
    matches!(token, "true" | "false" | "1" | "0")
}

/// Splits `name=value` at the first `=` outside single or double quotes.
pub(crate) fn split_inline(body: &str) -> (&str, Option<&str>) {
    let mut quote: Option<char> = None;
    for (index, ch) in body.char_indices() {
        match (quote, ch) {
            (None, '\'' | '"') => quote = Some(ch),
            (Some(open), _) if ch == open => quote = None,
            (None, '=') => return (&body[..index], Some(&body[index + 1..])),
            _ => {}
        }
    }
    (body, None)
}
