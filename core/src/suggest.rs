//! "Did you mean" suggestions for unknown names.
//!
//! Best effort only: a candidate qualifies when it shares a prefix with the
//! input or contains it (or the reverse), compared case-insensitively.
//! Prefix matches are preferred over substring matches; ties keep candidate
//! order.

/// Minimum shared leading characters for a loose prefix match.
const MIN_SHARED_PREFIX: usize = 3;

/// Returns the closest candidate for `input`, if any.
///
/// # Examples
///
/// ```
/// use schema_args_core::suggest;
///
/// assert_eq!(suggest("verb", ["quiet", "verbose"]), Some("verbose"));
/// assert_eq!(suggest("hostname", ["host", "port"]), Some("host"));
/// assert_eq!(suggest("zzz", ["host", "port"]), None);
/// ```
pub fn suggest<'a, I>(input: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let needle = input.to_lowercase();
    if needle.is_empty() {
        return None;
    }

    let candidates: Vec<&'a str> = candidates.into_iter().collect();
    let lowered: Vec<String> = candidates.iter().map(|c| c.to_lowercase()).collect();

    let prefix = lowered.iter().position(|c| {
        c.starts_with(&needle)
            || (!c.is_empty() && needle.starts_with(c.as_str()))
            || shared_prefix(c, &needle) >= MIN_SHARED_PREFIX
    });
    let substring = || {
        lowered
            .iter()
            .position(|c| c.contains(&needle) || (c.len() > 1 && needle.contains(c.as_str())))
    };

    prefix.or_else(substring).map(|idx| candidates[idx])
}

/// Formats a suggestion as a sentence suffix (`" Did you mean \"x\"?"`), or
/// an empty string when nothing is close.
pub fn did_you_mean<'a, I>(input: &str, candidates: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    suggest(input, candidates)
        .map(|s| format!(" Did you mean \"{s}\"?"))
        .unwrap_or_default()
}

fn shared_prefix(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}
