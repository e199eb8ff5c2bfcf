//! `{name}` placeholder expansion.

use crate::value::{Fields, LogValue};
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// `{identifier}` where the identifier is one or more ASCII word characters.
/// Compiled once; every log call goes through it.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z0-9_]+)\}").expect("placeholder pattern is valid"));

/// Expand every placeholder whose name exists in `data`.
///
/// Existence, not truthiness, decides: an empty string or zero is still
/// substituted. Unknown placeholders stay in the output verbatim, braces
/// included. The expansion is a single left-to-right pass, so substituted
/// values are never expanded again.
pub fn format_template(template: &str, data: &Fields) -> String {
    format_with(template, |name| data.get(name))
}

/// Like [`format_template`] with a caller-provided lookup, for layered
/// sources such as bindings under call data.
pub fn format_with<'a, F>(template: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<&'a LogValue>,
{
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match lookup(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Placeholder names in order of occurrence, duplicates included.
pub fn placeholders(template: &str) -> impl Iterator<Item = &str> {
    PLACEHOLDER
        .captures_iter(template)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
}
