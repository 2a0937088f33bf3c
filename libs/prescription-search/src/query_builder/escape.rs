//! PostgREST value escaping helpers
//!
//! Filter values inside `or=(...)` and `in.(...)` lists are separated by `,` and
//! grouped by parentheses, so values containing reserved characters must be
//! double-quoted (with `\` and `"` backslash-escaped inside the quotes).
//! `ilike` patterns additionally treat `%` and `_` as wildcards.

const RESERVED: &[char] = &[',', '.', ':', '(', ')', '"', '\\', ' '];

/// Build a "contains" `ilike` pattern. PostgREST maps `*` to `%`.
///
/// PostgREST has no escape for `*`, so a `*` typed by the user stays a
/// wildcard against the backend while [`LocalStore`](crate::store::LocalStore)
/// matches it literally. The remote result is then a superset of the local one.
pub(crate) fn contains_pattern(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('*');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('*');
    out
}

/// Quote a value for use inside a PostgREST list when it contains reserved characters.
pub(crate) fn quote_list_value(value: &str) -> String {
    if !value.contains(RESERVED) {
        return value.to_string();
    }
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}
