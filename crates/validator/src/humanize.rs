//! Text helpers for rendering violations as prose.

/// Turns a field name into a label: `"first_name"` → `"First name"`.
///
/// A trailing `_id` is dropped (`"user_id"` → `"User"`), underscores become
/// spaces and the first character is uppercased.
///
/// ```
/// use axn_validator::humanize;
///
/// assert_eq!(humanize("foo"), "Foo");
/// assert_eq!(humanize("account_owner_id"), "Account owner");
/// ```
#[must_use]
pub fn humanize(field: &str) -> String {
    let trimmed = field.strip_suffix("_id").filter(|s| !s.is_empty()).unwrap_or(field);
    let spaced = trimmed.trim_start_matches('_').replace('_', " ");

    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Joins items into an English list: `a`, `a and b`, `a, b, and c`.
///
/// ```
/// use axn_validator::to_sentence;
///
/// let parts = ["x".to_string(), "y".to_string(), "z".to_string()];
/// assert_eq!(to_sentence(&parts), "x, y, and z");
/// ```
#[must_use]
pub fn to_sentence<S: AsRef<str>>(items: &[S]) -> String {
    match items {
        [] => String::new(),
        [only] => only.as_ref().to_owned(),
        [first, second] => format!("{} and {}", first.as_ref(), second.as_ref()),
        [init @ .., last] => {
            let head: Vec<&str> = init.iter().map(AsRef::as_ref).collect();
            format!("{}, and {}", head.join(", "), last.as_ref())
        }
    }
}
