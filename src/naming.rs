//! Identifier helpers for generated aggregates and fields.

/// Upper-case the first character of `name`, leaving the rest untouched.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Aggregate name of the top-level resource `native_type`.
pub fn top_level_name(native_type: &str) -> String {
    capitalize(native_type)
}

/// Type names the emitted package imports or takes from the prelude. A
/// top-level aggregate may not use them.
pub const RESERVED_TYPE_NAMES: &[&str] = &[
    "Arc",
    "Box",
    "Default",
    "Deserialize",
    "HashMap",
    "Once",
    "OnceLock",
    "Option",
    "Provider",
    "ResourceConfig",
    "Result",
    "Serialize",
    "String",
    "Vec",
];

/// Whether `name` is one of [`RESERVED_TYPE_NAMES`].
pub fn is_reserved_type_name(name: &str) -> bool {
    RESERVED_TYPE_NAMES.contains(&name)
}

/// Name of the CRUD handler emitted for the top-level aggregate `aggregate`.
pub fn handler_name(aggregate: &str) -> String {
    format!("{}Handler", aggregate)
}

/// Name of the anonymous nested aggregate minted with counter value `salt`.
pub fn nested_name(parent: &str, attribute: &str, salt: u64) -> String {
    format!("{}_{}_{}", parent, attribute, salt)
}

/// Whether `name` is usable as an identifier fragment in emitted source.
///
/// Names must match `[A-Za-z_][A-Za-z0-9_]*` and must not capitalise to the
/// reserved `Self`.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let valid_start = match chars.next() {
        Some(c) => c.is_ascii_alphabetic() || c == '_',
        None => false,
    };
    valid_start
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && name != "_"
        && capitalize(name) != "Self"
}
