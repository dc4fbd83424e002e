//! Canonical runtime-helper names and identifier utilities.
//!
//! The lowering pipeline emits calls to these names; the runtime library
//! exports them verbatim. `hql-core` has a test pinning the two tables
//! together.

/// `__hql_get(obj, key, default?)` — property-or-function accessor.
pub const HELPER_GET: &str = "__hql_get";
/// `__hql_getNumeric(obj, idx, default?)` — array-or-function accessor.
pub const HELPER_GET_NUMERIC: &str = "__hql_getNumeric";
/// `__hql_hash_map(...)` — mapping from alternating key/value args.
pub const HELPER_HASH_MAP: &str = "__hql_hash_map";
/// `__hql_deepFreeze(v)` — recursive freeze for `const` initializers.
pub const HELPER_DEEP_FREEZE: &str = "__hql_deepFreeze";
/// `__hql_get_op(op)` — reify an operator symbol as a function.
pub const HELPER_GET_OP: &str = "__hql_get_op";
/// `__hql_range(...)` — variadic range.
pub const HELPER_RANGE: &str = "__hql_range";
/// `__hql_lazy_seq(thunk)` — lazy seq constructor.
pub const HELPER_LAZY_SEQ: &str = "__hql_lazy_seq";
/// `__hql_throw(v)` — normalize thrown values.
pub const HELPER_THROW: &str = "__hql_throw";
/// `__hql_for_each(seq, fn)` — effectful iteration.
pub const HELPER_FOR_EACH: &str = "__hql_for_each";
/// `__hql_toSequence(v)` — coerce to an array-like.
pub const HELPER_TO_SEQUENCE: &str = "__hql_toSequence";

/// Property of the sentinel object thrown by transformed early returns.
pub const EARLY_RETURN_KEY: &str = "__hql_early_return__";

/// Prefix for loop-update temporaries.
pub const TEMP_PREFIX: &str = "__hql_temp_";

/// Every helper name the pipeline may emit.
pub const EMITTED_HELPERS: &[&str] = &[
    HELPER_GET,
    HELPER_GET_NUMERIC,
    HELPER_HASH_MAP,
    HELPER_DEEP_FREEZE,
    HELPER_GET_OP,
    HELPER_RANGE,
    HELPER_LAZY_SEQ,
    HELPER_THROW,
    HELPER_FOR_EACH,
    HELPER_TO_SEQUENCE,
];

/// Map an HQL symbol name to a valid JavaScript identifier.
///
/// Hyphenated names become snake case; the `?`/`!`/`*` suffix
/// conventions get stable textual markers. Names that are already valid
/// identifiers pass through unchanged.
#[must_use]
pub fn sanitize_identifier(name: &str) -> String {
    if name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$' || c == '#')
    {
        return name.to_string();
    }
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '-' => out.push('_'),
            '?' => out.push_str("_p"),
            '!' => out.push_str("_bang"),
            '*' => out.push_str("_star"),
            c if c.is_ascii_alphanumeric() || c == '_' || c == '$' || c == '#' => out.push(c),
            _ => out.push('_'),
        }
    }
    out
}

/// Split a `name:Type` symbol into the name and its annotation.
#[must_use]
pub fn split_type_annotation(name: &str) -> (&str, Option<&str>) {
    // `js/` names and dot-paths never carry annotations.
    if name.starts_with("js/") {
        return (name, None);
    }
    match name.split_once(':') {
        Some((id, ty)) if !id.is_empty() && !ty.is_empty() => (id, Some(ty)),
        _ => (name, None),
    }
}

/// Whether a string is usable as a bare (non-computed) JS property name.
#[must_use]
pub fn is_identifier_like(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
