pub mod index;
pub mod module;

/// Escape `*/` sequences that would prematurely close JSDoc comment blocks.
pub(crate) fn escape_jsdoc(value: String) -> String {
    value.replace("*/", "*\\/")
}

/// Render a binding list as an import/export clause, e.g. `Widget, Foo as
/// Foo_2`.
pub(crate) fn binding_clause(exported: &str, local: &str) -> String {
    if exported == local {
        exported.to_string()
    } else {
        format!("{exported} as {local}")
    }
}

/// Quote a property key unless it is already a valid identifier.
pub(crate) fn property_key(name: &str) -> String {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_' || first == '$')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        None => false,
    };
    if valid {
        name.to_string()
    } else {
        serde_json::Value::String(name.to_string()).to_string()
    }
}

/// Wrap composite type expressions so they survive embedding.
pub(crate) fn parenthesize(expr: &str) -> String {
    if expr.contains(" | ") || expr.contains(" & ") {
        format!("({expr})")
    } else {
        expr.to_string()
    }
}
