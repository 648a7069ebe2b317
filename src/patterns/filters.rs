/// Append `.js` to a `data-main` module name so it can be looked up as a file.
pub fn append_js_extension(reference: &str) -> String {
    if reference.ends_with(".js") {
        reference.to_string()
    } else {
        format!("{reference}.js")
    }
}

/// Drop the trailing `.js` again so the attribute keeps naming a module.
pub fn strip_js_extension(resolved: &str) -> String {
    resolved
        .strip_suffix(".js")
        .unwrap_or(resolved)
        .to_string()
}
