use crate::render::style::TemplateStyle;

const FALLBACK_BASE_NAME: &str = "resume";

/// Reduces a user-supplied base name to `[A-Za-z0-9_-]`. Anything else
/// becomes `_`; a name with nothing usable left falls back to `resume`.
pub fn sanitize_base_name(base: &str) -> String {
    let cleaned: String = base
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.chars().all(|c| c == '_') {
        FALLBACK_BASE_NAME.to_string()
    } else {
        cleaned
    }
}

/// `<base>_<style>.<extension>`
pub fn output_file_name(base: &str, style: TemplateStyle, extension: &str) -> String {
    format!("{}_{}.{}", sanitize_base_name(base), style, extension)
}
