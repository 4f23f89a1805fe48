/// Normalizes a user-supplied tool name into the PascalCase identifier used
/// for generated tools and their registry key.
///
/// Spaces and hyphens separate words, every word is capitalized, anything that
/// is not alphanumeric is dropped, and names that would start with a digit get
/// a `Tool` prefix.
pub fn format_tool_name(name: &str) -> String {
    let formatted: String = name
        .replace([' ', '-'], "_")
        .split('_')
        .map(capitalize)
        .collect::<String>()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect();

    match formatted.chars().next() {
        Some(first) if !first.is_alphabetic() => format!("Tool{formatted}"),
        _ => formatted,
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
