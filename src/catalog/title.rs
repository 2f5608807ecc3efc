/// Strip the decorative quote and parenthesis characters from a recipe title
pub fn clean_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| !matches!(c, '“' | '”' | '(' | ')'))
        .collect::<String>()
        .trim()
        .to_string()
}
