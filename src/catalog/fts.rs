/// Turn free text into an FTS5 expression requiring every word
///
/// Each token is quoted, so operators and column filters typed by a user
/// are matched as plain words. Returns `None` when the text has no words.
pub fn match_expression(text: &str) -> Option<String> {
    let terms: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(|token| format!("\"{token}\""))
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" "))
    }
}
