//! Case conversion for resource codes: model names are PascalCase ("BlogPost"), codes are kebab-case ("blog-post").

use regex::Regex;
use std::sync::OnceLock;

/// Convert a PascalCase or camelCase identifier to kebab-case.
/// e.g. "BlogPost" -> "blog-post", "HTTPLog" -> "http-log"
pub fn to_kebab_case(s: &str) -> String {
    split_words(s).join("-")
}

/// Convert a PascalCase or camelCase identifier to snake_case.
/// e.g. "BlogPost" -> "blog_post"
pub fn to_snake_case(s: &str) -> String {
    split_words(s).join("_")
}

/// Whether `code` is a well-formed resource code: lowercase words joined by single hyphens.
pub fn is_resource_code(code: &str) -> bool {
    static CODE: OnceLock<Regex> = OnceLock::new();
    CODE.get_or_init(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("static regex"))
        .is_match(code)
}

/// Split an identifier into lowercase words on case boundaries, digits runs stay attached.
/// An uppercase run followed by a lowercase letter starts a new word at its last capital ("HTTPLog" -> "http", "log").
fn split_words(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();
    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' || c == ' ' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).map(|n| n.is_lowercase()).unwrap_or(false);
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                words.push(std::mem::take(&mut current));
            }
        }
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}
