pub fn quote(text: &str) -> String {
    format!("\"{}\"", text.escape_default())
}

/// Converts a string to PascalCase.
/// - If the string contains underscores, it splits on underscores and converts each word
///   so that its first letter is uppercase and the rest lowercase.
/// - If the string does not contain underscores and is fully uppercase, it converts it
///   so that only the first letter is uppercase and the rest are lowercase.
/// - Otherwise, it ensures only the first letter is uppercase.
pub fn to_pascal_case(s: &str) -> String {
    fn capitalize(word: &str, lower_rest: bool) -> String {
        let mut chars = word.chars();
        match chars.next() {
            None => String::new(),
            Some(first) if lower_rest => first.to_uppercase().to_string() + &chars.as_str().to_lowercase(),
            Some(first) => first.to_uppercase().to_string() + chars.as_str(),
        }
    }

    if s.contains('_') {
        s.split('_')
            .filter(|word| !word.is_empty())
            .map(|word| capitalize(word, true))
            .collect::<String>()
    } else {
        // "UDT" becomes "Udt", "QuestData" keeps its inner capitals.
        capitalize(s, s == s.to_uppercase())
    }
}

/// Converts a string to snake_case.
/// This implementation avoids inserting underscores between consecutive uppercase letters,
/// so that acronyms remain intact (e.g. "sessionID" becomes "session_id").
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut snake = String::new();
    for i in 0..chars.len() {
        let c = chars[i];
        if c.is_uppercase() {
            if i > 0 {
                let prev = chars[i - 1];
                // Insert an underscore if the previous character is not uppercase,
                // or if the next character exists and is lowercase.
                if prev != '_'
                    && (!prev.is_uppercase() || (i + 1 < chars.len() && chars[i + 1].is_lowercase()))
                {
                    snake.push('_');
                }
            }
            snake.extend(c.to_lowercase());
        } else {
            snake.push(c);
        }
    }
    snake
}

/// `CampaignMetadata` → `CAMPAIGN_METADATA`, the name of a codec constant.
pub fn to_screaming_snake_case(s: &str) -> String {
    to_snake_case(s).to_uppercase()
}

/// Escapes Rust keywords, including the reserved ones, by suffixing with an underscore.
pub fn escape_rust_keyword(s: &str) -> String {
    let keywords = [
        // strict
        "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else",
        "enum", "extern", "false", "fn", "for", "if", "impl",
        "in", "let", "loop", "match", "mod", "move", "mut",
        "pub", "ref", "return", "self", "Self", "static",
        "struct", "super", "trait", "true", "type", "unsafe",
        "use", "where", "while",
        // reserved
        "abstract", "become", "box", "do", "final", "gen", "macro", "override",
        "priv", "try", "typeof", "unsized", "virtual", "yield",
    ];
    if keywords.contains(&s) {
        format!("{}_", s)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pascal_case() {
        assert_eq!(to_pascal_case("QuestData"), "QuestData");
        assert_eq!(to_pascal_case("quest_data"), "QuestData");
        assert_eq!(to_pascal_case("UDT"), "Udt");
        assert_eq!(to_pascal_case("byte"), "Byte");
    }

    #[test]
    fn snake_case() {
        assert_eq!(to_snake_case("QuestData"), "quest_data");
        assert_eq!(to_snake_case("sessionID"), "session_id");
        assert_eq!(to_snake_case("UDTAmount"), "udt_amount");
        assert_eq!(to_snake_case("Uint32Vec"), "uint32_vec");
        assert_eq!(to_snake_case("total_points"), "total_points");
        assert_eq!(to_screaming_snake_case("Byte32Opt"), "BYTE32_OPT");
    }

    #[test]
    fn keywords() {
        assert_eq!(escape_rust_keyword("type"), "type_");
        assert_eq!(escape_rust_keyword("kind"), "kind");
        for reserved in ["try", "yield", "box", "final", "macro", "become", "abstract", "gen"] {
            assert_eq!(escape_rust_keyword(reserved), format!("{}_", reserved));
        }
    }

    #[test]
    fn quoting() {
        assert_eq!(quote("Campaign"), "\"Campaign\"");
        assert_eq!(quote("a\"b"), "\"a\\\"b\"");
    }
}
