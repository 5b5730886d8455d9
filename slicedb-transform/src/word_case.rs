//! Case-class detection and preservation (§4.4.3): a replacement value is
//! chosen first, then its case is coerced to match the original input's
//! "word case class" — all-upper, all-lower, title, or other.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharCategory {
    Uppercase,
    Lowercase,
    Number,
    Other,
}

pub fn char_category(c: char) -> CharCategory {
    if c.is_uppercase() {
        CharCategory::Uppercase
    } else if c.is_lowercase() {
        CharCategory::Lowercase
    } else if c.is_numeric() {
        CharCategory::Number
    } else {
        CharCategory::Other
    }
}

/// Strips everything but ASCII letters, for case-class detection on values
/// that might otherwise contain digits or punctuation (e.g. "O'Brien 3rd").
pub fn letters_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_alphabetic()).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordCase {
    Uppercase,
    Lowercase,
    Titlecase,
    Other,
}

/// Classifies the case shape of `s`. An empty string has no case class.
pub fn word_case(s: &str) -> WordCase {
    let chars: Vec<char> = s.chars().collect();
    if chars.is_empty() {
        return WordCase::Other;
    }
    let categories: Vec<CharCategory> = chars.iter().map(|&c| char_category(c)).collect();

    if categories.iter().all(|c| *c == CharCategory::Uppercase) {
        return WordCase::Uppercase;
    }
    if categories.iter().all(|c| *c == CharCategory::Lowercase) {
        return WordCase::Lowercase;
    }
    if categories[0] == CharCategory::Uppercase
        && categories[1..].iter().all(|c| *c == CharCategory::Lowercase)
    {
        return WordCase::Titlecase;
    }
    WordCase::Other
}

/// Applies `case` to `s`. `Other` passes `s` through unchanged.
pub fn apply_case(s: &str, case: WordCase) -> String {
    match case {
        WordCase::Uppercase => s.to_uppercase(),
        WordCase::Lowercase => s.to_lowercase(),
        WordCase::Titlecase => {
            let mut chars = s.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        }
        WordCase::Other => s.to_string(),
    }
}

/// Picks a replacement's case from `source`, skipping the titlecase special
/// case when the replacement is already titlecase-shaped (most corpora
/// entries already are) — only reshape when the default shape would
/// otherwise be wrong.
pub fn reshape_like(replacement: &str, source: &str) -> String {
    let case = word_case(&letters_only(source));
    if case == WordCase::Titlecase {
        replacement.to_string()
    } else {
        apply_case(replacement, case)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_case_classes() {
        assert_eq!(word_case("JOHN"), WordCase::Uppercase);
        assert_eq!(word_case("john"), WordCase::Lowercase);
        assert_eq!(word_case("John"), WordCase::Titlecase);
        assert_eq!(word_case("jOHN"), WordCase::Other);
    }

    #[test]
    fn reshape_matches_source_case() {
        assert_eq!(reshape_like("Replacement", "SOURCE"), "REPLACEMENT");
        assert_eq!(reshape_like("Replacement", "source"), "replacement");
        assert_eq!(reshape_like("Replacement", "Source"), "Replacement");
    }
}
