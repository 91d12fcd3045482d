use regex::Regex;

const DISALLOWED: &str = r#"[^\w\s.,!?;:()\-"]"#;

/// Normalizes extracted text before chunking: every run of whitespace becomes
/// a single space and characters outside word characters and basic
/// punctuation are blanked out.
#[derive(Debug, Clone)]
pub struct TextCleaner {
    disallowed: Regex,
}

impl TextCleaner {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self { disallowed: Regex::new(DISALLOWED)? })
    }

    pub fn clean(&self, text: &str) -> String {
        let blanked = self.disallowed.replace_all(text, " ");
        blanked.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(text: &str) -> String {
        TextCleaner::new().expect("pattern compiles").clean(text)
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(clean("  a\n\n b\t\tc  "), "a b c");
    }

    #[test]
    fn blanks_symbols_but_keeps_punctuation() {
        assert_eq!(clean("cost: $5 (approx.) # \"ok\"?"), "cost: 5 (approx.) \"ok\"?");
        assert_eq!(clean("a•b"), "a b");
    }

    #[test]
    fn keeps_non_ascii_letters() {
        assert_eq!(clean("Café naïve"), "Café naïve");
    }
}
