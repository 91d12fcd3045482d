use docqa_text::{TermAnalyzer, TextCleaner, ENGLISH_STOP_WORDS};

#[test]
fn cleaned_text_feeds_the_analyzer() {
    let raw = "Greywater  systems\n\n• reuse sink water — for irrigation!";
    let cleaned = TextCleaner::new().expect("cleaner").clean(raw);
    assert_eq!(cleaned, "Greywater systems reuse sink water for irrigation!");

    let terms = TermAnalyzer::english().terms(&cleaned, 2);
    assert_eq!(&terms[..5], ["greywater", "systems", "reuse", "sink", "water"]);
    assert!(terms.contains(&"sink water".to_string()));
    assert!(!terms.iter().any(|t| t == "for"));
}

#[test]
fn stop_word_list_is_lowercase_and_sorted() {
    assert!(ENGLISH_STOP_WORDS.iter().all(|w| w.chars().all(|c| c.is_ascii_lowercase())));
    assert!(ENGLISH_STOP_WORDS.windows(2).all(|w| w[0] < w[1]));
}
