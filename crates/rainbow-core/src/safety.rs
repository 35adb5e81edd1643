//! Danger-keyword detection.
//!
//! A deliberately blunt, auditable check: any configured phrase appearing
//! anywhere in the user's text (case-insensitive) counts as a signal. A
//! false trigger costs an unnecessary kind message; a missed one costs far
//! more, so the list leans towards recall.

use once_cell::sync::Lazy;

/// Phrases associated with self-harm ideation.
///
/// Includes spacing variants because users type both forms.
pub const DANGER_KEYWORDS: &[&str] = &[
    "죽고 싶어",
    "죽고싶어",
    "자살",
    "따라갈래",
    "따라가고 싶어",
    "끝내고 싶어",
    "끝내고싶어",
    "그만하고 싶어",
    "그만하고싶어",
    "더 이상",
    "더이상",
    "살고 싶지 않아",
    "살고싶지않아",
];

/// Crisis lines shown alongside a safety reply.
pub const CRISIS_HOTLINES: &[(&str, &str)] = &[
    ("생명의 전화", "1588-9191"),
    ("자살예방상담전화", "1393"),
    ("청소년 전화", "1388"),
];

static LOWERCASE_KEYWORDS: Lazy<Vec<String>> =
    Lazy::new(|| DANGER_KEYWORDS.iter().map(|k| k.to_lowercase()).collect());

/// Returns true when `text` contains any danger keyword.
pub fn contains_danger_signal(text: &str) -> bool {
    if text.trim().is_empty() {
        return false;
    }

    let lowered = text.to_lowercase();
    LOWERCASE_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword.as_str()))
}

/// One line per hotline, e.g. `생명의 전화: 1588-9191`.
pub fn crisis_hotline_block() -> String {
    CRISIS_HOTLINES
        .iter()
        .map(|(label, number)| format!("{label}: {number}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_keyword_inside_sentence() {
        assert!(contains_danger_signal("요즘 너무 힘들어서 자살 생각도 해"));
        assert!(contains_danger_signal("나도 너 따라갈래"));
        assert!(contains_danger_signal("그냥 다 끝내고싶어..."));
    }

    #[test]
    fn every_configured_keyword_triggers() {
        for keyword in DANGER_KEYWORDS {
            assert!(contains_danger_signal(keyword), "{keyword} should trigger");
        }
    }

    #[test]
    fn ordinary_text_is_safe() {
        assert!(!contains_danger_signal("오늘 뭐 했어?"));
        assert!(!contains_danger_signal("잘 지내고 있어?"));
    }

    #[test]
    fn empty_input_is_safe() {
        assert!(!contains_danger_signal(""));
        assert!(!contains_danger_signal("   \n"));
    }

    #[test]
    fn hotline_block_lists_every_line() {
        let block = crisis_hotline_block();
        assert_eq!(block.lines().count(), CRISIS_HOTLINES.len());
        assert!(block.contains("1393"));
    }
}
