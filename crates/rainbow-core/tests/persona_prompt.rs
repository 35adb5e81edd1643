use chrono::NaiveDate;
use rainbow_core::persona::{Archetype, CreatePetPersonaRequest, PetPersona};
use rainbow_core::prompt::build_system_prompt;
use rainbow_core::safety::contains_danger_signal;

const BORI_TOML: &str = r#"
name = "Bori"
breed = "진돗개"
departure_date = "2024-03-01"
caller_nickname = "누나"
archetype = "sweet"
memories_text = "비 오는 날 현관에서 같이 빗소리 듣기"
favorite_treat = "고구마"
disliked_thing = "청소기"
frequent_behavior = "앞발로 손 툭툭 치기"
"#;

#[test]
fn persona_file_drives_prompt() {
    let persona: PetPersona = toml::from_str(BORI_TOML).expect("persona should parse");
    let prompt = build_system_prompt(&persona);

    assert!(prompt.contains("당신은 Bori입니다"));
    assert!(prompt.contains("누나"));
    assert!(prompt.contains("고구마"));
    assert!(prompt.contains("비 오는 날 현관에서 같이 빗소리 듣기"));
}

#[test]
fn equal_personas_give_identical_prompts() {
    let from_file: PetPersona = toml::from_str(BORI_TOML).unwrap();
    let rebuilt = CreatePetPersonaRequest::from_persona(&from_file).into_persona();

    assert_eq!(from_file, rebuilt);
    assert_eq!(build_system_prompt(&from_file), build_system_prompt(&rebuilt));
}

#[test]
fn archetype_changes_prompt() {
    let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let sweet = build_system_prompt(&PetPersona::new("Bori", "누나", date, Archetype::Sweet));
    let mature = build_system_prompt(&PetPersona::new("Bori", "누나", date, Archetype::Mature));
    assert_ne!(sweet, mature);
    assert!(mature.contains("존댓말"));
}

#[test]
fn danger_signal_in_mixed_case_text() {
    assert!(contains_danger_signal("I feel like 죽고싶어 TODAY"));
    assert!(!contains_danger_signal("오늘 뭐 했어?"));
}
