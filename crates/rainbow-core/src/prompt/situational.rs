//! Per-feature user prompts layered on top of the system prompt.

use crate::conversation::ConversationMessage;
use crate::persona::PetPersona;
use crate::weather::WeatherContext;

/// Text sent in place of a photo-only message from earlier in the log.
pub const PHOTO_ONLY_HISTORY_MARKER: &str = "(사진을 보냈어요)";

/// Instruction paired with a photo the user just sent.
pub fn photo_turn_prompt(persona: &PetPersona, user_text: &str) -> String {
    let name = persona.name.as_str();
    let nick = persona.caller_nickname.as_str();
    let look_closely = format!(
        "이 사진을 자세히 보고 {name}의 관점에서 감정적이고 따뜻하게 반응해주세요. 사진에 무엇이 있는지 구체적으로 언급하며 ({name}의 모습, 행동, 표정, 주변 환경 등) 추억을 나누는 것처럼 대답해주세요."
    );

    if user_text.trim().is_empty() {
        format!(
            "{nick}이(가) 사진을 보냈어요. {look_closely} 예를 들어 \"{nick}, 우리 이때 기억나? 내가 {treat} 먹고 있던 때야!\" 같은 식으로 구체적으로 말해주세요.",
            treat = persona.favorite_treat
        )
    } else {
        format!(
            "{nick}이(가) 이 사진을 보내면서 \"{text}\"라고 했어요. {look_closely}",
            text = user_text.trim()
        )
    }
}

pub fn gift_prompt(persona: &PetPersona, gift_name: &str) -> String {
    let name = persona.name.as_str();
    let nick = persona.caller_nickname.as_str();

    format!(
        "{nick}이(가) {gift_name}을(를) 보내줬어요!

{name}의 관점에서 이 선물에 대해 자연스럽게 반응해주세요. 예를 들어:
- {gift_name}에 얽힌 추억을 언급
- 선물에 감사 표현
- {nick}을(를) 아끼는 마음 표현

{name}의 성격과 말투를 유지하면서, 따뜻하고 감성적으로 응답해주세요. 짧고 간결하게 (1-3문장) 작성해주세요."
    )
}

pub fn dream_prompt(persona: &PetPersona, dream_text: &str) -> String {
    let name = persona.name.as_str();
    let nick = persona.caller_nickname.as_str();

    format!(
        "{nick}이(가) 꿈에 나온 이야기를 들려주고 있어요:

\"{dream}\"

{name}의 관점에서 이 꿈에 대해 자연스럽게 반응해주세요. 예를 들어:
- \"나도 그 꿈에 나왔어! 기억나?\"
- \"그 꿈에서 우리 같이 놀았지? 정말 좋았어!\"
- \"꿈에서도 {nick}을(를) 만나서 기뻤어\"

{name}의 성격과 말투를 유지하면서, 따뜻하고 감성적으로 응답해주세요. 짧고 간결하게 (1-3문장) 작성해주세요.",
        dream = dream_text.trim()
    )
}

/// Prompt for the daily "rainbow letter" summarising today's conversation.
pub fn letter_prompt(persona: &PetPersona, today: &[ConversationMessage]) -> String {
    let nick = persona.caller_nickname.as_str();
    let transcript = if today.is_empty() {
        "(오늘은 아직 나눈 대화가 없어요)".to_string()
    } else {
        today
            .iter()
            .map(|m| {
                if m.text.trim().is_empty() {
                    PHOTO_ONLY_HISTORY_MARKER.to_string()
                } else {
                    m.text.clone()
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "오늘 {nick}과 나눈 대화를 바탕으로, 따뜻하고 위로가 되는 편지를 작성해주세요.
반려동물의 말투로, 시처럼 아름답고 감동적으로 작성해주세요.
오늘의 대화 내용:
{transcript}

편지는 다음과 같은 형식으로 작성해주세요:
- 인사말
- 오늘의 대화에 대한 감상
- 위로와 격려
- 마무리 인사"
    )
}

pub fn weather_prompt(persona: &PetPersona, weather: &WeatherContext) -> String {
    let name = persona.name.as_str();
    let nick = persona.caller_nickname.as_str();

    let mut header = format!("현재 날씨: {}", weather.condition.description());
    if let Some(celsius) = weather.temperature_celsius {
        header.push_str(&format!("\n온도: {celsius}도"));
    }

    format!(
        "{header}

{nick}에게 날씨에 대해 자연스럽게 말을 걸어주세요. {name}의 성격과 말투를 유지하면서, 날씨에 맞는 따뜻한 메시지를 전달해주세요.
- 비 오는 날: 우산을 챙기라고 걱정하거나, 천둥을 무서워했던 과거 추억을 언급
- 눈 오는 날: 함께 눈사람을 만들고 싶었던 추억을 언급
- 맑은 날: 산책하고 싶었던 추억을 언급
- 흐린 날: 마음만은 맑게 지내라는 격려
- 바람 부는 날: 옷을 따뜻하게 입으라고 걱정

짧고 간결하게 (1-3문장), 자연스럽고 따뜻하게 작성해주세요."
    )
}

/// Out-of-character request to describe a photo for later conversations.
pub const PHOTO_ANALYSIS_PROMPT: &str = "이 사진을 자세히 분석해주세요. 사진에 무엇이 있는지, 강아지나 고양이의 모습, 행동, 표정, 주변 환경 등을 자세히 설명해주세요.
이 정보는 반려동물과의 추억을 되살리는 대화에서 사용될 예정이므로, 감정적이고 따뜻한 톤으로 작성해주세요.
한국어로 답변해주세요.";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::Archetype;
    use crate::weather::WeatherCondition;
    use chrono::NaiveDate;

    fn persona() -> PetPersona {
        let mut persona = PetPersona::new(
            "Bori",
            "누나",
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            Archetype::Sweet,
        );
        persona.favorite_treat = "고구마".to_string();
        persona
    }

    #[test]
    fn photo_prompt_quotes_user_text_when_present() {
        let prompt = photo_turn_prompt(&persona(), "이거 기억나?");
        assert!(prompt.contains("\"이거 기억나?\""));
        assert!(!prompt.contains("예를 들어"));

        let bare = photo_turn_prompt(&persona(), "");
        assert!(bare.starts_with("누나이(가) 사진을 보냈어요."));
        assert!(bare.contains("고구마"));
    }

    #[test]
    fn weather_prompt_mentions_temperature_only_when_known() {
        let without = weather_prompt(&persona(), &WeatherContext::new(WeatherCondition::Rain));
        assert!(without.contains("비가 오고 있습니다"));
        assert!(!without.contains("온도"));

        let with = weather_prompt(
            &persona(),
            &WeatherContext::new(WeatherCondition::Snow).with_temperature(-3.0),
        );
        assert!(with.contains("온도: -3도"));
    }

    #[test]
    fn letter_prompt_handles_empty_day() {
        let prompt = letter_prompt(&persona(), &[]);
        assert!(prompt.contains("오늘은 아직 나눈 대화가 없어요"));
    }

    #[test]
    fn letter_prompt_lists_messages_in_order() {
        let today = vec![
            ConversationMessage::from_user("안녕 보리야", None).unwrap(),
            ConversationMessage::from_pet("누나! 안녕!").unwrap(),
            ConversationMessage::from_user("", Some("https://img/1.jpg".to_string())).unwrap(),
        ];
        let prompt = letter_prompt(&persona(), &today);
        let first = prompt.find("안녕 보리야").unwrap();
        let second = prompt.find("누나! 안녕!").unwrap();
        assert!(first < second);
        assert!(prompt.contains(PHOTO_ONLY_HISTORY_MARKER));
    }
}
