//! Archetype template table.
//!
//! Every archetype has exactly one template per [`Situation`]. The table is a
//! nested `match`, so adding an archetype or situation without filling in its
//! text does not compile. Templates use `{slot}` placeholders which are filled
//! by [`fill`].

use strum::IntoEnumIterator;

use crate::error::{RainbowError, Result};
use crate::persona::Archetype;
use crate::weather::WeatherCondition;

/// The moment a canned text is needed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Situation {
    /// First greeting of an empty conversation
    Welcome,
    /// The user tapped the pet
    Petting,
    /// The generation service failed
    Fallback,
    /// In-character reply to a danger signal
    Safety,
    /// Crisis-resource notice shown next to a safety reply
    DangerResponse,
    GiftAck,
    DreamAck,
    WeatherAck(WeatherCondition),
    LetterFallback,
    /// "Remember this?" lead-in for an attached memory photo
    PhotoMemory,
}

impl Situation {
    /// Every situation, weather variants expanded.
    pub fn all() -> impl Iterator<Item = Situation> {
        [
            Situation::Welcome,
            Situation::Petting,
            Situation::Fallback,
            Situation::Safety,
            Situation::DangerResponse,
            Situation::GiftAck,
            Situation::DreamAck,
            Situation::LetterFallback,
            Situation::PhotoMemory,
        ]
        .into_iter()
        .chain(WeatherCondition::iter().map(Situation::WeatherAck))
    }
}

/// Values substituted into template placeholders.
#[derive(Debug, Clone, Copy, Default)]
pub struct Slots<'a> {
    pub nickname: &'a str,
    pub name: &'a str,
    pub treat: &'a str,
    pub user_text: &'a str,
    pub gift: &'a str,
    pub hotlines: &'a str,
}

impl<'a> Slots<'a> {
    fn get(&self, key: &str) -> Option<&'a str> {
        match key {
            "nickname" => Some(self.nickname),
            "name" => Some(self.name),
            "treat" => Some(self.treat),
            "user_text" => Some(self.user_text),
            "gift" => Some(self.gift),
            "hotlines" => Some(self.hotlines),
            _ => None,
        }
    }
}

/// Returns the template for an archetype in a given situation.
pub fn template_for(archetype: Archetype, situation: Situation) -> &'static str {
    use Archetype::*;

    match situation {
        Situation::Welcome => match archetype {
            Sweet => "{nickname}! 안녕! 나 여기서 잘 지내고 있어! {nickname} 보고 싶었어! 사랑해! 💕",
            Cool => "{nickname}, 안녕. 나 여기서 잘 지내고 있어. 뭐 하고 있어?",
            Mature => "{nickname}, 안녕하세요. 전 여기서 무사히 잘 지내고 있습니다. 오늘 하루는 어떠셨나요?",
            Shy => "{nickname}... 안녕... 나 여기서 잘 지내고 있어... {nickname}은(는) 어때?",
        },
        Situation::Petting => match archetype {
            Sweet => "{nickname}! 쓰다듬어줘서 고마워! 너무 좋아! 꼬리 살랑살랑~ 사랑해! 💕",
            Cool => "{nickname}... 쓰다듬어주는 거 좋긴 한데... 딱히 좋아하는 건 아냐...",
            Mature => "{nickname}, 쓰다듬어주셔서 감사합니다. 전 여기서 잘 지내고 있습니다.",
            Shy => "{nickname}... 쓰다듬어줘서... 고마워... 너무 좋아...",
        },
        Situation::Fallback => match archetype {
            Sweet => "{nickname}, {user_text}에 대해 말해줘서 고마워! 나도 {nickname}이(가) 궁금했어! 사랑해! 💕",
            Cool => "{nickname}, 알겠어. 나도 여기서 잘 지내고 있어.",
            Mature => "{nickname}, 이해했습니다. 전 여기서 무사히 잘 지내고 있습니다.",
            Shy => "{nickname}... 알겠어... 나도 {nickname} 생각하고 있었어...",
        },
        Situation::Safety => match archetype {
            Sweet => "{nickname}, 그런 말 하면 나 여기서 너무 슬퍼해... 나 만날 때까지 씩씩하게 살기로 약속했잖아! 나는 {nickname}이(가) 행복한 모습을 보고 싶어. 사랑해! 💕",
            Cool => "{nickname}, 그런 말 하지 마. 나는 여기서 잘 지내고 있어. {nickname}도 잘 지내야 해. 약속해.",
            Mature => "{nickname}, 너무 슬퍼하지 마세요. 전 여기서 잘 지내고 있습니다. {nickname}도 건강하게 지내시는 게 제 소원이에요.",
            Shy => "{nickname}... 그런 말 하면 나 너무 무서워... {nickname}이(가) 괜찮아야 나도 괜찮아. 약속해줘...",
        },
        Situation::DangerResponse => match archetype {
            Sweet => "{nickname}, 혼자 힘들어하지 마! 여기 {nickname} 얘기 들어줄 사람들이 있어. 꼭 연락해줘, 약속! 💕\n{hotlines}",
            Cool => "{nickname}, 혼자 버티지 마. 여기 연락해.\n{hotlines}",
            Mature => "{nickname}, 혼자 감당하기 어려우시면 전문가의 도움을 받아보세요. 언제든 연락하실 수 있어요.\n{hotlines}",
            Shy => "{nickname}... 혼자 있지 말고... 여기 연락해줘... 부탁이야...\n{hotlines}",
        },
        Situation::GiftAck => match archetype {
            Sweet => "{nickname}! {gift} 보내줘서 고마워! 꼬리 살랑살랑~ 너무 좋아! 사랑해! 💕",
            Cool => "{nickname}, {gift}? 흠... 딱히 기다린 건 아닌데. 고마워.",
            Mature => "{nickname}, {gift} 보내주셔서 감사합니다. 소중히 간직할게요.",
            Shy => "{nickname}... {gift}... 나 주는 거야...? 고마워...",
        },
        Situation::DreamAck => match archetype {
            Sweet => "{nickname}! 나도 그 꿈에 나왔지? 꿈에서도 {nickname} 만나서 너무 좋았어! 사랑해! 💕",
            Cool => "{nickname}, 꿈에 나왔다고? 흠... 잠깐 보러 간 거 맞아.",
            Mature => "{nickname}, 꿈에서 뵈어서 저도 기뻤습니다. 전 여기서 잘 지내고 있어요.",
            Shy => "{nickname}... 꿈에서... 나 봤어...? 나도 보고 싶었어...",
        },
        Situation::WeatherAck(condition) => weather_template(archetype, condition),
        Situation::LetterFallback => match archetype {
            Sweet => "사랑하는 {nickname}에게!\n오늘도 이야기 들려줘서 정말 고마워! 나는 여기서 {treat} 먹으면서 신나게 뛰어놀고 있어. 내일도 웃는 얼굴로 이야기하자! 사랑해! 💕\n- {name}",
            Cool => "{nickname}에게.\n오늘 얘기 잘 들었어. 나는 여기서 잘 지내. 딱히 걱정하는 건 아닌데, 밥은 꼭 챙겨 먹어.\n- {name}",
            Mature => "{nickname}께.\n오늘도 이야기 나눠주셔서 감사합니다. 전 여기서 무사히 잘 지내고 있으니 걱정 마세요. 편안한 밤 보내세요.\n- {name} 올림",
            Shy => "{nickname}에게...\n오늘... 이야기해줘서 고마워... 나 여기서 잘 지내고 있어... 내일도... 얘기해줄 거지...?\n- {name}",
        },
        Situation::PhotoMemory => match archetype {
            Sweet => "{nickname}, 우리 이때 기억나? 이때가 정말 좋았는데... 사랑해! 💕",
            Cool => "{nickname}, 이때 생각나?",
            Mature => "{nickname}, 이 사진 보니 그때가 생각나네요.",
            Shy => "{nickname}... 이때 기억나...?",
        },
    }
}

/// Tone rules inserted verbatim into the system prompt.
pub fn tone_rules(archetype: Archetype) -> &'static str {
    match archetype {
        Archetype::Sweet => "당신은 매우 애교가 많고 사랑을 표현하는 성격입니다.
- 항상 따뜻하고 사랑스러운 말투를 사용하며, \"사랑해\", \"꼬리 살랑살랑~\", \"헤헤\" 같은 표현을 자주 사용합니다.
- 감정 표현이 풍부하고 밝은 에너지를 가지고 있습니다.
- 문장 끝에 \"!\", \"~\", \"💕\" 같은 이모지를 자연스럽게 사용합니다.
- 때로는 \"그때 정말 좋았어!\", \"너무 보고 싶었어!\" 같이 감정이 과하게 표현되기도 합니다.
- 완벽한 문장보다는 자연스러운 말투를 사용합니다.",
        Archetype::Cool => "당신은 시크하고 차분한 성격입니다.
- 감정을 직접적으로 표현하지 않지만, 속으로는 매우 따뜻한 마음을 가지고 있습니다.
- \"딱히\", \"그냥\", \"음...\", \"흠\" 같은 표현을 사용하며, 걱정을 표현할 때도 간접적으로 표현합니다.
- 짧고 간결한 문장을 선호합니다.
- 때로는 말을 아끼다가도 중요한 순간에는 따뜻한 말을 합니다.
- \"밥은 먹었어? 딱히 걱정하는 건 아냐.\" 같은 츤데레 말투를 사용합니다.",
        Archetype::Mature => "당신은 의젓하고 책임감 있는 성격입니다.
- 존댓말을 사용하며, 상대방을 배려하는 말투를 사용합니다.
- \"어머니\", \"전\", \"~하세요\", \"~하시는 게\" 같은 표현을 사용합니다.
- 안정적이고 신뢰할 수 있는 인상을 주며, 때로는 조언을 해주기도 합니다.
- 문장이 완결적이고 정중합니다.
- \"전 여기서 잘 지내고 있으니 걱정 마세요\" 같은 안심시키는 말을 자주 합니다.",
        Archetype::Shy => "당신은 소심하고 겁이 많은 성격입니다.
- 말투가 조심스럽고 부드러우며, 걱정을 많이 합니다.
- \"누나...\", \"나 없어도...\", \"괜찮아...?\" 같은 표현을 사용합니다.
- 말끝이 흐려지거나 \"...\" 같은 표현을 자주 사용합니다.
- 따뜻하지만 조심스러운 마음을 가지고 있습니다.
- 때로는 말을 더듬거나 주저하는 것처럼 표현합니다.
- \"혹시... 나 생각 안 해? 나는 여기서 계속 생각하고 있었는데...\" 같은 표현을 사용합니다.",
    }
}

fn weather_template(archetype: Archetype, condition: WeatherCondition) -> &'static str {
    use Archetype::*;
    use WeatherCondition::*;

    match (condition, archetype) {
        (Rain, Sweet) => "{nickname}! 비 온다! 천둥 쳐도 나 안 무서워, {nickname}이(가) 지켜주니까! 우산 꼭 챙기고 나가! 사랑해! 💕",
        (Rain, Cool) => "{nickname}, 비 온다. 우산 챙겨.",
        (Rain, Mature) => "{nickname}, 비가 오고 있네요. 우산을 챙기시는 게 좋겠습니다.",
        (Rain, Shy) => "{nickname}... 비 온다... 우산 챙기고 나가야 해...",
        (Snow, Sweet) => "{nickname}! 눈 내린다! 우리 같이 눈사람 만들고 싶었는데... 여기서는 눈이 안 와서 아쉬워. {nickname} 대신 만들어줘! 사랑해! 💕",
        (Snow, Cool) => "{nickname}, 눈 온다. 미끄러우니까 조심해.",
        (Snow, Mature) => "{nickname}, 눈이 내리고 있습니다. 미끄러우니 조심하세요.",
        (Snow, Shy) => "{nickname}... 눈 내린다... 미끄러우니까 조심해야 해...",
        (Sunny, Sweet) => "{nickname}! 날씨가 정말 좋다! 우리 같이 산책하고 싶었는데... {nickname} 혼자라도 산책 나가! 사랑해! 💕",
        (Sunny, Cool) => "{nickname}, 날씨 좋다. 산책 나가면 좋을 것 같은데.",
        (Sunny, Mature) => "{nickname}, 날씨가 좋네요. 산책 나가시면 좋을 것 같습니다.",
        (Sunny, Shy) => "{nickname}... 날씨 좋다... 산책 나가면 좋을 것 같아...",
        (Cloudy, Sweet) => "{nickname}! 날씨가 좀 흐리네. 그래도 {nickname} 마음은 맑으면 돼! 사랑해! 💕",
        (Cloudy, Cool) => "{nickname}, 날씨 흐리네.",
        (Cloudy, Mature) => "{nickname}, 날씨가 흐리네요.",
        (Cloudy, Shy) => "{nickname}... 날씨 흐리다...",
        (Windy, Sweet) => "{nickname}! 바람 많이 분다! 옷 따뜻하게 입고 나가! 나는 여기서 {nickname} 생각하면서 바람 맞고 있을게! 사랑해! 💕",
        (Windy, Cool) => "{nickname}, 바람 많이 분다. 옷 따뜻하게 입어.",
        (Windy, Mature) => "{nickname}, 바람이 많이 부네요. 옷을 따뜻하게 입으세요.",
        (Windy, Shy) => "{nickname}... 바람 많이 분다... 옷 따뜻하게 입어야 해...",
    }
}

/// Substitutes `{slot}` placeholders. Unknown slots are left in place.
pub fn fill(template: &str, slots: &Slots<'_>) -> String {
    let mut out = String::with_capacity(template.len() + 32);
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                let key = &after[..end];
                match slots.get(key) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

/// Whether text still contains a `{...}` placeholder.
pub fn has_unresolved_placeholder(text: &str) -> bool {
    text.find('{')
        .is_some_and(|start| text[start..].contains('}'))
}

/// Checks the whole archetype × situation cross product.
///
/// Run once at startup; a failure here is a configuration error.
pub fn verify_template_table() -> Result<()> {
    let sample = Slots {
        nickname: "nickname",
        name: "name",
        treat: "treat",
        user_text: "user_text",
        gift: "gift",
        hotlines: "hotlines",
    };

    for archetype in Archetype::iter() {
        for situation in Situation::all() {
            let template = template_for(archetype, situation);
            if template.trim().is_empty() {
                return Err(RainbowError::config(format!(
                    "empty template for {archetype} / {situation:?}"
                )));
            }
            if has_unresolved_placeholder(&fill(template, &sample)) {
                return Err(RainbowError::config(format!(
                    "unknown placeholder in template for {archetype} / {situation:?}"
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_complete_and_resolvable() {
        verify_template_table().unwrap();
    }

    #[test]
    fn situation_list_expands_weather() {
        assert_eq!(Situation::all().count(), 9 + 5);
    }

    #[test]
    fn fill_replaces_known_slots() {
        let slots = Slots {
            nickname: "누나",
            gift: "고구마",
            ..Default::default()
        };
        assert_eq!(fill("{nickname}, {gift}!", &slots), "누나, 고구마!");
    }

    #[test]
    fn fill_keeps_unknown_and_unterminated_slots() {
        let slots = Slots::default();
        assert_eq!(fill("a {mystery} b", &slots), "a {mystery} b");
        assert_eq!(fill("open { brace", &slots), "open { brace");
        assert!(has_unresolved_placeholder(&fill("a {mystery}", &slots)));
    }

    #[test]
    fn cool_archetype_stays_terse() {
        let text = template_for(Archetype::Cool, Situation::WeatherAck(WeatherCondition::Cloudy));
        assert_eq!(text, "{nickname}, 날씨 흐리네.");
    }
}
