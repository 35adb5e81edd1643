//! Canned response selection.

use crate::keepsake::GENERIC_GIFT_NAME;
use crate::persona::PetPersona;
use crate::safety::crisis_hotline_block;
use crate::template::{Situation, Slots, fill, template_for};

/// Situational facts for templates that need more than the persona.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseExtra<'a> {
    /// What the user just said (used by `Fallback`)
    pub user_text: &'a str,
    /// Display name of a gift (used by `GiftAck`)
    pub gift_name: &'a str,
}

impl<'a> ResponseExtra<'a> {
    pub fn user_text(text: &'a str) -> Self {
        Self {
            user_text: text,
            ..Default::default()
        }
    }

    pub fn gift(name: &'a str) -> Self {
        Self {
            gift_name: name,
            ..Default::default()
        }
    }
}

/// Renders the archetype's template for `situation` with persona facts filled in.
pub fn select_canned_response(
    persona: &PetPersona,
    situation: Situation,
    extra: ResponseExtra<'_>,
) -> String {
    let hotlines = match situation {
        Situation::DangerResponse => crisis_hotline_block(),
        _ => String::new(),
    };

    let slots = Slots {
        nickname: &persona.caller_nickname,
        name: &persona.name,
        treat: non_blank(&persona.favorite_treat, "간식"),
        user_text: non_blank(extra.user_text, "그 얘기"),
        gift: non_blank(extra.gift_name, GENERIC_GIFT_NAME),
        hotlines: &hotlines,
    };

    fill(template_for(persona.archetype, situation), &slots)
}

fn non_blank<'a>(value: &'a str, default: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() { default } else { trimmed }
}
