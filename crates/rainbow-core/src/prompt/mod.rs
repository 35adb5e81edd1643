//! Prompt composition: the persona system prompt and the per-feature
//! user prompts that ride on top of it.

mod situational;
mod system;

pub use situational::{
    PHOTO_ANALYSIS_PROMPT, PHOTO_ONLY_HISTORY_MARKER, dream_prompt, gift_prompt, letter_prompt,
    photo_turn_prompt, weather_prompt,
};
pub use system::build_system_prompt;
