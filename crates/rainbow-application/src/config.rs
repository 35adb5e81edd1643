//! Tuning for conversation turns and companion features.

use rainbow_core::{RainbowError, Result};
use rainbow_interaction::GenerationOptions;
use std::time::Duration;

/// Token budgets of the one-shot companion features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompanionBudgets {
    pub gift: u32,
    pub dream: u32,
    pub weather: u32,
    pub letter: u32,
    pub photo_analysis: u32,
}

impl Default for CompanionBudgets {
    fn default() -> Self {
        Self {
            gift: 200,
            dream: 200,
            weather: 150,
            letter: 500,
            photo_analysis: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// Prior messages sent along with the current turn.
    pub history_window: usize,
    /// Chance that a generated reply gets a memory photo attached.
    pub embellish_probability: f64,
    pub generation_timeout: Duration,
    pub chat_max_tokens: u32,
    /// Budget when the user's turn carries a photo.
    pub photo_max_tokens: u32,
    pub temperature: f32,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
    pub budgets: CompanionBudgets,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_window: 10,
            embellish_probability: 0.1,
            generation_timeout: Duration::from_secs(30),
            chat_max_tokens: 200,
            photo_max_tokens: 250,
            temperature: 0.9,
            presence_penalty: 0.3,
            frequency_penalty: 0.3,
            budgets: CompanionBudgets::default(),
        }
    }
}

impl ChatConfig {
    pub fn validate(&self) -> Result<()> {
        if self.history_window == 0 {
            return Err(RainbowError::config("history_window must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.embellish_probability) {
            return Err(RainbowError::config(format!(
                "embellish_probability must be within [0, 1], got {}",
                self.embellish_probability
            )));
        }
        if self.generation_timeout.is_zero() {
            return Err(RainbowError::config("generation_timeout must be positive"));
        }
        Ok(())
    }

    pub fn options(&self, max_tokens: u32) -> GenerationOptions {
        GenerationOptions {
            max_tokens,
            temperature: self.temperature,
            presence_penalty: self.presence_penalty,
            frequency_penalty: self.frequency_penalty,
        }
    }

    pub fn with_embellish_probability(mut self, probability: f64) -> Self {
        self.embellish_probability = probability;
        self
    }

    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ChatConfig::default();
        config.validate().unwrap();
        assert_eq!(config.history_window, 10);
        assert_eq!(config.options(250).max_tokens, 250);
        assert_eq!(config.budgets.letter, 500);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let config = ChatConfig::default().with_embellish_probability(1.5);
        assert!(config.validate().unwrap_err().is_config());

        let config = ChatConfig {
            history_window: 0,
            ..ChatConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ChatConfig::default().with_generation_timeout(Duration::ZERO);
        assert!(config.validate().is_err());
    }
}
