use super::CompanionGenerator;
use crate::config::ChatConfig;
use crate::random::RandomSource;
use async_trait::async_trait;
use rainbow_core::Result;
use rainbow_core::persona::PetPersona;
use rainbow_core::prompt::weather_prompt;
use rainbow_core::response::{ResponseExtra, select_canned_response};
use rainbow_core::template::Situation;
use rainbow_core::weather::{WeatherCondition, WeatherContext};
use rainbow_interaction::TextGenerator;
use std::sync::Arc;
use strum::IntoEnumIterator;

/// Where today's weather comes from.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn current(&self) -> Result<WeatherContext>;
}

/// Demo source: a random condition and a temperature between 5 and 34 °C.
pub struct RandomWeather {
    random: Arc<dyn RandomSource>,
}

impl RandomWeather {
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self { random }
    }
}

#[async_trait]
impl WeatherSource for RandomWeather {
    async fn current(&self) -> Result<WeatherContext> {
        let conditions: Vec<WeatherCondition> = WeatherCondition::iter().collect();
        let condition = conditions[self.random.next_index(conditions.len())];
        let celsius = 5 + self.random.next_index(30) as i32;
        Ok(WeatherContext::new(condition).with_temperature(celsius as f32))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherMessage {
    pub weather: WeatherContext,
    pub text: String,
    pub generated: bool,
}

/// A short weather-themed greeting from the pet.
pub struct WeatherService {
    generator: CompanionGenerator,
    source: Arc<dyn WeatherSource>,
}

impl WeatherService {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        source: Arc<dyn WeatherSource>,
        config: ChatConfig,
    ) -> Self {
        Self {
            generator: CompanionGenerator::new(generator, config),
            source,
        }
    }

    pub async fn weather_message(&self, persona: &PetPersona) -> Result<WeatherMessage> {
        let weather = self.source.current().await?;
        self.message_for(persona, weather).await
    }

    pub async fn message_for(
        &self,
        persona: &PetPersona,
        weather: WeatherContext,
    ) -> Result<WeatherMessage> {
        let budget = self.generator.config().budgets.weather;
        let request = self
            .generator
            .in_character(persona, weather_prompt(persona, &weather), budget);

        let (text, generated) = match self.generator.try_generate("weather", request).await {
            Some(text) => (text, true),
            None => (
                select_canned_response(
                    persona,
                    Situation::WeatherAck(weather.condition),
                    ResponseExtra::default(),
                ),
                false,
            ),
        };

        Ok(WeatherMessage {
            weather,
            text,
            generated,
        })
    }
}
