//! Weather context for weather-aware greetings.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WeatherCondition {
    Rain,
    Snow,
    Sunny,
    Cloudy,
    Windy,
}

impl WeatherCondition {
    /// Korean sentence describing the current sky.
    pub fn description(self) -> &'static str {
        match self {
            WeatherCondition::Rain => "비가 오고 있습니다",
            WeatherCondition::Snow => "눈이 내리고 있습니다",
            WeatherCondition::Sunny => "날씨가 맑고 화창합니다",
            WeatherCondition::Cloudy => "날씨가 흐립니다",
            WeatherCondition::Windy => "바람이 많이 붑니다",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherContext {
    pub condition: WeatherCondition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_celsius: Option<f32>,
}

impl WeatherContext {
    pub fn new(condition: WeatherCondition) -> Self {
        Self {
            condition,
            temperature_celsius: None,
        }
    }

    pub fn with_temperature(mut self, celsius: f32) -> Self {
        self.temperature_celsius = Some(celsius);
        self
    }
}
