//! Generation parameters the user tunes before submitting a prompt.

use std::fmt;

pub const TEMPERATURE_MIN: f64 = 0.0;
pub const TEMPERATURE_MAX: f64 = 1.0;
pub const TEMPERATURE_STEP: f64 = 0.01;

pub const MAX_TOKENS_MIN: u32 = 64;
pub const MAX_TOKENS_MAX: u32 = 2048;
pub const MAX_TOKENS_STEP: u32 = 32;

pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Model {
    #[default]
    Gpt35,
    Gpt4,
    Mistral,
    Custom,
}

impl Model {
    pub fn as_str(&self) -> &'static str {
        match self {
            Model::Gpt35 => "gpt-3.5",
            Model::Gpt4 => "gpt-4",
            Model::Mistral => "mistral",
            Model::Custom => "custom",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "gpt-3.5" => Some(Model::Gpt35),
            "gpt-4" => Some(Model::Gpt4),
            "mistral" => Some(Model::Mistral),
            "custom" => Some(Model::Custom),
            _ => None,
        }
    }

    pub fn all() -> Vec<Model> {
        vec![Model::Gpt35, Model::Gpt4, Model::Mistral, Model::Custom]
    }

    pub fn next(&self) -> Model {
        let all = Self::all();
        let idx = all.iter().position(|m| m == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }

    pub fn prev(&self) -> Model {
        let all = Self::all();
        let idx = all.iter().position(|m| m == self).unwrap_or(0);
        all[(idx + all.len() - 1) % all.len()]
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot-able generation parameters. Every setter clamps, so a held value
/// is always in range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationConfig {
    model: Model,
    temperature: f64,
    max_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: Model::default(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl GenerationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(&self) -> Model {
        self.model
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn set_model(&mut self, model: Model) {
        self.model = model;
    }

    /// Clamps to [0, 1]. NaN falls back to the default.
    pub fn set_temperature(&mut self, temperature: f64) {
        if temperature.is_nan() {
            self.temperature = DEFAULT_TEMPERATURE;
            return;
        }
        self.temperature = temperature.clamp(TEMPERATURE_MIN, TEMPERATURE_MAX);
    }

    pub fn set_max_tokens(&mut self, max_tokens: u32) {
        self.max_tokens = max_tokens.clamp(MAX_TOKENS_MIN, MAX_TOKENS_MAX);
    }

    pub fn increase_temperature(&mut self) {
        self.set_temperature(snap_to_step(self.temperature + TEMPERATURE_STEP));
    }

    pub fn decrease_temperature(&mut self) {
        self.set_temperature(snap_to_step(self.temperature - TEMPERATURE_STEP));
    }

    pub fn increase_max_tokens(&mut self) {
        self.set_max_tokens(self.max_tokens.saturating_add(MAX_TOKENS_STEP));
    }

    pub fn decrease_max_tokens(&mut self) {
        self.set_max_tokens(self.max_tokens.saturating_sub(MAX_TOKENS_STEP));
    }
}

// Keeps repeated float steps on the 0.01 grid.
fn snap_to_step(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
