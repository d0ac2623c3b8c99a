//! Generation settings attached to an outgoing request.
//!
//! ```rust
//! use amodel::GenerateConfig;
//!
//! let config = GenerateConfig::default()
//!     .with_temperature(0.2)
//!     .with_max_output_tokens(128)
//!     .with_system_instruction("Be concise.");
//!
//! assert_eq!(config.temperature, Some(0.2));
//! assert_eq!(config.max_output_tokens, Some(128));
//! assert_eq!(config.system_instruction_text(), Some("Be concise."));
//! ```

use serde::Serialize;

use crate::{Content, FunctionDeclaration, ModelError, Part, Role};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerateConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stop_sequences: Vec<String>,
    /// Declarations of every function tool registered on the owning request.
    /// Only the request's tool registration writes here.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) tools: Vec<FunctionDeclaration>,
}

impl GenerateConfig {
    pub fn tools(&self) -> &[FunctionDeclaration] {
        &self.tools
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }

    pub fn with_stop_sequence(mut self, stop_sequence: impl Into<String>) -> Self {
        self.stop_sequences.push(stop_sequence.into());
        self
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(Content::from_text(Role::System, instruction));
        self
    }

    /// Text of the first system instruction part.
    pub fn system_instruction_text(&self) -> Option<&str> {
        self.system_instruction
            .as_ref()
            .and_then(|content| content.parts.first())
            .and_then(|part| match part {
                Part::Text(text) => Some(text.as_str()),
                _ => None,
            })
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if let Some(max_output_tokens) = self.max_output_tokens
            && max_output_tokens == 0
        {
            return Err(ModelError::invalid_request(
                "max_output_tokens must be greater than zero",
            ));
        }

        if let Some(temperature) = self.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            return Err(ModelError::invalid_request(
                "temperature must be in the inclusive range 0.0..=2.0",
            ));
        }

        if let Some(top_p) = self.top_p
            && !(0.0..=1.0).contains(&top_p)
        {
            return Err(ModelError::invalid_request(
                "top_p must be in the inclusive range 0.0..=1.0",
            ));
        }

        Ok(())
    }
}
