//! Per-turn request assembly: instructions, generation settings, and the tool registry.
//!
//! ```rust
//! use amodel::LlmRequest;
//!
//! let mut request = LlmRequest::new("model-a");
//! request.append_instructions(["You are concise."]);
//! request.append_instructions(["Answer in English."]);
//!
//! assert_eq!(
//!     request.system_instruction_text(),
//!     Some("You are concise.\n\nAnswer in English.")
//! );
//! ```

use std::collections::HashSet;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

use acommon::Registry;
use serde::Serialize;

use crate::{Content, GenerateConfig, ModelError, RequestError, Role, Tool};

const INSTRUCTION_SEPARATOR: &str = "\n\n";

/// Input to [`Model::generate_content`](crate::Model::generate_content) for one turn.
///
/// Owned and mutated by a single caller while it is assembled.
#[derive(Clone, Default, Serialize)]
pub struct LlmRequest {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub model: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contents: Vec<Content>,
    config: GenerateConfig,
    #[serde(skip)]
    tools: Registry<String, Arc<dyn Tool>>,
}

impl LlmRequest {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    pub fn with_contents(mut self, contents: Vec<Content>) -> Self {
        self.contents = contents;
        self
    }

    pub fn with_content(mut self, content: Content) -> Self {
        self.contents.push(content);
        self
    }

    /// Replaces the generation settings. Declarations already contributed by
    /// registered tools are carried over into the new config.
    pub fn with_config(mut self, config: GenerateConfig) -> Self {
        self.set_config(config);
        self
    }

    /// In-place variant of [`LlmRequest::with_config`].
    pub fn set_config(&mut self, config: GenerateConfig) {
        let declarations = std::mem::take(&mut self.config.tools);
        self.config = config;
        self.config.tools = declarations;
    }

    /// Generation settings, including one declaration per declared registered tool.
    pub fn config(&self) -> &GenerateConfig {
        &self.config
    }

    /// Appends `instructions`, joined by a blank line, to the system instruction.
    ///
    /// Appending nothing leaves the request untouched.
    pub fn append_instructions<I, S>(&mut self, instructions: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let instructions: Vec<S> = instructions.into_iter().collect();
        if instructions.is_empty() {
            return;
        }

        let appended = instructions
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<&str>>()
            .join(INSTRUCTION_SEPARATOR);

        let text = match self.system_instruction_text() {
            Some(current) if !current.is_empty() => {
                format!("{current}{INSTRUCTION_SEPARATOR}{appended}")
            }
            _ => appended,
        };

        self.config.system_instruction = Some(Content::from_text(Role::System, text));
    }

    /// Registers `tools` and declares each one that offers a declaration.
    ///
    /// The batch is validated before anything is mutated: an unnamed tool, or a
    /// name already registered or repeated within the batch, rejects the whole
    /// batch and leaves the registry and declarations unchanged.
    pub fn append_tools<I>(&mut self, tools: I) -> Result<(), RequestError>
    where
        I: IntoIterator<Item = Arc<dyn Tool>>,
    {
        let tools: Vec<Arc<dyn Tool>> = tools.into_iter().collect();
        self.check_batch(&tools)?;

        for tool in tools {
            if let Some(declaration) = tool.declaration() {
                self.config.tools.push(declaration);
            }
            self.tools.insert(tool.name().to_string(), tool);
        }

        Ok(())
    }

    fn check_batch(&self, tools: &[Arc<dyn Tool>]) -> Result<(), RequestError> {
        let mut incoming = HashSet::with_capacity(tools.len());
        for (index, tool) in tools.iter().enumerate() {
            let name = tool.name();
            if name.is_empty() {
                return Err(RequestError::unnamed_tool(index));
            }
            if self.tools.contains_key(name) || !incoming.insert(name) {
                return Err(RequestError::duplicate_tool(index, name));
            }
        }
        Ok(())
    }

    pub fn tool(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn tool_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    pub fn system_instruction_text(&self) -> Option<&str> {
        self.config.system_instruction_text()
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.model.trim().is_empty() {
            return Err(ModelError::invalid_request("model must not be empty"));
        }

        self.config.validate()
    }
}

impl Debug for LlmRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmRequest")
            .field("model", &self.model)
            .field("contents", &self.contents)
            .field("config", &self.config)
            .field("tools", &self.tool_names())
            .finish()
    }
}

impl Display for LlmRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let rendered = serde_json::to_string_pretty(self).map_err(|_| std::fmt::Error)?;
        f.write_str(&rendered)
    }
}
