//! Shared error kinds for request assembly, tool execution, and model turns.
//!
//! ```rust
//! use amodel::{ToolError, ToolErrorKind};
//!
//! let timeout = ToolError::timeout("slow");
//! assert!(timeout.is_retryable());
//!
//! let cancelled = ToolError::cancelled("user interrupted");
//! assert_eq!(cancelled.kind, ToolErrorKind::Cancelled);
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

use aschema::{ConversionError, Document, FieldPath};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestErrorKind {
    UnnamedTool,
    DuplicateTool,
}

/// Registration failure raised while appending tools to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestError {
    pub kind: RequestErrorKind,
    /// Position of the offending tool in the appended batch.
    pub index: usize,
    pub tool_name: Option<String>,
    pub message: String,
}

impl RequestError {
    pub fn unnamed_tool(index: usize) -> Self {
        Self {
            kind: RequestErrorKind::UnnamedTool,
            index,
            tool_name: None,
            message: "tool without name".to_string(),
        }
    }

    pub fn duplicate_tool(index: usize, tool_name: impl Into<String>) -> Self {
        let tool_name = tool_name.into();
        Self {
            kind: RequestErrorKind::DuplicateTool,
            index,
            message: format!("duplicate tool: {tool_name:?}"),
            tool_name: Some(tool_name),
        }
    }
}

impl Display for RequestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} [tools[{}]]: {}", self.kind, self.index, self.message)
    }
}

impl Error for RequestError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolErrorKind {
    NotFound,
    InvalidArguments,
    InvalidOutput,
    Execution,
    Cancelled,
    Timeout,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolError {
    pub kind: ToolErrorKind,
    pub message: String,
    pub retryable: bool,
    pub path: Option<FieldPath>,
    pub tool_name: Option<String>,
    pub function_call_id: Option<String>,
}

impl ToolError {
    pub fn new(kind: ToolErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
            path: None,
            tool_name: None,
            function_call_id: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::NotFound, message, false)
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::InvalidArguments, message, false)
    }

    pub fn invalid_output(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::InvalidOutput, message, false)
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Execution, message, false)
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Cancelled, message, false)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Timeout, message, true)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Other, message, false)
    }

    /// Output-side conversion failure: the handler produced a value its schema rejects.
    pub fn from_output_conversion(error: ConversionError) -> Self {
        Self::invalid_output(error.to_string()).with_path(error.path)
    }

    pub fn with_path(mut self, path: FieldPath) -> Self {
        self.path = Some(path);
        self
    }

    pub fn with_tool_name(mut self, tool_name: impl Into<String>) -> Self {
        self.tool_name = Some(tool_name.into());
        self
    }

    pub fn with_function_call_id(mut self, function_call_id: impl Into<String>) -> Self {
        self.function_call_id = Some(function_call_id.into());
        self
    }

    pub fn is_retryable(&self) -> bool {
        self.retryable
    }

    pub fn is_user_error(&self) -> bool {
        matches!(
            self.kind,
            ToolErrorKind::InvalidArguments | ToolErrorKind::NotFound
        )
    }

    /// Failure document suitable for reporting the error back to the model.
    pub fn to_document(&self) -> Document {
        let mut document = Document::new();
        document.insert("error".to_string(), Value::String(self.to_string()));
        document
    }
}

impl Display for ToolError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match (&self.tool_name, &self.function_call_id) {
            (Some(tool_name), Some(function_call_id)) => write!(
                f,
                "{:?} [tool={}, call_id={}]: {}",
                self.kind, tool_name, function_call_id, self.message
            ),
            (Some(tool_name), None) => {
                write!(f, "{:?} [tool={}]: {}", self.kind, tool_name, self.message)
            }
            _ => write!(f, "{:?}: {}", self.kind, self.message),
        }
    }
}

impl Error for ToolError {}

/// Input-side conversion failure: the model sent arguments that do not fit the schema.
impl From<ConversionError> for ToolError {
    fn from(error: ConversionError) -> Self {
        ToolError::invalid_arguments(error.to_string()).with_path(error.path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelErrorKind {
    InvalidRequest,
    Backend,
    Cancelled,
    Other,
}

/// Error element of a response stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelError {
    pub kind: ModelErrorKind,
    pub code: Option<i32>,
    pub message: String,
}

impl ModelError {
    pub fn new(kind: ModelErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: None,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ModelErrorKind::InvalidRequest, message)
    }

    pub fn backend(code: i32, message: impl Into<String>) -> Self {
        Self::new(ModelErrorKind::Backend, message).with_code(code)
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(ModelErrorKind::Cancelled, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(ModelErrorKind::Other, message)
    }

    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }
}

impl Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.code {
            Some(code) => write!(f, "{:?} ({code}): {}", self.kind, self.message),
            None => write!(f, "{:?}: {}", self.kind, self.message),
        }
    }
}

impl Error for ModelError {}
