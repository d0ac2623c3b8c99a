//! Small convenience constructors for conversation content.

use crate::{Content, Document, FunctionCall, Part, Role};

pub fn system_content(text: impl Into<String>) -> Content {
    Content::from_text(Role::System, text)
}

pub fn user_content(text: impl Into<String>) -> Content {
    Content::from_text(Role::User, text)
}

pub fn model_content(text: impl Into<String>) -> Content {
    Content::from_text(Role::Model, text)
}

/// Model content carrying a single function call with an id.
pub fn function_call_content(
    id: impl Into<String>,
    name: impl Into<String>,
    args: Document,
) -> Content {
    Content::new(
        Role::Model,
        vec![Part::FunctionCall(FunctionCall::new(name, args).with_id(id))],
    )
}
