//! Typed function tools and the runtime that dispatches model function calls.

mod function;
mod hooks;
mod runtime;

pub mod prelude {
    pub use crate::{
        DefaultToolRuntime, FunctionTool, FunctionToolConfig, NoopToolRuntimeHooks, RunPolicy,
        ToolRuntime, ToolRuntimeHooks, failure_response,
    };
}

pub use function::{FunctionTool, FunctionToolConfig};
pub use hooks::{NoopToolRuntimeHooks, ToolRuntimeHooks};
pub use runtime::{DefaultToolRuntime, RunPolicy, ToolRuntime, failure_response};
