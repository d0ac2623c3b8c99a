//! Observability hooks for tool dispatch: structured logs, metrics, and panic isolation.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use aobserve::{FanoutToolHooks, MetricsObservabilityHooks, SafeToolHooks, TracingObservabilityHooks};
//! use atooling::DefaultToolRuntime;
//!
//! let hooks = FanoutToolHooks::new()
//!     .with(TracingObservabilityHooks)
//!     .with(MetricsObservabilityHooks);
//! let _runtime = DefaultToolRuntime::new().with_hooks(Arc::new(SafeToolHooks::new(hooks)));
//! ```

mod metrics_hooks;
mod safe_hooks;
mod tracing_hooks;

pub use metrics_hooks::MetricsObservabilityHooks;
pub use safe_hooks::{FanoutToolHooks, SafeToolHooks};
pub use tracing_hooks::TracingObservabilityHooks;

pub mod prelude {
    pub use crate::{
        FanoutToolHooks, MetricsObservabilityHooks, SafeToolHooks, TracingObservabilityHooks,
    };
}
