//! Model backend contract.

use acommon::InvocationContext;

use crate::{LlmRequest, ResponseStream};

/// A generative model backend. This crate never inspects its internals.
pub trait Model: Send + Sync {
    fn name(&self) -> &str;

    /// Produces the turn for `request`. With `stream` unset the stream carries
    /// a single complete element; otherwise partial text deltas precede a
    /// final non-partial element.
    ///
    /// Implementations should stop producing once `ctx` is cancelled, e.g. via
    /// [`ResponseStream::with_cancellation`].
    fn generate_content<'a>(
        &'a self,
        ctx: &'a InvocationContext,
        request: &'a LlmRequest,
        stream: bool,
    ) -> ResponseStream<'a>;
}
