//! Response elements and the single-pass stream a model returns for one turn.
//!
//! ```rust
//! use amodel::{LlmResponse, ResponseStream};
//!
//! let stream = ResponseStream::from_responses(vec![
//!     Ok(LlmResponse::text_delta("Hel")),
//!     Ok(LlmResponse::text_delta("lo")),
//!     Ok(LlmResponse::text("Hello").with_turn_complete()),
//! ]);
//! assert!(!stream.is_finished());
//! assert!(LlmResponse::text("Hello").with_turn_complete().is_terminal());
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use acommon::{BoxFuture, CancellationToken};
use futures_core::{FusedStream, Stream};
use serde::Serialize;

use crate::{Content, ModelError, Role};

/// One element of a model turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LlmResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    /// Incremental plain-text delta rather than a complete unit.
    #[serde(skip_serializing_if = "is_false")]
    pub partial: bool,
    /// End of this generation turn.
    #[serde(skip_serializing_if = "is_false")]
    pub turn_complete: bool,
    /// Generation was cancelled externally, e.g. by the user mid-stream.
    #[serde(skip_serializing_if = "is_false")]
    pub interrupted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl LlmResponse {
    pub fn from_content(content: Content) -> Self {
        Self {
            content: Some(content),
            ..Self::default()
        }
    }

    /// Complete model text.
    pub fn text(text: impl Into<String>) -> Self {
        Self::from_content(Content::from_text(Role::Model, text))
    }

    /// Partial plain-text delta.
    pub fn text_delta(text: impl Into<String>) -> Self {
        Self {
            partial: true,
            ..Self::text(text)
        }
    }

    pub fn with_turn_complete(mut self) -> Self {
        self.turn_complete = true;
        self.partial = false;
        self
    }

    pub fn with_interrupted(mut self) -> Self {
        self.interrupted = true;
        self
    }

    pub fn with_error(mut self, code: i32, message: impl Into<String>) -> Self {
        self.error_code = Some(code);
        self.error_message = Some(message.into());
        self
    }

    /// Whether no element may follow this one in its stream.
    pub fn is_terminal(&self) -> bool {
        self.turn_complete || self.interrupted || self.error_code.is_some()
    }
}

impl Display for LlmResponse {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let rendered = serde_json::to_string_pretty(self).map_err(|_| std::fmt::Error)?;
        f.write_str(&rendered)
    }
}

type Element = Result<LlmResponse, ModelError>;

/// Single-pass, ordered stream of one model turn.
///
/// Invariants for consumers:
/// - Elements are yielded in production order and cannot be replayed.
/// - An element that is an error, interrupted, or turn-complete is the last one;
///   the stream ends after it even if the producer has more.
/// - Once cancelled, the stream yields one `Cancelled` error and then ends.
/// - A partial element carrying anything but plain text is replaced by an
///   error, which ends the stream.
pub struct ResponseStream<'a> {
    inner: Pin<Box<dyn Stream<Item = Element> + Send + 'a>>,
    cancelled: Option<BoxFuture<'static, ()>>,
    finished: bool,
}

impl<'a> ResponseStream<'a> {
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = Element> + Send + 'a,
    {
        Self {
            inner: Box::pin(stream),
            cancelled: None,
            finished: false,
        }
    }

    /// Stops the stream once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancelled = Some(token.cancelled_owned());
        self
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl ResponseStream<'static> {
    /// In-memory stream for single-shot backends and tests.
    pub fn from_responses(elements: Vec<Element>) -> Self {
        Self::new(futures_util::stream::iter(elements))
    }

    /// Single-shot turn: one complete element.
    pub fn single(response: LlmResponse) -> Self {
        Self::from_responses(vec![Ok(response)])
    }
}

impl Stream for ResponseStream<'_> {
    type Item = Element;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Element>> {
        let this = &mut *self;
        if this.finished {
            return Poll::Ready(None);
        }

        if let Some(cancelled) = this.cancelled.as_mut()
            && cancelled.as_mut().poll(cx).is_ready()
        {
            this.finished = true;
            return Poll::Ready(Some(Err(ModelError::cancelled("turn was cancelled"))));
        }

        match this.inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(Ok(response))) if !is_valid_delta(&response) => {
                this.finished = true;
                Poll::Ready(Some(Err(ModelError::other(
                    "partial response elements may carry plain text only",
                ))))
            }
            Poll::Ready(Some(element)) => {
                let terminal = match &element {
                    Ok(response) => response.is_terminal(),
                    Err(_) => true,
                };
                this.finished = terminal;
                Poll::Ready(Some(element))
            }
            Poll::Ready(None) => {
                this.finished = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

fn is_valid_delta(response: &LlmResponse) -> bool {
    !response.partial || response.content.as_ref().is_none_or(Content::is_text_only)
}

impl FusedStream for ResponseStream<'_> {
    fn is_terminated(&self) -> bool {
        self.finished
    }
}
