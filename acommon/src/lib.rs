//! Shared utilities and strongly-typed common values for workspace crates.
//!
//! ```rust
//! use acommon::{InvocationContext, MetadataMap, SessionId};
//!
//! let session = SessionId::from("session-1");
//! let ctx = InvocationContext::new(session.clone(), "inv-1").with_metadata("tenant", "acme");
//!
//! assert_eq!(ctx.session_id, session);
//! assert_eq!(ctx.invocation_id.as_str(), "inv-1");
//! assert!(!ctx.is_cancelled());
//! ```

pub mod future {
    //! Shared async future aliases.
    //!
    //! ```rust
    //! use acommon::BoxFuture;
    //!
    //! fn str_len<'a>(value: &'a str) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { value.len() })
    //! }
    //!
    //! let _future = str_len("hello");
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod cancel {
    //! Cooperative cancellation shared between an orchestrator and the work it drives.
    //!
    //! ```rust
    //! use acommon::CancellationToken;
    //!
    //! let token = CancellationToken::new();
    //! let observer = token.clone();
    //! token.cancel();
    //! assert!(observer.is_cancelled());
    //! ```

    use std::fmt::{Debug, Formatter};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use tokio::sync::Notify;

    use crate::BoxFuture;

    #[derive(Default)]
    struct Inner {
        cancelled: AtomicBool,
        notify: Notify,
    }

    /// Clones observe the same cancellation state.
    #[derive(Clone, Default)]
    pub struct CancellationToken {
        inner: Arc<Inner>,
    }

    impl CancellationToken {
        pub fn new() -> Self {
            Self::default()
        }

        /// Idempotent. Wakes every pending [`CancellationToken::cancelled`] future.
        pub fn cancel(&self) {
            if !self.inner.cancelled.swap(true, Ordering::SeqCst) {
                self.inner.notify.notify_waiters();
            }
        }

        pub fn is_cancelled(&self) -> bool {
            self.inner.cancelled.load(Ordering::SeqCst)
        }

        /// Resolves once the token is cancelled; immediately if it already is.
        pub async fn cancelled(&self) {
            loop {
                // Register interest before checking the flag so a concurrent
                // `cancel` cannot slip between the check and the await.
                let notified = self.inner.notify.notified();
                if self.is_cancelled() {
                    return;
                }
                notified.await;
            }
        }

        /// Owned variant of [`CancellationToken::cancelled`] for storing in long-lived state.
        pub fn cancelled_owned(self) -> BoxFuture<'static, ()> {
            Box::pin(async move { self.cancelled().await })
        }
    }

    impl Debug for CancellationToken {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("CancellationToken")
                .field("cancelled", &self.is_cancelled())
                .finish()
        }
    }
}

pub mod context {
    //! Shared metadata, identifier newtypes, and the per-invocation context.
    //!
    //! ```rust
    //! use acommon::{InvocationId, MetadataMap, SessionId};
    //!
    //! let session = SessionId::new("session-42");
    //! let invocation = InvocationId::from("inv-42");
    //! let mut metadata = MetadataMap::new();
    //! metadata.insert("env".to_string(), "test".to_string());
    //!
    //! assert_eq!(session.to_string(), "session-42");
    //! assert_eq!(invocation.as_str(), "inv-42");
    //! ```

    use std::collections::HashMap;
    use std::fmt::{Display, Formatter};

    use crate::CancellationToken;

    pub type MetadataMap = HashMap<String, String>;

    macro_rules! string_id {
        ($name:ident) => {
            #[derive(Debug, Clone, PartialEq, Eq, Hash)]
            pub struct $name(String);

            impl $name {
                pub fn new(value: impl Into<String>) -> Self {
                    Self(value.into())
                }

                pub fn as_str(&self) -> &str {
                    self.0.as_str()
                }
            }

            impl Display for $name {
                fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl From<String> for $name {
                fn from(value: String) -> Self {
                    Self(value)
                }
            }

            impl From<&str> for $name {
                fn from(value: &str) -> Self {
                    Self(value.to_string())
                }
            }
        };
    }

    string_id!(SessionId);
    string_id!(InvocationId);

    /// Context threaded through request processing, tool runs, and model calls
    /// for one invocation of an agent.
    #[derive(Debug, Clone)]
    pub struct InvocationContext {
        pub session_id: SessionId,
        pub invocation_id: InvocationId,
        pub metadata: MetadataMap,
        cancellation: CancellationToken,
    }

    impl InvocationContext {
        pub fn new(session_id: impl Into<SessionId>, invocation_id: impl Into<InvocationId>) -> Self {
            Self {
                session_id: session_id.into(),
                invocation_id: invocation_id.into(),
                metadata: MetadataMap::new(),
                cancellation: CancellationToken::new(),
            }
        }

        pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
            self.metadata.insert(key.into(), value.into());
            self
        }

        /// Replaces the cancellation token, e.g. to share one token across several invocations.
        pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
            self.cancellation = cancellation;
            self
        }

        pub fn cancellation(&self) -> &CancellationToken {
            &self.cancellation
        }

        pub fn cancel(&self) {
            self.cancellation.cancel();
        }

        pub fn is_cancelled(&self) -> bool {
            self.cancellation.is_cancelled()
        }

        pub async fn cancelled(&self) {
            self.cancellation.cancelled().await;
        }
    }
}

pub mod registry {
    //! Generic registry map wrapper used by request-scoped registries.
    //!
    //! ```rust
    //! use acommon::Registry;
    //!
    //! let mut registry = Registry::new();
    //! registry.insert("alpha".to_string(), 1_u32);
    //!
    //! assert_eq!(registry.get("alpha"), Some(&1));
    //! assert!(registry.contains_key("alpha"));
    //! ```

    use std::borrow::Borrow;
    use std::collections::HashMap;
    use std::hash::Hash;

    #[derive(Debug, Clone)]
    pub struct Registry<K, V> {
        items: HashMap<K, V>,
    }

    impl<K, V> Default for Registry<K, V>
    where
        K: Eq + Hash,
    {
        fn default() -> Self {
            Self {
                items: HashMap::new(),
            }
        }
    }

    impl<K, V> Registry<K, V>
    where
        K: Eq + Hash,
    {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn insert(&mut self, key: K, value: V) -> Option<V> {
            self.items.insert(key, value)
        }

        pub fn get<Q>(&self, key: &Q) -> Option<&V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.get(key)
        }

        pub fn contains_key<Q>(&self, key: &Q) -> bool
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.contains_key(key)
        }

        pub fn keys(&self) -> impl Iterator<Item = &K> {
            self.items.keys()
        }

        pub fn values(&self) -> impl Iterator<Item = &V> {
            self.items.values()
        }

        pub fn len(&self) -> usize {
            self.items.len()
        }

        pub fn is_empty(&self) -> bool {
            self.items.is_empty()
        }
    }
}

pub use cancel::CancellationToken;
pub use context::{InvocationContext, InvocationId, MetadataMap, SessionId};
pub use future::BoxFuture;
pub use registry::Registry;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{CancellationToken, InvocationContext, InvocationId, Registry, SessionId};

    #[test]
    fn id_newtypes_round_trip_strings() {
        let session = SessionId::new("session-1");
        let invocation = InvocationId::from("inv-1");

        assert_eq!(session.as_str(), "session-1");
        assert_eq!(invocation.as_str(), "inv-1");
        assert_eq!(session.to_string(), "session-1");
        assert_eq!(invocation.to_string(), "inv-1");
    }

    #[test]
    fn generic_registry_basic_lifecycle() {
        let mut registry = Registry::new();
        assert!(registry.is_empty());

        registry.insert("alpha".to_string(), 1_u32);
        assert_eq!(registry.get("alpha"), Some(&1));
        assert!(registry.contains_key("alpha"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.keys().collect::<Vec<_>>(), vec!["alpha"]);
    }

    #[test]
    fn cloned_contexts_share_cancellation() {
        let ctx = InvocationContext::new("session-1", "inv-1");
        let clone = ctx.clone();

        clone.cancel();
        clone.cancel();

        assert!(ctx.is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_future_wakes_pending_waiter() {
        let token = CancellationToken::new();
        let waiter = tokio::spawn(token.clone().cancelled_owned());

        tokio::time::sleep(Duration::from_millis(10)).await;
        token.cancel();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake")
            .expect("waiter task should not panic");
    }

    #[tokio::test]
    async fn cancelled_future_resolves_immediately_when_already_cancelled() {
        let token = CancellationToken::new();
        token.cancel();
        token.cancelled().await;
    }
}
