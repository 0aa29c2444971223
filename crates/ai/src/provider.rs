//! The seam between the gateway and a concrete model backend.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use futures::stream::{self, BoxStream};
use futures::StreamExt;

use crate::error::AiError;

/// Raw upstream output: text deltas in arrival order, or the fault that ended them.
pub type UpstreamStream = BoxStream<'static, Result<String, AiError>>;

/// A backend able to stream a completion for a single prompt.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Issues the upstream request and returns its delta stream.
    ///
    /// An `Err` here means the request could not be opened; nothing has been
    /// produced yet. Faults after that point arrive as `Err` items.
    async fn stream(&self, prompt: &str) -> Result<UpstreamStream, AiError>;
}

// ============================================================================
// Fake Provider for Testing
// ============================================================================

/// A scripted provider for tests that replays fixed fragments.
pub struct FakeCompletionProvider {
    /// Fragments yielded in order.
    pub fragments: Vec<String>,
    /// Error raised after all fragments, if any.
    pub fail_after: Option<String>,
    /// Error raised before the stream opens, if any.
    pub fail_to_open: Option<String>,
    calls: AtomicUsize,
}

impl FakeCompletionProvider {
    /// Create a fake provider that yields `fragments` and ends normally.
    pub fn with_fragments<S: AsRef<str>>(fragments: &[S]) -> Self {
        Self {
            fragments: fragments.iter().map(|f| f.as_ref().to_string()).collect(),
            fail_after: None,
            fail_to_open: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Create a fake provider that yields `fragments` and then fails.
    pub fn failing_after<S: AsRef<str>>(fragments: &[S], error: &str) -> Self {
        Self {
            fail_after: Some(error.to_string()),
            ..Self::with_fragments(fragments)
        }
    }

    /// Create a fake provider whose request cannot be opened.
    pub fn failing_to_open(error: &str) -> Self {
        Self {
            fail_to_open: Some(error.to_string()),
            ..Self::with_fragments::<&str>(&[])
        }
    }

    /// Number of times `stream` has been called.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionProvider for FakeCompletionProvider {
    async fn stream(&self, _prompt: &str) -> Result<UpstreamStream, AiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = &self.fail_to_open {
            return Err(AiError::provider(error.clone()));
        }

        let mut items: Vec<Result<String, AiError>> =
            self.fragments.iter().cloned().map(Ok).collect();
        if let Some(error) = &self.fail_after {
            items.push(Err(AiError::provider(error.clone())));
        }

        Ok(stream::iter(items).boxed())
    }
}
