//! Completion gateway.
//!
//! Turns a provider's fallible delta stream into an infallible fragment
//! stream. A fault after the stream opened never truncates silently: the
//! gateway emits a visible marker as the last fragment and ends normally, so
//! an HTTP response already in flight can complete.

use std::sync::Arc;

use futures::stream::{self, BoxStream};
use futures::StreamExt;
use log::{debug, warn};

use crate::error::AiError;
use crate::provider::{CompletionProvider, UpstreamStream};

/// Fragments in arrival order; finite and not restartable.
pub type FragmentStream = BoxStream<'static, String>;

/// In-band marker appended when the upstream stream fails mid-flight.
pub fn stream_error_marker(message: &str) -> String {
    format!("\n[Stream error: {}]", message)
}

/// Wraps a `CompletionProvider` behind a streaming text interface.
#[derive(Clone)]
pub struct CompletionGateway {
    provider: Arc<dyn CompletionProvider>,
}

impl CompletionGateway {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    /// Starts the upstream request for `prompt` and returns its fragments.
    ///
    /// Callers are expected to pass a non-blank prompt. Returns an error only
    /// if the upstream request could not be opened.
    pub async fn generate(&self, prompt: &str) -> Result<FragmentStream, AiError> {
        debug!("Opening completion stream ({} chars of prompt)", prompt.len());
        let upstream = self.provider.stream(prompt).await?;
        Ok(fold_faults_in_band(upstream))
    }
}

/// Skips empty deltas and replaces the first upstream error with a marker.
fn fold_faults_in_band(upstream: UpstreamStream) -> FragmentStream {
    stream::unfold(Some(upstream), |state| async move {
        let mut upstream = state?;
        loop {
            match upstream.next().await {
                Some(Ok(fragment)) if fragment.is_empty() => continue,
                Some(Ok(fragment)) => return Some((fragment, Some(upstream))),
                Some(Err(e)) => {
                    warn!("Upstream stream failed: {}", e);
                    return Some((stream_error_marker(&e.to_string()), None));
                }
                None => return None,
            }
        }
    })
    .boxed()
}
