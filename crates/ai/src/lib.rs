//! Parley AI - streaming completions using rig-core.
//!
//! This crate adapts a hosted generative model into an incremental text
//! stream for the HTTP layer.
//!
//! # Architecture
//!
//! - `provider`: the `CompletionProvider` seam and a scripted fake for tests
//! - `gemini`: Gemini provider built on rig-core
//! - `gateway`: `CompletionGateway`, which folds upstream faults into an in-band marker
//! - `error`: `AiError`
//!
//! # Example
//!
//! ```ignore
//! use parley_ai::{CompletionGateway, GeminiProvider};
//!
//! let provider = GeminiProvider::new(&api_key, "gemini-1.5-flash")?;
//! let gateway = CompletionGateway::new(Arc::new(provider));
//!
//! let mut fragments = gateway.generate("Hello there").await?;
//! while let Some(fragment) = fragments.next().await {
//!     print!("{}", fragment);
//! }
//! ```

pub mod error;
pub mod gateway;
pub mod gemini;
pub mod provider;

pub use error::AiError;
pub use gateway::{stream_error_marker, CompletionGateway, FragmentStream};
pub use gemini::{GeminiProvider, DEFAULT_GEMINI_MODEL};
pub use provider::{CompletionProvider, FakeCompletionProvider, UpstreamStream};
