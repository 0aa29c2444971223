//! Gemini provider built on rig-core.

use async_trait::async_trait;
use futures::stream;
use futures::StreamExt;
use log::{debug, error};
use reqwest::Client as HttpClient;
use rig::{
    agent::MultiTurnStreamItem,
    client::CompletionClient,
    completion::Message,
    message::{Text, UserContent},
    providers::gemini,
    streaming::{StreamedAssistantContent, StreamingChat},
    OneOrMany,
};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::error::AiError;
use crate::provider::{CompletionProvider, UpstreamStream};

/// Model used when none is configured.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

const PROVIDER_ID: &str = "gemini";

/// Streams completions from Google's Gemini API.
pub struct GeminiProvider {
    client: gemini::Client<HttpClient>,
    model_id: String,
}

impl GeminiProvider {
    pub fn new(api_key: &str, model_id: impl Into<String>) -> Result<Self, AiError> {
        let key = api_key.trim();
        if key.is_empty() {
            return Err(AiError::MissingApiKey(PROVIDER_ID.to_string()));
        }
        let client = gemini::Client::new(key).map_err(|e| AiError::Provider(e.to_string()))?;
        Ok(Self {
            client,
            model_id: model_id.into(),
        })
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    async fn stream(&self, prompt: &str) -> Result<UpstreamStream, AiError> {
        debug!("Starting Gemini stream: model={}", self.model_id);

        let agent = self.client.agent(&self.model_id).build();
        let prompt = Message::User {
            content: OneOrMany::one(UserContent::Text(Text {
                text: prompt.to_string(),
            })),
        };

        let (tx, mut rx) = mpsc::channel::<Result<String, AiError>>(64);

        tokio::spawn(async move {
            let mut stream = agent.stream_chat(prompt, Vec::new()).multi_turn(1).await;
            let mut produced_text = false;
            let mut opened = false;

            while let Some(chunk) = stream.next().await {
                // Any upstream item means the request was accepted. Announce it
                // with an empty fragment so a later fault is reported in-band.
                if chunk.is_ok() && !opened {
                    opened = true;
                    if tx.send(Ok(String::new())).await.is_err() {
                        break;
                    }
                }

                let item = match chunk {
                    Ok(MultiTurnStreamItem::StreamAssistantItem(
                        StreamedAssistantContent::Text(Text { text }),
                    )) => {
                        if text.is_empty() {
                            continue;
                        }
                        produced_text = true;
                        Ok(text)
                    }
                    // Some responses arrive only as the aggregated final payload.
                    Ok(MultiTurnStreamItem::FinalResponse(final_response)) => {
                        let text = final_response.response().to_string();
                        if produced_text || text.is_empty() {
                            continue;
                        }
                        produced_text = true;
                        Ok(text)
                    }
                    Ok(_) => continue,
                    Err(e) => {
                        error!("Gemini stream error: {}", e);
                        Err(AiError::Provider(e.to_string()))
                    }
                };

                let is_err = item.is_err();
                if tx.send(item).await.is_err() || is_err {
                    break;
                }
            }
        });

        // Wait for the first item so a request that cannot be opened is
        // reported before any fragment is handed out. Only a fault that
        // arrives before any upstream item counts as an open failure.
        match rx.recv().await {
            Some(Err(e)) => Err(e),
            first => {
                let head = stream::iter(first);
                Ok(head.chain(ReceiverStream::new(rx)).boxed())
            }
        }
    }
}
