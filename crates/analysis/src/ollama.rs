use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use aspector_core::config::OllamaConfig;
use aspector_core::constants::{OLLAMA_HEALTH_TIMEOUT, RETRY_BACKOFF_MS};
use aspector_core::{AspectSentiment, Sentiment};

use crate::analyzer::AspectAnalyzer;
use crate::error::{AnalysisError, AnalysisResult};

static JSON_BLOCK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("valid JSON block pattern"));

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f64,
}

/// Request body for Ollama's `/api/chat` endpoint.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    format: String,
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

/// Shape the model is instructed to answer with.
#[derive(Debug, Deserialize)]
struct ModelReply {
    aspects: Vec<ReplyRecord>,
}

#[derive(Debug, Deserialize)]
struct ReplyRecord {
    aspect: String,
    sentiment: String,
    #[serde(default = "default_confidence")]
    confidence: f64,
}

fn default_confidence() -> f64 {
    1.0
}

/// Analyzer delegating to a model served by a local Ollama instance.
///
/// Construction checks that the server is reachable and fails with
/// [`AnalysisError::Unavailable`] when it cannot be reached. Per-request
/// failures are retried with exponential backoff and degrade to an empty
/// result instead of an error, so batch evaluations keep running when the
/// model hiccups.
pub struct OllamaAnalyzer {
    config: OllamaConfig,
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
    name_str: String,
}

impl OllamaAnalyzer {
    /// Creates the analyzer and verifies the configured server is up.
    pub fn new(config: OllamaConfig) -> AnalysisResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AnalysisError::Config(e.to_string()))?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| AnalysisError::Config(e.to_string()))?;

        let analyzer = Self {
            config,
            client,
            runtime,
            name_str: "ollama".to_string(),
        };
        analyzer.check_server()?;

        Ok(analyzer)
    }

    fn check_server(&self) -> AnalysisResult<()> {
        let url = format!("{}/api/tags", self.config.host.trim_end_matches('/'));
        let request = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(OLLAMA_HEALTH_TIMEOUT));

        let response = self
            .runtime
            .block_on(request.send())
            .map_err(|e| {
                AnalysisError::Unavailable(format!(
                    "Ollama server at {} is unreachable: {}",
                    self.config.host, e
                ))
            })?;

        if !response.status().is_success() {
            return Err(AnalysisError::Unavailable(format!(
                "Ollama server at {} answered {}",
                self.config.host,
                response.status()
            )));
        }

        debug!("Ollama server at {} is reachable", self.config.host);
        Ok(())
    }

    async fn chat(&self, prompt: &str) -> Result<ChatResponse, reqwest::Error> {
        let url = format!("{}/api/chat", self.config.host.trim_end_matches('/'));
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            format: "json".to_string(),
            stream: false,
            options: ChatOptions {
                temperature: self.config.temperature,
            },
        };

        self.client
            .post(&url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<ChatResponse>()
            .await
    }

    fn chat_with_retries(&self, prompt: &str) -> Option<String> {
        self.runtime.block_on(async {
            for attempt in 0..=self.config.max_retries {
                if attempt > 0 {
                    let delay = RETRY_BACKOFF_MS * (1 << (attempt - 1));
                    debug!("Retrying Ollama request in {} ms", delay);
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }

                match self.chat(prompt).await {
                    Ok(response) => return Some(response.message.content),
                    Err(e) => {
                        warn!("Ollama request failed (attempt {}): {}", attempt + 1, e);
                    }
                }
            }
            None
        })
    }
}

impl AspectAnalyzer for OllamaAnalyzer {
    fn name(&self) -> &str {
        &self.name_str
    }

    fn analyze(&mut self, text: &str) -> AnalysisResult<Vec<AspectSentiment>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let prompt = build_prompt(text);
        match self.chat_with_retries(&prompt) {
            Some(content) => Ok(parse_model_reply(&content)),
            None => {
                warn!(
                    "Giving up on Ollama after {} attempts, returning no aspects",
                    self.config.max_retries + 1
                );
                Ok(Vec::new())
            }
        }
    }
}

fn build_prompt(text: &str) -> String {
    format!(
        "Extract every aspect mentioned in the text below and classify its sentiment.\n\
         Respond with JSON only, in exactly this shape:\n\
         {{\"aspects\": [{{\"aspect\": \"...\", \"sentiment\": \"positive|negative|neutral\", \"confidence\": 0.9}}]}}\n\n\
         Text: {}",
        text
    )
}

/// Parses a model reply into aspect records.
///
/// Tries the whole reply as JSON first, then falls back to the outermost
/// brace-delimited block for models that wrap their answer in prose.
/// Unparseable replies and records with unknown sentiment labels are
/// dropped with a warning.
pub fn parse_model_reply(content: &str) -> Vec<AspectSentiment> {
    let reply: Option<ModelReply> = serde_json::from_str(content).ok().or_else(|| {
        extract_json_block(content).and_then(|block| serde_json::from_str(&block).ok())
    });

    let Some(reply) = reply else {
        warn!("Model reply was not valid JSON, ignoring");
        debug!("Unparseable reply: {}", content);
        return Vec::new();
    };

    let mut results = Vec::new();
    for record in reply.aspects {
        let aspect = record.aspect.trim();
        if aspect.is_empty() {
            continue;
        }

        let Some(sentiment) = Sentiment::from_label(&record.sentiment) else {
            warn!(
                "Model returned unknown sentiment '{}' for '{}'",
                record.sentiment, aspect
            );
            continue;
        };

        results.push(AspectSentiment::new(aspect, sentiment, record.confidence));
    }

    results
}

fn extract_json_block(content: &str) -> Option<String> {
    JSON_BLOCK_REGEX.find(content).map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_prompt_embeds_text() {
        let prompt = build_prompt("The pizza was great.");
        assert!(prompt.contains("Text: The pizza was great."));
        assert!(prompt.contains("\"aspects\""));
    }

    #[test]
    fn test_chat_request_shape() {
        let request = ChatRequest {
            model: "llama3.2:3b".to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: "hi".to_string(),
            }],
            format: "json".to_string(),
            stream: false,
            options: ChatOptions { temperature: 0.2 },
        };

        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(value["model"], "llama3.2:3b");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["format"], "json");
        assert_eq!(value["stream"], false);
        assert!((value["options"]["temperature"].as_f64().expect("f64") - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_parse_reply_clean_json() {
        let reply = r#"{"aspects": [
            {"aspect": "pizza", "sentiment": "positive", "confidence": 0.92},
            {"aspect": "service", "sentiment": "negative", "confidence": 0.81}
        ]}"#;

        let results = parse_model_reply(reply);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].aspect, "pizza");
        assert_eq!(results[0].sentiment, Sentiment::Positive);
        assert!((results[0].confidence - 0.92).abs() < 1e-9);
        assert_eq!(results[1].sentiment, Sentiment::Negative);
    }

    #[test]
    fn test_parse_reply_with_surrounding_prose() {
        let reply = r#"Sure! Here is the analysis:
{"aspects": [{"aspect": "battery", "sentiment": "negative"}]}
Hope that helps."#;

        let results = parse_model_reply(reply);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].aspect, "battery");
        assert_eq!(results[0].sentiment, Sentiment::Negative);
    }

    #[test]
    fn test_parse_reply_defaults_confidence() {
        let reply = r#"{"aspects": [{"aspect": "screen", "sentiment": "neutral"}]}"#;

        let results = parse_model_reply(reply);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].confidence, 1.0);
    }

    #[test]
    fn test_parse_reply_clamps_confidence() {
        let reply = r#"{"aspects": [{"aspect": "screen", "sentiment": "positive", "confidence": 1.7}]}"#;

        let results = parse_model_reply(reply);
        assert_eq!(results[0].confidence, 1.0);
    }

    #[test]
    fn test_parse_reply_skips_unknown_sentiment() {
        let reply = r#"{"aspects": [
            {"aspect": "pizza", "sentiment": "mixed"},
            {"aspect": "service", "sentiment": "positive"}
        ]}"#;

        let results = parse_model_reply(reply);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].aspect, "service");
    }

    #[test]
    fn test_parse_reply_skips_empty_aspect() {
        let reply = r#"{"aspects": [{"aspect": "  ", "sentiment": "positive"}]}"#;
        assert!(parse_model_reply(reply).is_empty());
    }

    #[test]
    fn test_parse_reply_garbage() {
        assert!(parse_model_reply("no json here at all").is_empty());
        assert!(parse_model_reply("").is_empty());
    }

    #[test]
    fn test_extract_json_block_spans_braces() {
        let block = extract_json_block("prefix {\"a\": 1} suffix").expect("block");
        assert_eq!(block, "{\"a\": 1}");
    }
}
