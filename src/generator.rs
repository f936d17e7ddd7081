use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};

pub const OLLAMA_BASE_URL: &str = "http://localhost:11434";
pub const MODEL_NAME: &str = "llama3.1";

/// Chat message in the role/content shape local model servers expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

const SYSTEM_TEMPLATE: &str = "You are an IT technical blog writer. Always answer in {language}, clearly, logically and professionally.";

const USER_TEMPLATE: &str = r#"Write a structured report in {language} on the following topic, based on the search results below.

Topic: {topic}

Search results:
{search_results}

Use this layout:

# {topic}

## Introduction
(a short introduction to the topic)

## Body
(synthesize the key points from the search results, split into several sections)

## Conclusion
(summary of the main points and insights)

---

Write in markdown and keep it professional and easy to read."#;

/// The fixed report prompt, parameterized only by output language.
#[derive(Debug, Clone)]
pub struct ReportPrompt {
    language: String,
}

impl ReportPrompt {
    pub fn new(language: &str) -> Self {
        Self {
            language: language.to_string(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn render(&self, topic: &str, search_results: &str) -> Vec<ChatMessage> {
        let system = SYSTEM_TEMPLATE.replace("{language}", &self.language);
        // topic and results last so their own braces are left alone
        let user = USER_TEMPLATE
            .replace("{language}", &self.language)
            .replace("{search_results}", search_results)
            .replace("{topic}", topic);
        vec![ChatMessage::system(system), ChatMessage::user(user)]
    }
}

/// A text-generation backend.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn model(&self) -> &str;

    /// Sends one conversation and returns the reply text.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// Builds the prompt for `topic` and runs it through `generator`.
pub async fn generate_report(
    generator: &dyn TextGenerator,
    prompt: &ReportPrompt,
    topic: &str,
    context: &str,
) -> Result<String> {
    let messages = prompt.render(topic, context);
    log::info!("running report prompt model={}", generator.model());

    let report = generator.complete(&messages).await.map_err(|e| match e {
        ReportError::BackendUnavailable { .. } => e,
        ReportError::Generation { message, .. } => ReportError::Generation {
            topic: topic.to_string(),
            message,
            context_len: context.len(),
        },
        other => ReportError::Generation {
            topic: topic.to_string(),
            message: other.to_string(),
            context_len: context.len(),
        },
    })?;

    if report.trim().is_empty() {
        return Err(ReportError::Generation {
            topic: topic.to_string(),
            message: format!("model {} returned an empty report", generator.model()),
            context_len: context.len(),
        });
    }
    Ok(report)
}

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: ChatMessage,
}

/// Ollama chat API client with deterministic decoding.
pub struct OllamaGenerator {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaGenerator {
    pub fn new() -> Self {
        Self::with_base_url(OLLAMA_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        log::info!("LLM client model={MODEL_NAME} base_url={base_url}");
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: MODEL_NAME.to_string(),
        }
    }

    fn generation_error(&self, message: String, messages: &[ChatMessage]) -> ReportError {
        ReportError::Generation {
            topic: String::new(),
            message: format!(
                "{message}\nCheck that the model is installed (`ollama list`)."
            ),
            context_len: messages.iter().map(|m| m.content.len()).sum(),
        }
    }
}

impl Default for OllamaGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let endpoint = format!("{}/api/chat", self.base_url);
        let body = OllamaChatRequest {
            model: &self.model,
            messages,
            stream: false,
            options: OllamaOptions { temperature: 0.0 },
        };

        let response = self
            .http
            .post(&endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    ReportError::BackendUnavailable {
                        endpoint: self.base_url.clone(),
                        message: e.to_string(),
                    }
                } else {
                    self.generation_error(format!("request error: {e}"), messages)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(self.generation_error(format!("status {status}: {text}"), messages));
        }

        let parsed: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| self.generation_error(format!("invalid response body: {e}"), messages))?;
        Ok(parsed.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedGenerator(Result<String>);

    #[async_trait]
    impl TextGenerator for FixedGenerator {
        fn model(&self) -> &str {
            "fixed"
        }

        async fn complete(&self, _messages: &[ChatMessage]) -> Result<String> {
            match &self.0 {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(ReportError::Schema(e.to_string())),
            }
        }
    }

    #[test]
    fn test_prompt_substitutes_placeholders() {
        let prompt = ReportPrompt::new("English");
        let messages = prompt.render("Rust async", "\n## Search Result 1\nbody\n");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert!(messages[0].content.contains("answer in English"));
        assert_eq!(messages[1].role, "user");
        assert!(messages[1].content.contains("Topic: Rust async"));
        assert!(messages[1].content.contains("# Rust async"));
        assert!(messages[1].content.contains("## Search Result 1"));
        assert!(!messages[1].content.contains("{topic}"));
        assert!(!messages[1].content.contains("{search_results}"));
    }

    #[test]
    fn test_prompt_leaves_braces_in_results_alone() {
        let prompt = ReportPrompt::new("English");
        let messages = prompt.render("t", "fn main() { println!(\"{topic}\") }");
        assert!(messages[1].content.contains("println!(\"{topic}\")"));
    }

    #[tokio::test]
    async fn test_generate_rejects_empty_report() {
        let generator = FixedGenerator(Ok("   ".to_string()));
        let err = generate_report(&generator, &ReportPrompt::new("English"), "t", "ctx")
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::Generation { .. }));
    }

    #[tokio::test]
    async fn test_generate_wraps_foreign_errors() {
        let generator = FixedGenerator(Err(ReportError::Schema("bad".into())));
        let err = generate_report(&generator, &ReportPrompt::new("English"), "topic", "ctx")
            .await
            .unwrap_err();
        match err {
            ReportError::Generation {
                topic, context_len, ..
            } => {
                assert_eq!(topic, "topic");
                assert_eq!(context_len, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generation_error_reports_context_length() {
        struct OversizedContext;

        #[async_trait]
        impl TextGenerator for OversizedContext {
            fn model(&self) -> &str {
                "oversized"
            }

            async fn complete(&self, _messages: &[ChatMessage]) -> Result<String> {
                Err(ReportError::Generation {
                    topic: String::new(),
                    message: "model not found".into(),
                    context_len: 9999,
                })
            }
        }

        let context = "\n## Search Result 1\nbody\n";
        let prompt = ReportPrompt::new("English");
        let err = generate_report(&OversizedContext, &prompt, "topic", context)
            .await
            .unwrap_err();
        match err {
            ReportError::Generation {
                topic,
                message,
                context_len,
            } => {
                assert_eq!(topic, "topic");
                assert_eq!(message, "model not found");
                assert_eq!(context_len, context.len());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_unavailable() {
        let generator = OllamaGenerator::with_base_url("http://127.0.0.1:1");
        let err = generator
            .complete(&[ChatMessage::user("hello")])
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::BackendUnavailable { .. }));
        assert!(err.remediation().unwrap().contains("ollama serve"));
    }
}
