#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use tech_report::error::{ReportError, Result};
use tech_report::generator::{ChatMessage, ReportPrompt, TextGenerator};
use tech_report::pipeline::ReportPipeline;
use tech_report::search::SearchBackend;

/// Search backend that replays a fixed response.
pub struct MockSearch {
    configured: bool,
    response: Value,
    pub calls: AtomicUsize,
}

impl MockSearch {
    pub fn new(response: Value) -> Self {
        Self {
            configured: true,
            response,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            response: json!([]),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchBackend for MockSearch {
    fn provider(&self) -> &str {
        "mock"
    }

    fn ensure_configured(&self) -> Result<()> {
        if self.configured {
            Ok(())
        } else {
            Err(ReportError::Configuration("no key".to_string()))
        }
    }

    async fn search(&self, _query: &str) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }
}

pub enum Reply {
    Text(String),
    Unavailable,
    Fail,
    Panic,
}

/// Generator that records every prompt it receives.
pub struct MockGenerator {
    reply: Reply,
    pub prompts: Mutex<Vec<Vec<ChatMessage>>>,
}

impl MockGenerator {
    pub fn new(reply: Reply) -> Self {
        Self {
            reply,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn text(text: &str) -> Self {
        Self::new(Reply::Text(text.to_string()))
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_user_prompt(&self) -> String {
        let prompts = self.prompts.lock().unwrap();
        prompts
            .last()
            .and_then(|messages| messages.iter().find(|m| m.role == "user"))
            .map(|m| m.content.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        self.prompts.lock().unwrap().push(messages.to_vec());
        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Unavailable => Err(ReportError::BackendUnavailable {
                endpoint: "http://localhost:11434".to_string(),
                message: "connection refused".to_string(),
            }),
            Reply::Fail => Err(ReportError::Generation {
                topic: String::new(),
                message: "model not found".to_string(),
                context_len: 0,
            }),
            Reply::Panic => panic!("generator exploded"),
        }
    }
}

pub fn pipeline(search: Arc<MockSearch>, generator: Arc<MockGenerator>) -> ReportPipeline {
    ReportPipeline::new(search, generator, ReportPrompt::new("English"))
}

pub fn three_results() -> Value {
    json!({
        "query": "transformer model evolution",
        "answer": "Transformers replaced recurrence with attention.",
        "results": [
            {"url": "https://example.com/attention", "title": "Attention Is All You Need", "content": "The original transformer paper."},
            {"url": "https://example.com/bert", "title": "BERT", "content": "Bidirectional encoder pre-training."},
            {"url": "https://example.com/gpt", "title": "GPT", "content": "Decoder-only generative pre-training."}
        ]
    })
}
