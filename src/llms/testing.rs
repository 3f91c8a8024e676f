//! Scripted [`TextGenerator`] for unit tests.

use std::fmt;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llms::base_llm::TextGenerator;
use crate::llms::response::RawResponse;
use crate::persona::template::RenderedPrompt;
use crate::utilities::errors::LLMCallError;

type Responder = dyn Fn(usize, &RenderedPrompt) -> Result<RawResponse, LLMCallError> + Send + Sync;

/// Answers each call from a closure given the zero-based call index.
pub(crate) struct ScriptedGenerator {
    prompts: Mutex<Vec<RenderedPrompt>>,
    respond: Box<Responder>,
}

impl fmt::Debug for ScriptedGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedGenerator")
            .field("calls", &self.call_count())
            .finish()
    }
}

impl ScriptedGenerator {
    pub(crate) fn new<F>(respond: F) -> Self
    where
        F: Fn(usize, &RenderedPrompt) -> Result<RawResponse, LLMCallError> + Send + Sync + 'static,
    {
        Self {
            prompts: Mutex::new(Vec::new()),
            respond: Box::new(respond),
        }
    }

    /// Echo the prompt text back as a single candidate.
    pub(crate) fn echo() -> Self {
        Self::new(|_, prompt| Ok(RawResponse::single(format!("reply to {}", prompt.text))))
    }

    /// Fail every call with an API error built from `code`, `status` and `message`.
    pub(crate) fn always_failing(code: u16, status: &'static str, message: &'static str) -> Self {
        Self::new(move |_, _| Err(api_error(code, status, message)))
    }

    pub(crate) fn call_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }

    pub(crate) fn prompts(&self) -> Vec<RenderedPrompt> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

pub(crate) fn api_error(code: u16, status: &str, message: &str) -> LLMCallError {
    LLMCallError::Api {
        code,
        status: status.to_string(),
        message: message.to_string(),
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn model(&self) -> &str {
        "scripted"
    }

    fn provider(&self) -> &str {
        "test"
    }

    async fn generate(&self, prompt: &RenderedPrompt) -> Result<RawResponse, LLMCallError> {
        let index = {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(prompt.clone());
            prompts.len() - 1
        };
        (self.respond)(index, prompt)
    }
}
