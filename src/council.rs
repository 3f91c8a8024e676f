//! Fan-out of one user message to every persona.
//!
//! A round walks the registry in order, one persona at a time. Online, each
//! call goes through the [`RetryPolicy`] and successive calls are spaced by
//! the pacing interval. Offline (no credential), the generator is never
//! touched and every persona gets the offline response.
//!
//! A round never fails: every persona slot is filled with generated text,
//! the quota notice, the offline response, or an error notice.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{AppConfig, DEFAULT_PACING};
use crate::fallback::{OfflineResponder, UniformResponder, QUOTA_EXHAUSTED_NOTICE, TEMPLATE_MISSING_NOTICE};
use crate::llms::base_llm::TextGenerator;
use crate::llms::providers::gemini::GeminiClient;
use crate::persona::{PersonaId, PersonaRegistry};
use crate::retry::{CallState, ErrorClass, RetryPolicy, RetrySettings};
use crate::utilities::errors::ConfigurationError;
use crate::utilities::pacer::Pacer;
use crate::utilities::sleeper::{Sleeper, TokioSleeper};

/// Where a persona's reply text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    /// Produced by the text-generation service.
    Generated,
    /// Fixed notice: daily quota exhausted.
    QuotaNotice,
    /// Offline/demo response.
    Offline,
    /// Fixed notice: the persona could not be prompted.
    ErrorNotice,
}

/// One persona's reply to one user message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentResponse {
    pub persona: PersonaId,
    pub text: String,
    pub source: ResponseSource,
}

/// Replies of one round, in registry order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResponseMapping {
    entries: Vec<AgentResponse>,
}

impl ResponseMapping {
    fn push(&mut self, response: AgentResponse) {
        self.entries.push(response);
    }

    /// Reply text for `persona`.
    pub fn get(&self, persona: &PersonaId) -> Option<&str> {
        self.entries
            .iter()
            .find(|r| &r.persona == persona)
            .map(|r| r.text.as_str())
    }

    /// Persona ids in order.
    pub fn keys(&self) -> impl Iterator<Item = &PersonaId> {
        self.entries.iter().map(|r| &r.persona)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AgentResponse> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for ResponseMapping {
    type Item = AgentResponse;
    type IntoIter = std::vec::IntoIter<AgentResponse>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResponseMapping {
    type Item = &'a AgentResponse;
    type IntoIter = std::slice::Iter<'a, AgentResponse>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// The fan-out orchestrator.
#[derive(Debug, Clone)]
pub struct AgentCouncil {
    registry: Arc<PersonaRegistry>,
    generator: Option<Arc<dyn TextGenerator>>,
    responder: Arc<dyn OfflineResponder>,
    sleeper: Arc<dyn Sleeper>,
    retry: RetrySettings,
    pacing: Duration,
}

impl AgentCouncil {
    /// Create a council. `generator = None` selects offline/demo mode.
    pub fn new(registry: PersonaRegistry, generator: Option<Arc<dyn TextGenerator>>) -> Self {
        match &generator {
            Some(g) => log::info!(
                "AgentCouncil: {} personas via {} ({})",
                registry.len(),
                g.provider(),
                g.model()
            ),
            None => log::info!(
                "AgentCouncil: no API key configured, {} personas in offline/demo mode",
                registry.len()
            ),
        }
        Self {
            registry: Arc::new(registry),
            generator,
            responder: Arc::new(UniformResponder::default()),
            sleeper: Arc::new(TokioSleeper),
            retry: RetrySettings::default(),
            pacing: DEFAULT_PACING,
        }
    }

    /// Load personas and build the Gemini client described by `config`.
    ///
    /// # Errors
    /// Persona definitions that fail validation.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigurationError> {
        let registry = PersonaRegistry::load(config.personas_file.as_deref())?;
        let generator = config.api_key.as_ref().map(|key| {
            Arc::new(GeminiClient::new(key.clone(), config.model.clone())) as Arc<dyn TextGenerator>
        });
        Ok(Self::new(registry, generator)
            .with_retry(config.retry)
            .with_pacing(config.pacing))
    }

    pub fn with_retry(mut self, retry: RetrySettings) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_responder(mut self, responder: Arc<dyn OfflineResponder>) -> Self {
        self.responder = responder;
        self
    }

    pub fn registry(&self) -> &PersonaRegistry {
        &self.registry
    }

    /// Whether rounds run without the text-generation service.
    pub fn is_offline(&self) -> bool {
        self.generator.is_none()
    }

    /// Ask every persona about `user_input`, in registry order.
    pub async fn get_responses(&self, user_input: &str) -> ResponseMapping {
        let mut mapping = ResponseMapping::default();
        let mut pacer = Pacer::new(self.pacing, self.sleeper.as_ref());

        for persona in self.registry.ids() {
            if self.generator.is_some() {
                pacer.check_or_wait().await;
            }
            mapping.push(self.respond(persona, user_input).await);
        }

        log::debug!("Round complete: {} responses", mapping.len());
        mapping
    }

    /// Ask a single persona. Unknown personas get an error notice.
    pub async fn respond(&self, persona: &PersonaId, user_input: &str) -> AgentResponse {
        let prompt = match self.registry.render(persona, user_input) {
            Ok(prompt) => prompt,
            Err(err) => {
                log::error!("{} ({:?})", err, ErrorClass::from(&err));
                return AgentResponse {
                    persona: persona.clone(),
                    text: TEMPLATE_MISSING_NOTICE.to_string(),
                    source: ResponseSource::ErrorNotice,
                };
            }
        };

        let Some(generator) = &self.generator else {
            return self.offline(persona, user_input);
        };

        let policy = RetryPolicy::new(self.retry, self.sleeper.as_ref());
        let outcome = policy.execute(generator.as_ref(), &prompt).await;
        match outcome.state {
            CallState::Success(text) => AgentResponse {
                persona: persona.clone(),
                text,
                source: ResponseSource::Generated,
            },
            CallState::QuotaExhausted => AgentResponse {
                persona: persona.clone(),
                text: QUOTA_EXHAUSTED_NOTICE.to_string(),
                source: ResponseSource::QuotaNotice,
            },
            CallState::Fallback | CallState::Attempting(_) => self.offline(persona, user_input),
        }
    }

    fn offline(&self, persona: &PersonaId, user_input: &str) -> AgentResponse {
        AgentResponse {
            persona: persona.clone(),
            text: self.responder.demo_response(persona, user_input),
            source: ResponseSource::Offline,
        }
    }
}
