//! Retry policy around a single persona call.
//!
//! Each call is an explicit state machine:
//!
//! ```text
//! Attempting(0) ──ok──────────────────────────▶ Success
//!      │ ├─quota────────────────────────────▶ QuotaExhausted
//!      │ ├─transient, n + 1 < max ─sleep(backoff(n))─▶ Attempting(n + 1)
//!      │ └─transient at max / permanent ────▶ Fallback
//! ```
//!
//! [`transition`] is the pure step function; [`RetryPolicy::execute`]
//! drives it against a [`TextGenerator`], sleeping between attempts.

pub mod classify;

use std::time::Duration;

use crate::llms::base_llm::TextGenerator;
use crate::llms::response::RawResponse;
use crate::persona::template::RenderedPrompt;
use crate::utilities::sleeper::Sleeper;

pub use classify::{classify, ErrorClass};

/// Default total attempts per call.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default first backoff delay.
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_millis(500);

/// Retry parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrySettings {
    /// Total attempts, including the first. Values below 1 act as 1.
    pub max_attempts: u32,
    /// Delay after the first failed attempt; doubles each retry.
    pub backoff_base: Duration,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_base: DEFAULT_BACKOFF_BASE,
        }
    }
}

impl RetrySettings {
    /// Delay before retrying after failed attempt `attempt`: `base * 2^attempt`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.backoff_base.saturating_mul(factor)
    }

    fn effective_max(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// State of one persona call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallState {
    /// About to make attempt `n` (zero-based).
    Attempting(u32),
    /// The service produced text.
    Success(String),
    /// The service reported quota exhaustion.
    QuotaExhausted,
    /// Give up and use the offline response.
    Fallback,
}

/// Next state after attempt `attempt` finished with `result`.
pub fn transition(
    settings: &RetrySettings,
    attempt: u32,
    result: Result<RawResponse, ErrorClass>,
) -> CallState {
    match result {
        Ok(raw) => CallState::Success(raw.extract_text()),
        Err(ErrorClass::Quota) => CallState::QuotaExhausted,
        Err(ErrorClass::Transient) if attempt + 1 < settings.effective_max() => {
            CallState::Attempting(attempt + 1)
        }
        Err(_) => CallState::Fallback,
    }
}

/// Terminal result of a persona call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallOutcome {
    /// Always terminal.
    pub state: CallState,
    /// Attempts actually made.
    pub attempts: u32,
    /// Text of the last error seen, if any.
    pub last_error: Option<String>,
}

/// Drives [`transition`] against a generator.
#[derive(Debug)]
pub struct RetryPolicy<'a> {
    settings: RetrySettings,
    sleeper: &'a dyn Sleeper,
}

impl<'a> RetryPolicy<'a> {
    pub fn new(settings: RetrySettings, sleeper: &'a dyn Sleeper) -> Self {
        Self { settings, sleeper }
    }

    /// Run one persona call to a terminal state. Never fails.
    pub async fn execute(&self, generator: &dyn TextGenerator, prompt: &RenderedPrompt) -> CallOutcome {
        let max = self.settings.effective_max();
        let mut state = CallState::Attempting(0);
        let mut attempts = 0;
        let mut last_error = None;

        while let CallState::Attempting(n) = state {
            attempts = n + 1;
            let result = match generator.generate(prompt).await {
                Ok(raw) => Ok(raw),
                Err(err) => {
                    let class = ErrorClass::from(&err);
                    log::debug!(
                        "{} call failed ({}), class={:?}: {}",
                        generator.provider(),
                        prompt.persona,
                        class,
                        err
                    );
                    last_error = Some(err.to_string());
                    Err(class)
                }
            };

            state = transition(&self.settings, n, result);
            match &state {
                CallState::Attempting(_) => {
                    let delay = self.settings.backoff(n);
                    log::warn!(
                        "{} call failed ({}), retrying in {:?} (attempt {}/{})",
                        generator.provider(),
                        prompt.persona,
                        delay,
                        attempts,
                        max
                    );
                    self.sleeper.sleep(delay).await;
                }
                CallState::QuotaExhausted => {
                    log::warn!("{} quota exhausted ({})", generator.provider(), prompt.persona);
                }
                CallState::Fallback => {
                    log::error!(
                        "{} call failed ({}) after {} attempt(s), using offline response: {}",
                        generator.provider(),
                        prompt.persona,
                        attempts,
                        last_error.as_deref().unwrap_or("unknown error")
                    );
                }
                CallState::Success(_) => {}
            }
        }

        CallOutcome {
            state,
            attempts,
            last_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llms::testing::{api_error, ScriptedGenerator};
    use crate::persona::PersonaId;
    use crate::utilities::sleeper::RecordingSleeper;

    fn prompt() -> RenderedPrompt {
        RenderedPrompt {
            persona: PersonaId::from("A"),
            text: "prompt".to_string(),
        }
    }

    #[test]
    fn test_backoff_doubles() {
        let settings = RetrySettings::default();
        assert_eq!(settings.backoff(0), Duration::from_millis(500));
        assert_eq!(settings.backoff(1), Duration::from_secs(1));
        assert_eq!(settings.backoff(2), Duration::from_secs(2));
        assert_eq!(settings.backoff(40), Duration::from_millis(500).saturating_mul(u32::MAX));
    }

    #[test]
    fn test_transition_table() {
        let s = RetrySettings::default();
        assert_eq!(
            transition(&s, 0, Ok(RawResponse::single(" hi "))),
            CallState::Success("hi".to_string())
        );
        assert_eq!(transition(&s, 0, Err(ErrorClass::Quota)), CallState::QuotaExhausted);
        assert_eq!(transition(&s, 0, Err(ErrorClass::Transient)), CallState::Attempting(1));
        assert_eq!(transition(&s, 1, Err(ErrorClass::Transient)), CallState::Attempting(2));
        assert_eq!(transition(&s, 2, Err(ErrorClass::Transient)), CallState::Fallback);
        assert_eq!(transition(&s, 0, Err(ErrorClass::Permanent)), CallState::Fallback);
        assert_eq!(transition(&s, 0, Err(ErrorClass::Configuration)), CallState::Fallback);
    }

    #[test]
    fn test_zero_max_attempts_acts_as_one() {
        let s = RetrySettings {
            max_attempts: 0,
            ..RetrySettings::default()
        };
        assert_eq!(transition(&s, 0, Err(ErrorClass::Transient)), CallState::Fallback);
    }

    #[tokio::test]
    async fn test_quota_is_not_retried() {
        let sleeper = RecordingSleeper::new();
        let generator =
            ScriptedGenerator::always_failing(429, "RESOURCE_EXHAUSTED", "Quota exceeded");
        let policy = RetryPolicy::new(RetrySettings::default(), &sleeper);

        let outcome = policy.execute(&generator, &prompt()).await;
        assert_eq!(outcome.state, CallState::QuotaExhausted);
        assert_eq!(outcome.attempts, 1);
        assert_eq!(generator.call_count(), 1);
        assert!(sleeper.calls().is_empty());
    }

    #[tokio::test]
    async fn test_transient_twice_then_success() {
        let sleeper = RecordingSleeper::new();
        let generator = ScriptedGenerator::new(|i, _| {
            if i < 2 {
                Err(api_error(503, "UNAVAILABLE", "The model is overloaded."))
            } else {
                Ok(RawResponse::single("finally"))
            }
        });
        let policy = RetryPolicy::new(RetrySettings::default(), &sleeper);

        let outcome = policy.execute(&generator, &prompt()).await;
        assert_eq!(outcome.state, CallState::Success("finally".to_string()));
        assert_eq!(outcome.attempts, 3);
        assert_eq!(generator.call_count(), 3);
        assert_eq!(
            sleeper.calls(),
            vec![Duration::from_millis(500), Duration::from_secs(1)]
        );
    }

    #[tokio::test]
    async fn test_always_transient_falls_back_after_max_attempts() {
        let sleeper = RecordingSleeper::new();
        let generator = ScriptedGenerator::always_failing(503, "UNAVAILABLE", "overloaded");
        let policy = RetryPolicy::new(RetrySettings::default(), &sleeper);

        let outcome = policy.execute(&generator, &prompt()).await;
        assert_eq!(outcome.state, CallState::Fallback);
        assert_eq!(outcome.attempts, 3);
        assert_eq!(generator.call_count(), 3);
        assert_eq!(sleeper.calls().len(), 2);
        assert!(outcome.last_error.unwrap().contains("UNAVAILABLE"));
    }

    #[tokio::test]
    async fn test_higher_max_reaches_two_second_backoff() {
        let sleeper = RecordingSleeper::new();
        let generator = ScriptedGenerator::always_failing(503, "UNAVAILABLE", "overloaded");
        let settings = RetrySettings {
            max_attempts: 4,
            ..RetrySettings::default()
        };
        let policy = RetryPolicy::new(settings, &sleeper);

        let outcome = policy.execute(&generator, &prompt()).await;
        assert_eq!(outcome.state, CallState::Fallback);
        assert_eq!(generator.call_count(), 4);
        assert_eq!(
            sleeper.calls(),
            vec![
                Duration::from_millis(500),
                Duration::from_secs(1),
                Duration::from_secs(2)
            ]
        );
    }

    #[tokio::test]
    async fn test_permanent_error_falls_back_immediately() {
        let sleeper = RecordingSleeper::new();
        let generator = ScriptedGenerator::always_failing(400, "INVALID_ARGUMENT", "API key not valid");
        let policy = RetryPolicy::new(RetrySettings::default(), &sleeper);

        let outcome = policy.execute(&generator, &prompt()).await;
        assert_eq!(outcome.state, CallState::Fallback);
        assert_eq!(generator.call_count(), 1);
        assert!(sleeper.calls().is_empty());
    }
}
