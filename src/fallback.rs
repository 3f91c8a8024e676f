//! Offline/demo responses and fixed user-facing notices.
//!
//! Used when no credential is configured, when retries are exhausted, or
//! when the service fails permanently. Deterministic, no network, no failure
//! mode.

use std::fmt;

use crate::persona::PersonaId;

/// Reply used for every persona in offline/demo mode.
pub const OFFLINE_RESPONSE: &str =
    "根据你的情况，我建议你保持冷静，理性分析，然后做出最适合你的决定。";

/// Reply used when the service reports the daily quota is exhausted.
pub const QUOTA_EXHAUSTED_NOTICE: &str = "⚠️ API配额已用完（每日免费额度20次）。请明天再试，或升级到付费计划。\n\n💡 提示：你可以暂时使用演示模式，虽然回复是预设的，但也能提供参考。";

/// Reply used when a persona has no prompt template.
pub const TEMPLATE_MISSING_NOTICE: &str = "⚠️ 未找到该智能体的提示模板，暂时无法回复。";

/// Produces the canned reply for a persona when the service cannot be used.
pub trait OfflineResponder: Send + Sync + fmt::Debug {
    fn demo_response(&self, persona: &PersonaId, user_input: &str) -> String;
}

/// Same text for every persona and every input.
#[derive(Debug, Clone)]
pub struct UniformResponder {
    text: String,
}

impl UniformResponder {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Default for UniformResponder {
    fn default() -> Self {
        Self::new(OFFLINE_RESPONSE)
    }
}

impl OfflineResponder for UniformResponder {
    fn demo_response(&self, _persona: &PersonaId, _user_input: &str) -> String {
        self.text.clone()
    }
}
