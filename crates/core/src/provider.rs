//! Generator trait: the abstraction over the external text-generation service.
//!
//! A [`GenerationRequest`] is built by the prompt composer from a snapshot of
//! the user's history; a [`Generator`] turns it into a [`GenerationResult`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::locale::Locale;
use crate::reflection::Reflection;

/// What the caller wants back from the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    /// A single new reflection question.
    Question,
    /// Aggregate advice synthesized from the history.
    Advice,
}

/// How the prompt was composed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptMode {
    /// No history was available.
    ColdStart,
    /// Prior reflections were folded into the prompt.
    HistoryConditioned,
}

/// The payload sent to the generation service. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub kind: RequestKind,

    pub mode: PromptMode,

    /// Newest first. An owned snapshot taken at composition time.
    pub history_excerpt: Vec<Reflection>,

    /// Fixed template text for the mode. Never empty.
    pub instructions: String,

    /// The full text sent upstream: instructions with the rendered history.
    pub query: String,

    /// Language of `instructions` and of any fallback text.
    #[serde(default)]
    pub locale: Locale,
}

impl GenerationRequest {
    /// Localized text used when the upstream response has no answer.
    pub fn fallback_text(&self) -> &'static str {
        match self.kind {
            RequestKind::Question => self.locale.question_fallback(),
            RequestKind::Advice => self.locale.advice_fallback(),
        }
    }
}

/// The generator's answer: either a new question or synthesized advice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub text: String,

    /// `true` when `text` is the localized fallback rather than upstream output.
    #[serde(default)]
    pub fallback: bool,
}

impl GenerationResult {
    pub fn generated(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            fallback: false,
        }
    }

    pub fn fallback_for(request: &GenerationRequest) -> Self {
        Self {
            text: request.fallback_text().to_string(),
            fallback: true,
        }
    }
}

/// The core Generator trait.
///
/// Implementations perform exactly one upstream call per `generate` and
/// never retry; retry policy belongs to the caller.
#[async_trait]
pub trait Generator: Send + Sync {
    /// A human-readable name (e.g., "dify").
    fn name(&self) -> &str;

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> std::result::Result<GenerationResult, GenerationError>;

    /// Is the generator configured well enough to be called?
    async fn health_check(&self) -> std::result::Result<bool, GenerationError> {
        Ok(true)
    }
}
