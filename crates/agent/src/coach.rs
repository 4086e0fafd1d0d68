//! The reflection coach: one call per user action, store plus generator.

use std::sync::Arc;

use careerlens_core::error::Result;
use careerlens_core::locale::Locale;
use careerlens_core::memory::ReflectionStore;
use careerlens_core::provider::{GenerationResult, Generator};
use careerlens_core::reflection::{NewReflection, Reflection};
use tracing::{debug, info, warn};

use crate::composer::{QUESTION_HISTORY_LIMIT, compose_advice_request, compose_question_request};

/// Orchestrates the question → answer → advice cycle.
///
/// Every operation reads a fresh snapshot from the store; nothing is cached
/// between calls.
pub struct ReflectionCoach {
    store: Arc<dyn ReflectionStore>,
    generator: Arc<dyn Generator>,
    locale: Locale,
}

impl ReflectionCoach {
    pub fn new(
        store: Arc<dyn ReflectionStore>,
        generator: Arc<dyn Generator>,
        locale: Locale,
    ) -> Self {
        Self {
            store,
            generator,
            locale,
        }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn store(&self) -> &Arc<dyn ReflectionStore> {
        &self.store
    }

    /// Generate the next question from the most recent reflections.
    pub async fn next_question(&self) -> Result<GenerationResult> {
        let recent = self.store.recent(QUESTION_HISTORY_LIMIT).await?;
        let request = compose_question_request(&recent, self.locale);
        debug!(mode = ?request.mode, history = request.history_excerpt.len(), "Composed question request");

        let result = self.generator.generate(&request).await?;
        if result.fallback {
            warn!(generator = self.generator.name(), "Question generation fell back");
        }
        Ok(result)
    }

    /// Validate and persist one answered question.
    pub async fn save_reflection(
        &self,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Result<Reflection> {
        let reflection = NewReflection::new(question, answer)?;
        let stored = self.store.append(reflection).await?;
        info!(id = stored.id, "Reflection saved");
        Ok(stored)
    }

    /// The full history, newest first.
    pub async fn history(&self) -> Result<Vec<Reflection>> {
        Ok(self.store.list_newest_first().await?)
    }

    /// Synthesize advice from the entire history.
    ///
    /// An empty history is still sent upstream.
    pub async fn advice(&self) -> Result<GenerationResult> {
        let all = self.store.list_newest_first().await?;
        let request = compose_advice_request(&all, self.locale);
        debug!(history = request.history_excerpt.len(), "Composed advice request");

        let result = self.generator.generate(&request).await?;
        if result.fallback {
            warn!(generator = self.generator.name(), "Advice generation fell back");
        }
        Ok(result)
    }
}
