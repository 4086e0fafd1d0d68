//! Reflection: one completed question/answer cycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A persisted question/answer pair.
///
/// Reflections are created fully formed by a store and never change
/// afterwards, so they can be shared and cloned freely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reflection {
    /// Assigned by the store, strictly increasing.
    pub id: i64,

    /// When the reflection was stored.
    pub created_at: DateTime<Utc>,

    pub question: String,

    pub answer: String,
}

/// Validated input for appending a reflection.
///
/// Text is kept exactly as given; validation only rejects blank fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReflection {
    question: String,
    answer: String,
}

impl NewReflection {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Result<Self> {
        let question = question.into();
        let answer = answer.into();

        if question.trim().is_empty() {
            return Err(Error::InvalidInput("question must not be empty".into()));
        }
        if answer.trim().is_empty() {
            return Err(Error::InvalidInput("answer must not be empty".into()));
        }

        Ok(Self { question, answer })
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// Materialize into a stored reflection. Used by stores once they
    /// have assigned an id and timestamp.
    pub fn into_reflection(self, id: i64, created_at: DateTime<Utc>) -> Reflection {
        Reflection {
            id,
            created_at,
            question: self.question,
            answer: self.answer,
        }
    }
}
