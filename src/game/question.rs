//! Question records and the question bank they are sampled from

use rand::Rng;
use rust_embed::Embed;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

#[derive(Embed)]
#[folder = "data"]
struct Corpus;

const EMBEDDED_CORPUS: &str = "questions.json";

/// One canonical sub-answer of a question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSlot {
    pub text: String,
    pub points: u32,
}

impl AnswerSlot {
    pub fn new(text: impl Into<String>, points: u32) -> Self {
        Self {
            text: text.into(),
            points,
        }
    }
}

/// A multi-answer question. Slot order only matters for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "question")]
    pub prompt: String,
    pub answers: Vec<AnswerSlot>,
}

impl Question {
    pub fn new(prompt: impl Into<String>, answers: Vec<AnswerSlot>) -> Self {
        Self {
            prompt: prompt.into(),
            answers,
        }
    }

    /// Canonical answer texts in slot order
    pub fn answer_texts(&self) -> Vec<&str> {
        self.answers.iter().map(|a| a.text.as_str()).collect()
    }

    fn validate(&self, index: usize) -> Result<(), QuestionBankError> {
        let invalid = |reason: &str| QuestionBankError::InvalidQuestion {
            index,
            reason: reason.to_string(),
        };

        if self.prompt.trim().is_empty() {
            return Err(invalid("prompt is blank"));
        }
        if self.answers.is_empty() {
            return Err(invalid("no answers"));
        }

        let mut seen = HashSet::new();
        let mut total: u32 = 0;
        for slot in &self.answers {
            if slot.text.trim().is_empty() {
                return Err(invalid("blank answer text"));
            }
            if slot.points == 0 {
                return Err(invalid(&format!("answer '{}' has zero points", slot.text)));
            }
            if !seen.insert(slot.text.to_lowercase()) {
                return Err(invalid(&format!("duplicate answer '{}'", slot.text)));
            }
            total = total
                .checked_add(slot.points)
                .ok_or_else(|| invalid("total points overflow"))?;
        }
        Ok(())
    }
}

/// Errors raised while loading a question corpus
#[derive(Debug, Error)]
pub enum QuestionBankError {
    #[error("failed to read question corpus: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse question corpus: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("embedded question corpus is missing")]
    MissingEmbedded,
    #[error("question corpus is empty")]
    Empty,
    #[error("question #{index} is invalid: {reason}")]
    InvalidQuestion { index: usize, reason: String },
}

/// Fixed, validated, non-empty corpus of questions
#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> Result<Self, QuestionBankError> {
        if questions.is_empty() {
            return Err(QuestionBankError::Empty);
        }
        for (index, question) in questions.iter().enumerate() {
            question.validate(index)?;
        }
        Ok(Self { questions })
    }

    pub fn from_json(json: &str) -> Result<Self, QuestionBankError> {
        let questions: Vec<Question> = serde_json::from_str(json)?;
        Self::new(questions)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, QuestionBankError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load the corpus compiled into the binary
    pub fn embedded() -> Result<Self, QuestionBankError> {
        let file = Corpus::get(EMBEDDED_CORPUS).ok_or(QuestionBankError::MissingEmbedded)?;
        let questions: Vec<Question> = serde_json::from_slice(&file.data)?;
        Self::new(questions)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[allow(dead_code)] // Used in tests
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Pick one question uniformly at random
    pub fn sample_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Question {
        // Non-empty by construction
        let index = rng.gen_range(0..self.questions.len());
        self.questions[index].clone()
    }
}
