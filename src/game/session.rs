//! Per-chat round state and slot resolution

use super::question::{AnswerSlot, Question};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

/// Who found a slot and what it was worth
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoundRecord {
    /// Display names in the order they were credited
    pub contributors: Vec<String>,
    pub points: u32,
}

/// Result of crediting an oracle-accepted answer against a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credit {
    /// A new slot was filled
    Credited { slot: AnswerSlot, completed: bool },
    /// The resolved slot was already filled earlier
    AlreadyFound { slot: AnswerSlot, record: FoundRecord },
    /// The accepted text matches no slot of the question
    Unresolved,
}

/// An in-progress round for one chat.
///
/// Fields are private so that `score` always equals the sum of `found` points
/// and `found` only ever holds canonical answer texts of `question`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: Uuid,
    question: Question,
    found: HashMap<String, FoundRecord>,
    score: u32,
    started_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: Uuid, question: Question) -> Self {
        Self {
            id,
            question,
            found: HashMap::new(),
            score: 0,
            started_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn found(&self, answer_text: &str) -> Option<&FoundRecord> {
        self.found.get(answer_text)
    }

    pub fn found_count(&self) -> usize {
        self.found.len()
    }

    pub fn is_complete(&self) -> bool {
        self.found.len() == self.question.answers.len()
    }

    /// Sum of points over found slots; equal to `score()` at all times
    #[allow(dead_code)] // Used in tests
    pub fn found_points(&self) -> u32 {
        self.found.values().map(|r| r.points).sum()
    }

    /// Credit `contributor` for the slot that `accepted_text` resolves to.
    pub fn credit(&mut self, accepted_text: &str, contributor: &str) -> Credit {
        let Some(slot) = resolve_slot(&self.question.answers, accepted_text) else {
            return Credit::Unresolved;
        };
        let slot = slot.clone();

        if let Some(record) = self.found.get(&slot.text) {
            return Credit::AlreadyFound {
                record: record.clone(),
                slot,
            };
        }

        self.found.insert(
            slot.text.clone(),
            FoundRecord {
                contributors: vec![contributor.to_string()],
                points: slot.points,
            },
        );
        self.score += slot.points;

        Credit::Credited {
            completed: self.is_complete(),
            slot,
        }
    }

    /// Snapshot for read-only consumers. Unfound answers stay hidden.
    pub fn view(&self) -> SessionView {
        let slots = self
            .question
            .answers
            .iter()
            .enumerate()
            .map(|(i, slot)| match self.found.get(&slot.text) {
                Some(record) => SlotView {
                    number: i + 1,
                    text: Some(slot.text.clone()),
                    points: Some(record.points),
                    contributors: record.contributors.clone(),
                },
                None => SlotView {
                    number: i + 1,
                    text: None,
                    points: None,
                    contributors: vec![],
                },
            })
            .collect();

        SessionView {
            session_id: self.id,
            prompt: self.question.prompt.clone(),
            slots,
            score: self.score,
            found_count: self.found.len(),
            total_slots: self.question.answers.len(),
            started_at: self.started_at,
        }
    }
}

/// Resolve oracle output to a slot.
///
/// A slot matches when its text contains `accepted_text`, compared
/// case-insensitively. The first matching slot in question order wins, so an
/// ambiguous fragment credits the earlier slot. Blank input matches nothing.
pub fn resolve_slot<'a>(slots: &'a [AnswerSlot], accepted_text: &str) -> Option<&'a AnswerSlot> {
    let needle = accepted_text.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    slots
        .iter()
        .find(|slot| slot.text.to_lowercase().contains(&needle))
}

/// Serializable snapshot of a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub prompt: String,
    pub slots: Vec<SlotView>,
    pub score: u32,
    pub found_count: usize,
    pub total_slots: usize,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotView {
    pub number: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<u32>,
    pub contributors: Vec<String>,
}
