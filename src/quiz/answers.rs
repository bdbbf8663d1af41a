use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};

/// A student's answer to one question. Multi-select answers compare
/// order-independently, so they are kept as a set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Answer {
    Single(String),
    Multi(BTreeSet<String>),
}

impl Answer {
    pub fn display(&self) -> String {
        match self {
            Answer::Single(s) => s.clone(),
            Answer::Multi(set) => set.iter().cloned().collect::<Vec<_>>().join(", "),
        }
    }
}

/// Immutable copy of the answer map, handed to the scoring engine and the
/// persistence path.
#[derive(Clone, Debug, Default)]
pub struct AnswerSnapshot(BTreeMap<i64, Answer>);

impl AnswerSnapshot {
    pub fn get(&self, question_id: i64) -> Option<&Answer> {
        self.0.get(&question_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(i64, Answer)> for AnswerSnapshot {
    fn from_iter<I: IntoIterator<Item = (i64, Answer)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Holds the in-progress attempt: per-question answers, the fixed question
/// order, the cursor, and the lifecycle timestamps.
pub struct AnswerStore {
    order: Vec<i64>,
    answers: BTreeMap<i64, Answer>,
    current: usize,
    started_at: DateTime<Utc>,
    submitted_at: Option<DateTime<Utc>>,
}

impl AnswerStore {
    /// `order` is the (possibly shuffled) presentation order. It never
    /// changes for the life of the attempt.
    pub fn new(order: Vec<i64>) -> Self {
        Self {
            order,
            answers: BTreeMap::new(),
            current: 0,
            started_at: Utc::now(),
            submitted_at: None,
        }
    }

    pub fn order(&self) -> &[i64] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted_at.is_some()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Move the cursor. Out-of-range targets are clamped to the last
    /// question.
    pub fn goto(&mut self, index: usize) {
        self.current = index.min(self.order.len().saturating_sub(1));
    }

    pub fn advance(&mut self) {
        self.goto(self.current + 1);
    }

    pub fn answer(&self, question_id: i64) -> Option<&Answer> {
        self.answers.get(&question_id)
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    /// Overwrites the current answer. The store does not validate the
    /// content against the question's options; that is the form's job.
    pub fn set_answer(&mut self, question_id: i64, answer: Answer) -> Result<()> {
        if self.submitted_at.is_some() {
            return Err(eyre!("attempt already submitted"));
        }
        self.answers.insert(question_id, answer);
        Ok(())
    }

    pub fn snapshot(&self) -> AnswerSnapshot {
        AnswerSnapshot(self.answers.clone())
    }

    /// Marks the attempt terminal. Only the first call takes effect; the
    /// timestamp is immutable afterwards.
    pub fn mark_submitted(&mut self, at: DateTime<Utc>) {
        if self.submitted_at.is_none() {
            self.submitted_at = Some(at);
        }
    }
}
