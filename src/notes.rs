// Evaluation note co-authoring: ownership tracking for free-text note
// fields plus the debounced AI suggestion scheduler.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Who last set a note field's content. A field the human has typed into is
/// theirs until they clear it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Ownership {
    Empty,
    Ai,
    User,
}

impl Ownership {
    pub fn as_str(self) -> &'static str {
        match self {
            Ownership::Empty => "empty",
            Ownership::Ai => "ai",
            Ownership::User => "user",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "empty" => Some(Ownership::Empty),
            "ai" => Some(Ownership::Ai),
            "user" => Some(Ownership::User),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct NoteField {
    pub text: String,
    pub owner: Ownership,
}

/// One note field per evaluation criterion, keyed by criterion id.
#[derive(Default)]
pub struct NoteBoard {
    fields: BTreeMap<String, NoteField>,
}

impl NoteBoard {
    pub fn with_fields<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            fields: ids
                .into_iter()
                .map(|id| {
                    (
                        id.into(),
                        NoteField {
                            text: String::new(),
                            owner: Ownership::Empty,
                        },
                    )
                })
                .collect(),
        }
    }

    pub fn field(&self, id: &str) -> Option<&NoteField> {
        self.fields.get(id)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &NoteField)> {
        self.fields.iter().map(|(id, f)| (id.as_str(), f))
    }

    /// A human edit. Non-empty text claims the field for the user; clearing
    /// it returns the field to `Empty`, eligible for AI ownership again.
    pub fn on_user_edit(&mut self, id: &str, text: &str) {
        let field = self.fields.entry(id.to_string()).or_insert(NoteField {
            text: String::new(),
            owner: Ownership::Empty,
        });
        if text.is_empty() {
            field.text.clear();
            field.owner = Ownership::Empty;
        } else {
            field.text = text.to_string();
            field.owner = Ownership::User;
        }
    }

    /// An AI suggestion. Applied only to fields the user does not own;
    /// returns whether the field changed.
    pub fn on_ai_suggestion(&mut self, id: &str, text: &str) -> bool {
        let Some(field) = self.fields.get_mut(id) else {
            return false;
        };
        match field.owner {
            Ownership::User => false,
            Ownership::Empty | Ownership::Ai => {
                if field.text == text {
                    return false;
                }
                field.text = text.to_string();
                field.owner = Ownership::Ai;
                true
            }
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct CriterionScore {
    pub id: String,
    pub name: String,
    pub score: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NoteSuggestion {
    pub id: String,
    pub note: String,
}

/// The AI collaborator, as seen from the scheduler. Object-safe so the
/// application can pick an implementation at startup.
#[async_trait]
pub trait NoteSuggester: Send + Sync {
    async fn suggest(&self, criteria: &[CriterionScore]) -> color_eyre::Result<Vec<NoteSuggestion>>;
}

/// Collapses bursts of score changes into one suggestion request and
/// discards stale responses: every request bumps a monotonic sequence, and
/// only the task still matching the latest sequence may touch the board.
pub struct SuggestionScheduler {
    suggester: Arc<dyn NoteSuggester>,
    board: Arc<Mutex<NoteBoard>>,
    seq: Arc<AtomicU64>,
    pending: Mutex<Option<tokio::task::JoinHandle<()>>>,
    debounce: Duration,
}

impl SuggestionScheduler {
    pub fn new(
        suggester: Arc<dyn NoteSuggester>,
        board: Arc<Mutex<NoteBoard>>,
        debounce: Duration,
    ) -> Self {
        Self {
            suggester,
            board,
            seq: Arc::new(AtomicU64::new(0)),
            pending: Mutex::new(None),
            debounce,
        }
    }

    /// Cancel any pending request and schedule a new one after the debounce
    /// window. Suggester failures log a warning and change nothing.
    pub fn request(&self, criteria: Vec<CriterionScore>) {
        let id = self.seq.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(prev) = self.pending.lock().unwrap().take() {
            prev.abort();
        }

        let suggester = Arc::clone(&self.suggester);
        let board = Arc::clone(&self.board);
        let seq = Arc::clone(&self.seq);
        let debounce = self.debounce;

        let task = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if seq.load(Ordering::SeqCst) != id {
                return;
            }

            match suggester.suggest(&criteria).await {
                Ok(suggestions) => {
                    // A newer request may have been issued while this one
                    // was in flight; its response must not clobber state.
                    if seq.load(Ordering::SeqCst) != id {
                        return;
                    }
                    let mut board = board.lock().unwrap();
                    for s in &suggestions {
                        board.on_ai_suggestion(&s.id, &s.note);
                    }
                }
                Err(e) => tracing::warn!("note suggestion request failed: {e}"),
            }
        });

        *self.pending.lock().unwrap() = Some(task);
    }
}

impl Drop for SuggestionScheduler {
    fn drop(&mut self) {
        if let Some(task) = self.pending.lock().unwrap().take() {
            task.abort();
        }
    }
}
