use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use trainyard::notes::{
    CriterionScore, NoteBoard, NoteSuggester, NoteSuggestion, Ownership, SuggestionScheduler,
};

const DEBOUNCE: Duration = Duration::from_millis(500);

fn criterion(id: &str, score: i64) -> CriterionScore {
    CriterionScore {
        id: id.to_string(),
        name: id.to_string(),
        score,
    }
}

/// Drafts one note per criterion, tagged with the score it saw; optionally
/// sleeps first to simulate a slow endpoint.
struct FakeSuggester {
    calls: AtomicU32,
    delay: Duration,
    fail: bool,
}

impl FakeSuggester {
    fn immediate() -> Self {
        Self {
            calls: AtomicU32::new(0),
            delay: Duration::ZERO,
            fail: false,
        }
    }

    fn slow(delay: Duration) -> Self {
        Self {
            calls: AtomicU32::new(0),
            delay,
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            calls: AtomicU32::new(0),
            delay: Duration::ZERO,
            fail: true,
        }
    }
}

#[async_trait]
impl NoteSuggester for FakeSuggester {
    async fn suggest(
        &self,
        criteria: &[CriterionScore],
    ) -> color_eyre::Result<Vec<NoteSuggestion>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.delay > Duration::ZERO {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail {
            return Err(color_eyre::eyre::eyre!("suggestion endpoint unavailable"));
        }
        Ok(criteria
            .iter()
            .map(|c| NoteSuggestion {
                id: c.id.clone(),
                note: format!("draft for {} at score {}", c.id, c.score),
            })
            .collect())
    }
}

/// Lets freshly spawned tasks register their sleeps, and tasks woken by an
/// `advance` run to completion. Must be called after `request` and before
/// the first `advance`, otherwise the debounce sleep starts on an
/// already-moved clock.
async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

// --- Ownership transitions ---

#[test]
fn fields_start_empty() {
    let board = NoteBoard::with_fields(["participation", "autonomy"]);
    let field = board.field("participation").unwrap();
    assert_eq!(field.owner, Ownership::Empty);
    assert!(field.text.is_empty());
}

#[test]
fn user_edit_claims_the_field() {
    let mut board = NoteBoard::with_fields(["participation"]);

    board.on_user_edit("participation", "my own words");
    let field = board.field("participation").unwrap();
    assert_eq!(field.owner, Ownership::User);
    assert_eq!(field.text, "my own words");

    // An AI suggestion must not touch a user-owned field.
    assert!(!board.on_ai_suggestion("participation", "generated text"));
    assert_eq!(board.field("participation").unwrap().text, "my own words");
}

#[test]
fn clearing_returns_the_field_to_ai_eligibility() {
    let mut board = NoteBoard::with_fields(["participation"]);

    board.on_user_edit("participation", "mine");
    board.on_user_edit("participation", "");
    assert_eq!(board.field("participation").unwrap().owner, Ownership::Empty);

    assert!(board.on_ai_suggestion("participation", "generated text"));
    let field = board.field("participation").unwrap();
    assert_eq!(field.owner, Ownership::Ai);
    assert_eq!(field.text, "generated text");
}

#[test]
fn ai_replaces_its_own_earlier_draft() {
    let mut board = NoteBoard::with_fields(["participation"]);

    assert!(board.on_ai_suggestion("participation", "first draft"));
    assert!(board.on_ai_suggestion("participation", "second draft"));
    assert_eq!(board.field("participation").unwrap().text, "second draft");

    // Re-sending the same text is reported as no change.
    assert!(!board.on_ai_suggestion("participation", "second draft"));
}

#[test]
fn editing_an_ai_draft_makes_it_user_owned() {
    let mut board = NoteBoard::with_fields(["participation"]);

    board.on_ai_suggestion("participation", "generated");
    board.on_user_edit("participation", "generated, but better");

    assert_eq!(board.field("participation").unwrap().owner, Ownership::User);
    assert!(!board.on_ai_suggestion("participation", "generated again"));
}

// --- Scheduler ---

#[tokio::test(start_paused = true)]
async fn burst_of_requests_produces_one_suggestion_call() {
    let suggester = Arc::new(FakeSuggester::immediate());
    let board = Arc::new(Mutex::new(NoteBoard::with_fields(["participation"])));
    let scheduler = SuggestionScheduler::new(suggester.clone(), Arc::clone(&board), DEBOUNCE);

    scheduler.request(vec![criterion("participation", 1)]);
    scheduler.request(vec![criterion("participation", 2)]);
    scheduler.request(vec![criterion("participation", 3)]);
    settle().await;

    tokio::time::advance(DEBOUNCE).await;
    settle().await;

    assert_eq!(suggester.calls.load(Ordering::SeqCst), 1);
    // Only the last request's scores reached the suggester.
    assert_eq!(
        board.lock().unwrap().field("participation").unwrap().text,
        "draft for participation at score 3"
    );
}

#[tokio::test(start_paused = true)]
async fn in_flight_response_is_discarded_when_superseded() {
    let suggester = Arc::new(FakeSuggester::slow(Duration::from_secs(1)));
    let board = Arc::new(Mutex::new(NoteBoard::with_fields(["participation"])));
    let scheduler = SuggestionScheduler::new(suggester.clone(), Arc::clone(&board), DEBOUNCE);

    scheduler.request(vec![criterion("participation", 1)]);
    settle().await;
    // Let the first request pass the debounce and start its slow call.
    tokio::time::advance(DEBOUNCE).await;
    settle().await;
    assert_eq!(suggester.calls.load(Ordering::SeqCst), 1);

    // A newer request arrives while the first is in flight.
    scheduler.request(vec![criterion("participation", 2)]);
    settle().await;
    tokio::time::advance(DEBOUNCE).await;
    settle().await;
    tokio::time::advance(Duration::from_secs(2)).await;
    settle().await;

    // The stale response never touched the board.
    assert_eq!(
        board.lock().unwrap().field("participation").unwrap().text,
        "draft for participation at score 2"
    );
}

#[tokio::test(start_paused = true)]
async fn request_before_debounce_never_calls_the_suggester() {
    let suggester = Arc::new(FakeSuggester::immediate());
    let board = Arc::new(Mutex::new(NoteBoard::with_fields(["participation"])));
    let scheduler = SuggestionScheduler::new(suggester.clone(), Arc::clone(&board), DEBOUNCE);

    scheduler.request(vec![criterion("participation", 1)]);
    settle().await;
    tokio::time::advance(DEBOUNCE / 2).await;
    settle().await;

    assert_eq!(suggester.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn suggester_failure_changes_nothing() {
    let suggester = Arc::new(FakeSuggester::failing());
    let board = Arc::new(Mutex::new(NoteBoard::with_fields(["participation"])));
    let scheduler = SuggestionScheduler::new(suggester.clone(), Arc::clone(&board), DEBOUNCE);

    board.lock().unwrap().on_ai_suggestion("participation", "existing draft");
    scheduler.request(vec![criterion("participation", 4)]);
    settle().await;

    tokio::time::advance(DEBOUNCE).await;
    settle().await;

    assert_eq!(suggester.calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        board.lock().unwrap().field("participation").unwrap().text,
        "existing draft"
    );
}

#[tokio::test(start_paused = true)]
async fn user_owned_fields_survive_scheduled_suggestions() {
    let suggester = Arc::new(FakeSuggester::immediate());
    let board = Arc::new(Mutex::new(NoteBoard::with_fields([
        "participation",
        "autonomy",
    ])));
    let scheduler = SuggestionScheduler::new(suggester.clone(), Arc::clone(&board), DEBOUNCE);

    board.lock().unwrap().on_user_edit("participation", "handwritten");

    scheduler.request(vec![criterion("participation", 2), criterion("autonomy", 5)]);
    settle().await;
    tokio::time::advance(DEBOUNCE).await;
    settle().await;

    let board = board.lock().unwrap();
    assert_eq!(board.field("participation").unwrap().text, "handwritten");
    assert_eq!(board.field("participation").unwrap().owner, Ownership::User);
    assert_eq!(
        board.field("autonomy").unwrap().text,
        "draft for autonomy at score 5"
    );
    assert_eq!(board.field("autonomy").unwrap().owner, Ownership::Ai);
}
