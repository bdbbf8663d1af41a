use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use trainyard::quiz::answers::Answer;
use trainyard::spawn_settled_sweeper;
use trainyard::quiz::runner::{
    AttemptRunner, Phase, ResultSink, SubmitOutcome, SubmitTrigger,
};
use trainyard::quiz::score::{QuizResult, ScorePolicy};
use trainyard::quiz::{AnswerKey, Question, QuestionKind, QuizData};

/// Records every persisted result; can be switched into failure mode.
#[derive(Clone, Default)]
struct FakeSink {
    saved: Arc<Mutex<Vec<(i64, i64, QuizResult)>>>,
    fail: Arc<AtomicBool>,
}

impl FakeSink {
    fn saved_count(&self) -> usize {
        self.saved.lock().unwrap().len()
    }

    fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl ResultSink for FakeSink {
    async fn persist_result(
        &self,
        quiz_id: i64,
        user_id: i64,
        result: &QuizResult,
    ) -> color_eyre::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(color_eyre::eyre::eyre!("storage unavailable"));
        }
        self.saved
            .lock()
            .unwrap()
            .push((quiz_id, user_id, result.clone()));
        Ok(())
    }
}

fn sample_quiz(time_limit_minutes: Option<u32>) -> QuizData {
    QuizData {
        id: 7,
        public_id: "01TESTQUIZ".to_string(),
        name: "Networking basics".to_string(),
        time_limit_minutes,
        shuffle_questions: false,
        shuffle_answers: false,
        questions: vec![
            Question {
                id: 1,
                prompt: "Which layer routes packets?".to_string(),
                kind: QuestionKind::MultipleChoice,
                options: vec!["2".to_string(), "3".to_string()],
                key: AnswerKey::Single("3".to_string()),
            },
            Question {
                id: 2,
                prompt: "Name the device that filters traffic.".to_string(),
                kind: QuestionKind::ShortAnswer,
                options: Vec::new(),
                key: AnswerKey::Single("Firewall".to_string()),
            },
        ],
    }
}

/// Lets freshly spawned tasks register their timers, and tasks woken by an
/// `advance` run to completion. Must be called once before the first
/// `advance`, otherwise the countdown task sees an already-moved clock.
async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn timer_expiry_submits_exactly_once() {
    let sink = FakeSink::default();
    let runner = AttemptRunner::start(
        sample_quiz(Some(1)),
        42,
        false,
        ScorePolicy::default(),
        sink.clone(),
    );

    settle().await;

    runner
        .set_answer(1, Answer::Single("3".to_string()))
        .unwrap();

    tokio::time::advance(Duration::from_secs(61)).await;
    settle().await;

    assert_eq!(runner.phase(), Phase::Submitted);
    assert_eq!(sink.saved_count(), 1);

    let (quiz_id, user_id, result) = sink.saved.lock().unwrap()[0].clone();
    assert_eq!(quiz_id, 7);
    assert_eq!(user_id, 42);
    assert_eq!(result.score, 1);
    assert_eq!(result.total, 2);

    // Nothing more fires after expiry.
    tokio::time::advance(Duration::from_secs(120)).await;
    settle().await;
    assert_eq!(sink.saved_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn answers_are_rejected_after_expiry() {
    let sink = FakeSink::default();
    let runner = AttemptRunner::start(
        sample_quiz(Some(1)),
        42,
        false,
        ScorePolicy::default(),
        sink.clone(),
    );
    settle().await;

    tokio::time::advance(Duration::from_secs(61)).await;
    settle().await;

    assert!(runner
        .set_answer(1, Answer::Single("3".to_string()))
        .is_err());
}

#[tokio::test(start_paused = true)]
async fn manual_submit_wins_over_later_expiry() {
    let sink = FakeSink::default();
    let runner = AttemptRunner::start(
        sample_quiz(Some(1)),
        42,
        false,
        ScorePolicy::default(),
        sink.clone(),
    );
    settle().await;

    let outcome = runner.submit(SubmitTrigger::Manual).await.unwrap();
    assert!(matches!(outcome, SubmitOutcome::Submitted(_)));

    // The countdown is stopped; its expiry never produces a second row.
    tokio::time::advance(Duration::from_secs(120)).await;
    settle().await;
    assert_eq!(sink.saved_count(), 1);
}

#[tokio::test]
async fn duplicate_submit_is_a_noop() {
    let sink = FakeSink::default();
    let runner = AttemptRunner::start(
        sample_quiz(None),
        42,
        true,
        ScorePolicy::default(),
        sink.clone(),
    );

    let first = runner.submit(SubmitTrigger::Manual).await.unwrap();
    assert!(matches!(first, SubmitOutcome::Submitted(_)));

    let second = runner.submit(SubmitTrigger::Manual).await.unwrap();
    assert!(matches!(second, SubmitOutcome::AlreadySettled));
    let third = runner.submit(SubmitTrigger::Expired).await.unwrap();
    assert!(matches!(third, SubmitOutcome::AlreadySettled));

    assert_eq!(sink.saved_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_persist_is_retryable_with_the_same_result() {
    let sink = FakeSink::default();
    sink.set_failing(true);

    let runner = AttemptRunner::start(
        sample_quiz(Some(1)),
        42,
        false,
        ScorePolicy::default(),
        sink.clone(),
    );
    settle().await;

    runner
        .set_answer(1, Answer::Single("3".to_string()))
        .unwrap();

    // Expiry hits the failing sink.
    tokio::time::advance(Duration::from_secs(61)).await;
    settle().await;

    assert_eq!(runner.phase(), Phase::Failed);
    assert_eq!(sink.saved_count(), 0);
    // The attempt is closed for answering even though nothing was saved.
    assert!(runner
        .set_answer(2, Answer::Single("Firewall".to_string()))
        .is_err());

    let failed_result = runner.result().unwrap();

    sink.set_failing(false);
    let outcome = runner.submit(SubmitTrigger::Manual).await.unwrap();
    let SubmitOutcome::Submitted(result) = outcome else {
        panic!("retry should submit");
    };

    // The retry re-sends the result scored at the original deadline.
    assert_eq!(result.score, failed_result.score);
    assert_eq!(result.taken_at, failed_result.taken_at);
    assert_eq!(runner.phase(), Phase::Submitted);
    assert_eq!(sink.saved_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn abandon_stops_the_timer_and_saves_nothing() {
    let sink = FakeSink::default();
    let runner = AttemptRunner::start(
        sample_quiz(Some(1)),
        42,
        false,
        ScorePolicy::default(),
        sink.clone(),
    );
    settle().await;

    runner.abandon();

    tokio::time::advance(Duration::from_secs(120)).await;
    settle().await;
    assert_eq!(sink.saved_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn countdown_reports_remaining_seconds() {
    let sink = FakeSink::default();
    let runner = AttemptRunner::start(
        sample_quiz(Some(1)),
        42,
        false,
        ScorePolicy::default(),
        sink.clone(),
    );
    settle().await;

    assert_eq!(runner.remaining_seconds(), Some(60));

    tokio::time::advance(Duration::from_secs(10)).await;
    settle().await;
    assert_eq!(runner.remaining_seconds(), Some(50));
}

#[tokio::test]
async fn untimed_attempts_have_no_countdown() {
    let sink = FakeSink::default();
    let runner = AttemptRunner::start(
        sample_quiz(None),
        42,
        false,
        ScorePolicy::default(),
        sink.clone(),
    );

    assert_eq!(runner.remaining_seconds(), None);
    assert_eq!(runner.phase(), Phase::Active);
}

#[tokio::test]
async fn navigation_clamps_and_counts_answers() {
    let sink = FakeSink::default();
    let runner = AttemptRunner::start(
        sample_quiz(None),
        42,
        false,
        ScorePolicy::default(),
        sink.clone(),
    );

    runner.goto(99);
    let (idx, question, _) = runner.current_question();
    assert_eq!(idx, 1);
    assert_eq!(question.id, 2);

    runner.goto(0);
    runner
        .set_answer(1, Answer::Single("3".to_string()))
        .unwrap();
    assert_eq!(runner.answered_count(), 1);

    // Saving an answer advances the cursor.
    let (idx, _, _) = runner.current_question();
    assert_eq!(idx, 1);
}

#[tokio::test]
async fn shuffling_preserves_the_question_set() {
    let mut quiz = sample_quiz(None);
    quiz.shuffle_questions = true;
    quiz.shuffle_answers = true;

    let sink = FakeSink::default();
    let runner = AttemptRunner::start(quiz, 42, false, ScorePolicy::default(), sink.clone());

    assert_eq!(runner.question_count(), 2);

    let mut seen = Vec::new();
    for idx in 0..runner.question_count() {
        runner.goto(idx);
        let (_, question, _) = runner.current_question();
        seen.push(question.id);
    }
    seen.sort_unstable();
    assert_eq!(seen, vec![1, 2]);
}

#[tokio::test]
async fn unanswered_questions_score_as_incorrect() {
    let sink = FakeSink::default();
    let runner = AttemptRunner::start(
        sample_quiz(None),
        42,
        true,
        ScorePolicy::default(),
        sink.clone(),
    );

    runner
        .set_answer(2, Answer::Single("firewall".to_string()))
        .unwrap();

    let SubmitOutcome::Submitted(result) = runner.submit(SubmitTrigger::Manual).await.unwrap()
    else {
        panic!("expected a submission");
    };

    assert_eq!(result.score, 1);
    assert_eq!(result.total, 2);
    assert!(result.is_practice);
    let unanswered = result.answered.iter().find(|a| a.question.contains("layer")).unwrap();
    assert!(!unanswered.is_correct);
    assert!(unanswered.user_answer.is_empty());
}

#[tokio::test(start_paused = true)]
async fn expired_attempts_are_swept_from_the_registry() {
    let sink = FakeSink::default();
    let runner = AttemptRunner::start(
        sample_quiz(Some(1)),
        42,
        false,
        ScorePolicy::default(),
        sink.clone(),
    );
    let token = runner.token().to_string();

    let attempts = Arc::new(Mutex::new(HashMap::from([(token.clone(), runner)])));
    spawn_settled_sweeper(Arc::clone(&attempts));
    settle().await;

    // Expiry auto-submits with no request ever coming back for the token.
    tokio::time::advance(Duration::from_secs(61)).await;
    settle().await;
    assert_eq!(sink.saved_count(), 1);

    tokio::time::advance(Duration::from_secs(120)).await;
    settle().await;
    assert!(
        attempts.lock().unwrap().is_empty(),
        "settled attempt should be swept"
    );
}

#[tokio::test(start_paused = true)]
async fn sweep_keeps_retryable_failed_attempts() {
    let sink = FakeSink::default();
    sink.set_failing(true);

    let runner = AttemptRunner::start(
        sample_quiz(Some(1)),
        42,
        false,
        ScorePolicy::default(),
        sink.clone(),
    );
    let token = runner.token().to_string();

    let attempts = Arc::new(Mutex::new(HashMap::from([(token.clone(), runner)])));
    spawn_settled_sweeper(Arc::clone(&attempts));
    settle().await;

    tokio::time::advance(Duration::from_secs(61)).await;
    settle().await;

    tokio::time::advance(Duration::from_secs(120)).await;
    settle().await;

    // The failed attempt must stay reachable for a retry.
    let attempts = attempts.lock().unwrap();
    assert_eq!(attempts.get(&token).unwrap().phase(), Phase::Failed);
}
