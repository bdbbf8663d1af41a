use std::future::Future;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use color_eyre::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use ulid::Ulid;

use super::answers::{Answer, AnswerStore};
use super::score::{score, QuizResult, ScorePolicy};
use super::timer::Countdown;
use super::{Question, QuizData};

/// Where finished attempts go. `Db` implements this against the results
/// table; tests substitute recording fakes.
pub trait ResultSink: Send + Sync + 'static {
    fn persist_result(
        &self,
        quiz_id: i64,
        user_id: i64,
        result: &QuizResult,
    ) -> impl Future<Output = Result<()>> + Send;
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Active,
    Submitting,
    Submitted,
    /// Persistence failed. Answering stays closed, the timer stays stopped,
    /// and the same submit may be retried.
    Failed,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SubmitTrigger {
    Manual,
    Expired,
}

pub enum SubmitOutcome {
    Submitted(QuizResult),
    /// A submission was already in flight or done; this trigger was a no-op.
    AlreadySettled,
}

struct RunnerState {
    store: AnswerStore,
    phase: Phase,
    /// Scored exactly once, at the first submit trigger. Kept so a retry
    /// after a persistence failure re-sends the same result.
    result: Option<QuizResult>,
}

/// Orchestrates one attempt: owns the answer store, drives the countdown,
/// and funnels manual and timeout submissions through a single guarded path.
pub struct AttemptRunner<S: ResultSink> {
    token: String,
    quiz_id: i64,
    quiz_public_id: String,
    quiz_name: String,
    user_id: i64,
    practice: bool,
    policy: ScorePolicy,
    /// Questions in presentation order, options already shuffled if the
    /// quiz asks for it.
    questions: Vec<Question>,
    sink: S,
    state: Mutex<RunnerState>,
    timer: Mutex<Option<Countdown>>,
}

impl<S: ResultSink> AttemptRunner<S> {
    /// Builds the runner and, for timed quizzes, starts the countdown whose
    /// expiry force-submits the attempt.
    pub fn start(quiz: QuizData, user_id: i64, practice: bool, policy: ScorePolicy, sink: S) -> Arc<Self> {
        let seed = rand::random::<u64>();
        let mut rng = StdRng::seed_from_u64(seed);

        let mut questions = quiz.questions.clone();
        if quiz.shuffle_questions {
            questions.shuffle(&mut rng);
        }
        if quiz.shuffle_answers {
            for q in &mut questions {
                q.options.shuffle(&mut rng);
            }
        }
        let order: Vec<i64> = questions.iter().map(|q| q.id).collect();

        let runner = Arc::new(Self {
            token: Ulid::new().to_string(),
            quiz_id: quiz.id,
            quiz_public_id: quiz.public_id.clone(),
            quiz_name: quiz.name.clone(),
            user_id,
            practice,
            policy,
            questions,
            sink,
            state: Mutex::new(RunnerState {
                store: AnswerStore::new(order),
                phase: Phase::Active,
                result: None,
            }),
            timer: Mutex::new(None),
        });

        if let Some(minutes) = quiz.time_limit_minutes {
            let expiry_runner = Arc::clone(&runner);
            let countdown = Countdown::start(minutes * 60, move || {
                // Expiry runs on its own task so stopping the countdown can
                // never cancel an in-flight submission.
                tokio::spawn(async move {
                    match expiry_runner.submit(SubmitTrigger::Expired).await {
                        Ok(_) => {}
                        Err(e) => tracing::error!(
                            "auto-submit failed for attempt {}: {e}",
                            expiry_runner.token
                        ),
                    }
                });
            });
            *runner.timer.lock().unwrap() = Some(countdown);
        }

        tracing::info!(
            "attempt {} started: quiz={} user={user_id} practice={practice}",
            runner.token,
            runner.quiz_public_id
        );
        runner
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn quiz_public_id(&self) -> &str {
        &self.quiz_public_id
    }

    pub fn quiz_name(&self) -> &str {
        &self.quiz_name
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn is_practice(&self) -> bool {
        self.practice
    }

    pub fn phase(&self) -> Phase {
        self.state.lock().unwrap().phase
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn remaining_seconds(&self) -> Option<u32> {
        self.timer.lock().unwrap().as_ref().map(Countdown::remaining)
    }

    /// The question at the cursor plus any answer already given to it.
    pub fn current_question(&self) -> (usize, Question, Option<Answer>) {
        let state = self.state.lock().unwrap();
        let index = state.store.current_index();
        let question = self.questions[index].clone();
        let answer = state.store.answer(question.id).cloned();
        (index, question, answer)
    }

    pub fn goto(&self, index: usize) {
        self.state.lock().unwrap().store.goto(index);
    }

    pub fn answered_count(&self) -> usize {
        self.state.lock().unwrap().store.answered_count()
    }

    /// Records an answer and moves the cursor forward. Rejected once the
    /// attempt has left the active phase: inputs stop being accepted the
    /// moment a submission is triggered, timeout included.
    pub fn set_answer(&self, question_id: i64, answer: Answer) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.phase != Phase::Active {
            return Err(color_eyre::eyre::eyre!("attempt is no longer active"));
        }
        state.store.set_answer(question_id, answer)?;
        state.store.advance();
        Ok(())
    }

    /// Finalizes the attempt. Both the manual action and timer expiry land
    /// here; the phase transition under the lock guarantees at-most-once
    /// persistence even when they race. A failed persistence leaves the
    /// runner in `Failed`, from which this same call retries.
    pub async fn submit(&self, trigger: SubmitTrigger) -> Result<SubmitOutcome> {
        let result = {
            let mut state = self.state.lock().unwrap();
            match state.phase {
                Phase::Active | Phase::Failed => state.phase = Phase::Submitting,
                Phase::Submitting | Phase::Submitted => {
                    return Ok(SubmitOutcome::AlreadySettled)
                }
            }

            match &state.result {
                Some(result) => result.clone(),
                None => {
                    state.store.mark_submitted(Utc::now());
                    let scored = score(&self.questions, &state.store.snapshot(), self.policy);
                    let result = QuizResult {
                        taken_at: state.store.submitted_at().unwrap_or_else(Utc::now),
                        score: scored.score,
                        total: scored.total,
                        is_practice: self.practice,
                        answered: scored.answered,
                    };
                    state.result = Some(result.clone());
                    result
                }
            }
        };

        if trigger == SubmitTrigger::Manual {
            self.stop_timer();
        }

        match self
            .sink
            .persist_result(self.quiz_id, self.user_id, &result)
            .await
        {
            Ok(()) => {
                self.state.lock().unwrap().phase = Phase::Submitted;
                tracing::info!(
                    "attempt {} submitted ({trigger:?}): {}/{}",
                    self.token,
                    result.score,
                    result.total
                );
                Ok(SubmitOutcome::Submitted(result))
            }
            Err(e) => {
                self.state.lock().unwrap().phase = Phase::Failed;
                tracing::error!("could not persist result for attempt {}: {e}", self.token);
                Err(e)
            }
        }
    }

    /// The result scored at submission time, if any. Present in `Failed`
    /// too, so the retry page can show what will be saved.
    pub fn result(&self) -> Option<QuizResult> {
        self.state.lock().unwrap().result.clone()
    }

    /// Stops the countdown and walks away without persisting anything.
    pub fn abandon(&self) {
        self.stop_timer();
        tracing::info!("attempt {} abandoned", self.token);
    }

    fn stop_timer(&self) {
        if let Some(countdown) = self.timer.lock().unwrap().take() {
            countdown.stop();
        }
    }
}
