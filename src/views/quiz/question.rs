use maud::{html, Markup};

use crate::names;
use crate::quiz::answers::Answer;
use crate::quiz::{Question, QuestionKind};
use crate::utils;

pub struct QuestionData {
    pub quiz_name: String,
    pub token: String,
    pub question: Question,
    pub question_idx: usize,
    pub questions_count: usize,
    pub answered_count: usize,
    pub current_answer: Option<Answer>,
    pub remaining_seconds: Option<u32>,
    pub is_practice: bool,
}

pub fn question(data: QuestionData) -> Markup {
    let selected_single = match &data.current_answer {
        Some(Answer::Single(s)) => Some(s.as_str()),
        _ => None,
    };
    let is_checked = |opt: &str| match &data.current_answer {
        Some(Answer::Multi(set)) => set.contains(opt),
        _ => false,
    };

    html! {
        p {
            "Taking " mark { (data.quiz_name) }
            @if data.is_practice { " (practice)" }
            "."
        }
        article style="width: fit-content;" {
            div style="display: flex; align-items: center; margin-bottom: 0.5rem;" {
                p style="color: #666; font-size: 0.9rem; margin-bottom: 0;" {
                    "Question " strong { (data.question_idx + 1) } " of " (data.questions_count)
                }
                @if let Some(remaining) = data.remaining_seconds {
                    span style="margin-left: auto;" {
                        (countdown_fragment(&data.token, remaining))
                    }
                }
            }

            h3 { (data.question.prompt) }

            @if data.question.kind == QuestionKind::Checkbox {
                p style="color: #0066cc; font-weight: 500;" { "Select all that apply" }
            }

            form hx-post=(names::attempt_answer_url(&data.token))
                 hx-target="main"
                 hx-swap="innerHTML"
                 id="question-form" {
                @match data.question.kind {
                    QuestionKind::MultipleChoice => {
                        fieldset {
                            @for opt in &data.question.options {
                                label {
                                    @if selected_single == Some(opt.as_str()) {
                                        input type="radio" name="option" value=(opt) checked;
                                    } @else {
                                        input type="radio" name="option" value=(opt);
                                    }
                                    (opt)
                                }
                            }
                        }
                    },
                    QuestionKind::Checkbox => {
                        fieldset {
                            @for opt in &data.question.options {
                                label {
                                    @if is_checked(opt) {
                                        input type="checkbox" name="options" value=(opt) checked;
                                    } @else {
                                        input type="checkbox" name="options" value=(opt);
                                    }
                                    (opt)
                                }
                            }
                        }
                    },
                    QuestionKind::ShortAnswer => {
                        label {
                            "Your answer"
                            input type="text" name="text" value=(selected_single.unwrap_or(""));
                        }
                    },
                }

                div style="display: flex; gap: 1rem; margin-top: 1rem; align-items: center;" {
                    @if data.question_idx > 0 {
                        button type="button" class="secondary"
                               hx-get=(names::attempt_goto_url(&data.token, data.question_idx - 1))
                               hx-target="main"
                               hx-swap="innerHTML" {
                            "Previous"
                        }
                    }
                    button type="submit" { "Save answer" }
                    @if data.question_idx + 1 < data.questions_count {
                        button type="button" class="secondary"
                               hx-get=(names::attempt_goto_url(&data.token, data.question_idx + 1))
                               hx-target="main"
                               hx-swap="innerHTML" {
                            "Next"
                        }
                    }
                }
            }

            div style="margin-top: 1.5rem; display: flex; gap: 1rem;" {
                button hx-post=(names::attempt_submit_url(&data.token))
                       hx-confirm=(submit_prompt(data.answered_count, data.questions_count))
                       hx-target="main" {
                    "Submit quiz"
                }
                button class="danger"
                       hx-post=(names::attempt_abandon_url(&data.token))
                       hx-confirm="Abandon this attempt? Nothing will be saved."
                       hx-target="main" {
                    "Abandon"
                }
            }
        }
    }
}

fn submit_prompt(answered: usize, total: usize) -> String {
    if answered < total {
        format!("You answered {answered} of {total} questions. Unanswered questions count as incorrect. Submit anyway?")
    } else {
        "Submit your answers?".to_string()
    }
}

/// Self-refreshing countdown. Polls once a second; the server reads the
/// timer's watch channel, so a finished attempt swaps in the results page
/// via HX-Redirect instead.
pub fn countdown_fragment(token: &str, remaining: u32) -> Markup {
    let class = if remaining <= 30 {
        "countdown low"
    } else {
        "countdown"
    };
    html! {
        span class=(class)
             hx-get=(names::attempt_remaining_url(token))
             hx-trigger="every 1s"
             hx-swap="outerHTML" {
            (utils::format_remaining(remaining))
        }
    }
}

/// Persistence failed: the attempt is closed for answering but the same
/// submission can be retried.
pub fn submit_failed(token: &str) -> Markup {
    html! {
        article {
            h3 { "Your result could not be saved" }
            p { "Time is up for this attempt, but the result was not stored. Your answers are kept; try again." }
            button hx-post=(names::attempt_submit_url(token))
                   hx-target="main" {
                "Retry saving"
            }
        }
    }
}
