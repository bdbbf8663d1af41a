use maud::{html, Markup};

use crate::db::ResultSummaryRow;
use crate::names;
use crate::quiz::score::QuizResult;

/// Shown right after a successful submission.
pub fn submitted(quiz_name: &str, public_id: &str, result: &QuizResult) -> Markup {
    html! {
        h1 { (quiz_name) }
        article {
            h3 {
                "Score: " (result.score) " / " (result.total)
                @if result.is_practice { " (practice)" }
            }
            (answers_table(result))
            button hx-get=(names::results_url(public_id))
                   hx-push-url="true"
                   hx-target="main" {
                "All results"
            }
        }
    }
}

pub struct ResultsListData {
    pub quiz_name: String,
    pub public_id: String,
    pub results: Vec<ResultSummaryRow>,
}

pub fn results_list(data: ResultsListData) -> Markup {
    html! {
        h1 { (data.quiz_name) " - results" }
        @if data.results.is_empty() {
            p { "No attempts yet." }
        } @else {
            table {
                thead {
                    tr { th { "Date" } th { "Score" } th { "Mode" } th {} }
                }
                tbody {
                    @for r in &data.results {
                        tr {
                            td { (r.taken_at) }
                            td { (r.score) " / " (r.total) }
                            td { @if r.is_practice != 0 { "practice" } @else { "graded" } }
                            td {
                                button class="secondary"
                                       hx-get=(names::result_detail_url(r.id))
                                       hx-push-url="true"
                                       hx-target="main" {
                                    "Details"
                                }
                            }
                        }
                    }
                }
            }
        }
        button hx-get=(names::quiz_page_url(&data.public_id))
               hx-push-url="true"
               hx-target="main" {
            "Back to quiz"
        }
    }
}

pub struct ResultDetailData {
    pub quiz_name: String,
    pub public_id: String,
    pub result: QuizResult,
}

pub fn result_detail(data: ResultDetailData) -> Markup {
    html! {
        h1 { (data.quiz_name) }
        article {
            h3 {
                (data.result.score) " / " (data.result.total)
                @if data.result.is_practice { " (practice)" }
            }
            p style="color: #666;" { "Taken " (data.result.taken_at.format("%Y-%m-%d %H:%M UTC")) }
            (answers_table(&data.result))
            button hx-get=(names::results_url(&data.public_id))
                   hx-push-url="true"
                   hx-target="main" {
                "Back"
            }
        }
    }
}

fn answers_table(result: &QuizResult) -> Markup {
    html! {
        table {
            thead {
                tr { th { "Question" } th { "Your answer" } th { "Correct answer" } th {} }
            }
            tbody {
                @for a in &result.answered {
                    tr {
                        td { (a.question) }
                        td {
                            @if a.user_answer.is_empty() {
                                em { "unanswered" }
                            } @else {
                                (a.user_answer)
                            }
                        }
                        td { (a.correct_answer) }
                        td {
                            @if a.is_correct {
                                span class="correct" { "\u{2713}" }
                            } @else {
                                span class="incorrect" { "\u{2717}" }
                            }
                        }
                    }
                }
            }
        }
    }
}
