mod question;
mod results;

pub use question::{countdown_fragment, question, submit_failed, QuestionData};
pub use results::{result_detail, results_list, submitted, ResultDetailData, ResultsListData};

use maud::{html, Markup};

use crate::names;

pub struct StartPageData {
    pub quiz_name: String,
    pub public_id: String,
    pub total_questions: i64,
    pub time_limit_minutes: Option<i64>,
    /// Present when a graded attempt already exists, which blocks another
    /// graded run for non-admins.
    pub graded_done: bool,
    pub is_admin: bool,
}

pub fn start_page(data: StartPageData) -> Markup {
    let graded_blocked = data.graded_done && !data.is_admin;

    html! {
        h1 { (data.quiz_name) }
        article {
            p {
                (data.total_questions) " questions"
                @if let Some(min) = data.time_limit_minutes {
                    ", " (min) " minute time limit"
                }
                "."
            }

            @if data.graded_done {
                p { "You already have a graded result for this quiz." }
            }

            form hx-post=(names::start_attempt_url(&data.public_id))
                 hx-target="main"
                 hx-swap="innerHTML" {
                @if graded_blocked {
                    input type="hidden" name="practice" value="on";
                    p { "Further attempts run in practice mode and do not count toward your grade." }
                } @else {
                    label {
                        input type="checkbox" name="practice";
                        "Practice mode (result will not count toward your grade)"
                    }
                }
                button type="submit" { "Start" }
            }
        }
    }
}
