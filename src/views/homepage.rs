use maud::{html, Markup};

use crate::db::{EvaluationRow, QuizListRow, StudentRow};
use crate::names;

pub enum LoginState {
    NoError,
    BadCredentials,
}

pub fn login(state: LoginState) -> Markup {
    html! {
        h1 { "Sign in" }
        @if matches!(state, LoginState::BadCredentials) {
            p style="color: var(--danger);" { "Email or password is incorrect." }
        }
        form hx-post=(names::LOGIN_URL) hx-target="main" hx-swap="innerHTML" {
            label {
                "Email"
                input type="email" name="email" required;
            }
            label {
                "Password"
                input type="password" name="password" required;
            }
            button type="submit" { "Sign in" }
        }
    }
}

pub struct StudentHomeData {
    pub display_name: String,
    pub quizzes: Vec<QuizListRow>,
    pub graded_average: Option<f64>,
}

pub fn student_home(data: StudentHomeData) -> Markup {
    html! {
        h1 { "Welcome, " (data.display_name) }

        @if let Some(avg) = data.graded_average {
            p { "Graded average so far: " strong { (format!("{avg:.1}%")) } }
        }

        h2 { "Quizzes" }
        @if data.quizzes.is_empty() {
            p { "No quizzes are available yet." }
        } @else {
            table {
                thead {
                    tr { th { "Quiz" } th { "Questions" } th { "Time limit" } th {} }
                }
                tbody {
                    @for quiz in &data.quizzes {
                        tr {
                            td { (quiz.name) }
                            td { (quiz.question_count) }
                            td {
                                @match quiz.time_limit_minutes {
                                    Some(min) => { (min) " min" },
                                    None => { "untimed" },
                                }
                            }
                            td {
                                button hx-get=(names::quiz_page_url(&quiz.public_id))
                                       hx-push-url="true"
                                       hx-target="main" {
                                    "Take"
                                }
                                " "
                                button class="secondary"
                                       hx-get=(names::results_url(&quiz.public_id))
                                       hx-push-url="true"
                                       hx-target="main" {
                                    "Results"
                                }
                            }
                        }
                    }
                }
            }
        }

        (logout_button())
    }
}

pub struct AdminStudentEntry {
    pub student: StudentRow,
    pub evaluations: Vec<EvaluationRow>,
}

pub struct AdminHomeData {
    pub display_name: String,
    pub quizzes: Vec<QuizListRow>,
    pub students: Vec<AdminStudentEntry>,
}

pub fn admin_home(data: AdminHomeData) -> Markup {
    html! {
        h1 { "Admin - " (data.display_name) }

        h2 { "Quizzes" }
        table {
            thead {
                tr { th { "Quiz" } th { "Questions" } th {} }
            }
            tbody {
                @for quiz in &data.quizzes {
                    tr {
                        td { (quiz.name) }
                        td { (quiz.question_count) }
                        td {
                            button hx-get=(names::quiz_page_url(&quiz.public_id))
                                   hx-push-url="true"
                                   hx-target="main" {
                                "Open"
                            }
                            " "
                            button class="danger"
                                   hx-post=(names::delete_quiz_url(&quiz.public_id))
                                   hx-confirm="Delete this quiz and all of its results?"
                                   hx-target="main" {
                                "Delete"
                            }
                        }
                    }
                }
            }
        }

        h2 { "Students" }
        @if data.students.is_empty() {
            p { "No students registered." }
        } @else {
            table {
                thead {
                    tr { th { "Name" } th { "Email" } th { "Evaluations" } th {} }
                }
                tbody {
                    @for entry in &data.students {
                        tr {
                            td { (entry.student.display_name) }
                            td { (entry.student.email) }
                            td {
                                @if entry.evaluations.is_empty() {
                                    em { "none yet" }
                                }
                                @for evaluation in &entry.evaluations {
                                    button class="secondary"
                                           hx-get=(names::evaluation_view_url(evaluation.id))
                                           hx-push-url="true"
                                           hx-target="main" {
                                        (evaluation.created_at)
                                    }
                                    " "
                                }
                            }
                            td {
                                button hx-post=(names::new_evaluation_url(entry.student.id))
                                       hx-target="main" {
                                    "New evaluation"
                                }
                            }
                        }
                    }
                }
            }
        }

        (logout_button())
    }
}

fn logout_button() -> Markup {
    html! {
        form hx-post=(names::LOGOUT_URL) hx-target="main" style="margin-top: 2rem;" {
            button type="submit" class="secondary" { "Sign out" }
        }
    }
}
