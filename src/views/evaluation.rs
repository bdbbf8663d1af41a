use maud::{html, Markup};

use crate::db::{CriterionRow, EvaluationRow};
use crate::names;
use crate::notes::Ownership;

pub struct DraftCriterion {
    pub id: String,
    pub name: String,
    pub score: Option<i64>,
    pub note: String,
    pub note_owner: Ownership,
}

pub struct DraftData {
    pub token: String,
    pub student_name: String,
    pub overall_rating: Option<i64>,
    pub criteria: Vec<DraftCriterion>,
}

pub fn draft_form(data: DraftData) -> Markup {
    html! {
        h1 { "Evaluation - " (data.student_name) }
        p style="color: #666;" {
            "Notes draft themselves from the scores. A note you have edited stays yours; clear it to hand it back."
        }

        article {
            label {
                "Overall rating"
                select name="rating"
                       hx-post=(names::evaluation_rating_url(&data.token))
                       hx-trigger="change"
                       hx-target="main" {
                    option value="" selected[data.overall_rating.is_none()] { "-" }
                    @for value in names::MIN_CRITERION_SCORE..=names::MAX_CRITERION_SCORE {
                        option value=(value) selected[data.overall_rating == Some(value)] { (value) }
                    }
                }
            }
        }

        @for criterion in &data.criteria {
            article id=(format!("criterion-{}", criterion.id)) {
                h4 { (criterion.name) }
                label {
                    "Score"
                    select name="score"
                           hx-post=(names::evaluation_score_url(&data.token))
                           hx-trigger="change"
                           hx-target="main"
                           hx-vals=(format!(r#"{{"criterion":"{}"}}"#, criterion.id)) {
                        option value="" selected[criterion.score.is_none()] { "-" }
                        @for value in names::MIN_CRITERION_SCORE..=names::MAX_CRITERION_SCORE {
                            option value=(value) selected[criterion.score == Some(value)] { (value) }
                        }
                    }
                }
                label {
                    "Note"
                    textarea name="note"
                             class=(note_class(criterion.note_owner))
                             hx-post=(names::evaluation_note_url(&data.token))
                             hx-trigger="change"
                             hx-target="main"
                             hx-vals=(format!(r#"{{"criterion":"{}"}}"#, criterion.id))
                             rows="3" {
                        (criterion.note)
                    }
                }
                @if criterion.note_owner == Ownership::Ai {
                    small style="color: #666;" { "Drafted by AI - edit to make it yours." }
                }
            }
        }

        div style="display: flex; gap: 1rem;" {
            button hx-post=(names::evaluation_save_url(&data.token))
                   hx-target="main" {
                "Save evaluation"
            }
        }
    }
}

fn note_class(owner: Ownership) -> &'static str {
    match owner {
        Ownership::Ai => "note-ai",
        _ => "",
    }
}

pub struct SavedData {
    pub student_name: String,
    pub evaluation: EvaluationRow,
    pub criteria: Vec<CriterionRow>,
}

pub fn saved_view(data: SavedData) -> Markup {
    html! {
        h1 { "Evaluation - " (data.student_name) }
        p style="color: #666;" { "Created " (data.evaluation.created_at) }

        @if let Some(rating) = data.evaluation.overall_rating {
            p { "Overall rating: " strong { (rating) " / " (names::MAX_CRITERION_SCORE) } }
        }

        table {
            thead {
                tr { th { "Criterion" } th { "Score" } th { "Note" } }
            }
            tbody {
                @for c in &data.criteria {
                    tr {
                        td { (c.name) }
                        td {
                            @match c.score {
                                Some(s) => { (s) },
                                None => { "-" },
                            }
                        }
                        td {
                            (c.note)
                            @if Ownership::from_str(&c.note_owner) == Some(Ownership::Ai) {
                                " "
                                small style="color: #666;" { "Drafted by AI" }
                            }
                        }
                    }
                }
            }
        }
    }
}
