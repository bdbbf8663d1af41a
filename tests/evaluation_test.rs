mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use tower::ServiceExt;
use trainyard::ai::NullSuggester;
use trainyard::db::{CriterionRow, Db, EvaluationRow};
use trainyard::notes::Ownership;
use trainyard::views::evaluation as evaluation_views;
use trainyard::{names, router, AppState};

fn app(db: Db) -> axum::Router {
    router(AppState::new(db, false, Arc::new(NullSuggester)))
}

async fn admin_cookie(db: &Db) -> String {
    db.ensure_admin("admin@example.com", "pw").await.unwrap();
    let user = db
        .verify_password("admin@example.com", "pw")
        .await
        .unwrap()
        .unwrap();
    let session = db.create_user_session(user.id).await.unwrap();
    format!("{}={}", names::USER_SESSION_COOKIE_NAME, session)
}

fn form_post(uri: &str, cookie: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("cookie", cookie)
        .header("HX-Request", "true")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

fn page_get(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header("cookie", cookie)
        .body(Body::empty())
        .unwrap()
}

async fn body_string(resp: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn hx_redirect_target(resp: &axum::response::Response) -> String {
    resp.headers()
        .get("HX-Redirect")
        .and_then(|v| v.to_str().ok())
        .expect("response should carry an HX-Redirect")
        .to_string()
}

#[tokio::test]
async fn draft_flow_saves_and_shows_the_evaluation() {
    let db = common::create_test_db().await;
    let cookie = admin_cookie(&db).await;
    let student_id = db
        .create_user("s@example.com", "pw", "Sam Carter", names::ROLE_STUDENT)
        .await
        .unwrap();
    let app = app(db);

    // Open a draft; the redirect carries its token.
    let resp = app
        .clone()
        .oneshot(form_post(
            &names::new_evaluation_url(student_id),
            &cookie,
            "",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let draft_url = hx_redirect_target(&resp);
    assert!(draft_url.starts_with("/evaluation/draft/"));

    let resp = app
        .clone()
        .oneshot(page_get(&draft_url, &cookie))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let page = body_string(resp).await;
    assert!(page.contains("Sam Carter"));

    // Fill in a score, a handwritten note and the overall rating.
    let resp = app
        .clone()
        .oneshot(form_post(
            &format!("{draft_url}/score"),
            &cookie,
            "criterion=participation&score=4",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .clone()
        .oneshot(form_post(
            &format!("{draft_url}/note"),
            &cookie,
            "criterion=participation&note=Shows+up+prepared",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .clone()
        .oneshot(form_post(
            &format!("{draft_url}/rating"),
            &cookie,
            "rating=5",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Save and follow the redirect to the stored evaluation.
    let resp = app
        .clone()
        .oneshot(form_post(&format!("{draft_url}/save"), &cookie, ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let saved_url = hx_redirect_target(&resp);
    assert!(saved_url.starts_with("/evaluation/"));

    let resp = app
        .clone()
        .oneshot(page_get(&saved_url, &cookie))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let page = body_string(resp).await;
    assert!(page.contains("Sam Carter"));
    assert!(page.contains("Shows up prepared"));
    assert!(page.contains("5 / 5"));

    // The saved draft is gone; its token no longer resolves.
    let resp = app
        .clone()
        .oneshot(page_get(&draft_url, &cookie))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // The admin home links to the saved evaluation under the student.
    let resp = app.oneshot(page_get("/", &cookie)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let home = body_string(resp).await;
    assert!(home.contains("Sam Carter"));
    assert!(home.contains(&saved_url));
}

#[tokio::test]
async fn scoring_an_unknown_criterion_is_rejected() {
    let db = common::create_test_db().await;
    let cookie = admin_cookie(&db).await;
    let student_id = db
        .create_user("s@example.com", "pw", "Sam Carter", names::ROLE_STUDENT)
        .await
        .unwrap();
    let app = app(db);

    let resp = app
        .clone()
        .oneshot(form_post(
            &names::new_evaluation_url(student_id),
            &cookie,
            "",
        ))
        .await
        .unwrap();
    let draft_url = hx_redirect_target(&resp);

    let resp = app
        .oneshot(form_post(
            &format!("{draft_url}/score"),
            &cookie,
            "criterion=attendance&score=3",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

fn criterion_row(name: &str, note: &str, owner: Ownership) -> CriterionRow {
    CriterionRow {
        name: name.to_string(),
        score: Some(3),
        note: note.to_string(),
        note_owner: owner.as_str().to_string(),
    }
}

#[test]
fn saved_view_tags_ai_drafted_notes() {
    let markup = evaluation_views::saved_view(evaluation_views::SavedData {
        student_name: "Sam Carter".to_string(),
        evaluation: EvaluationRow {
            id: 1,
            student_id: 2,
            author_id: 3,
            created_at: "2026-08-24 10:00:00".to_string(),
            overall_rating: Some(4),
        },
        criteria: vec![
            criterion_row("Participation", "drafted from the scores", Ownership::Ai),
            criterion_row("Autonomy", "written by hand", Ownership::User),
        ],
    });

    let page = markup.into_string();
    let tagged: Vec<_> = page.match_indices("Drafted by AI").collect();
    assert_eq!(tagged.len(), 1, "only the AI-owned note carries the tag");
    let ai_note = page.find("drafted from the scores").unwrap();
    let user_note = page.find("written by hand").unwrap();
    assert!(tagged[0].0 > ai_note && tagged[0].0 < user_note);
}
