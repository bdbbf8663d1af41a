use axum::{
    extract::{Form, State},
    http::{header::SET_COOKIE, HeaderMap},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use axum_extra::extract::CookieJar;
use maud::Markup;
use serde::Deserialize;

use crate::{
    extractors::IsHtmx,
    names,
    rejections::{AppError, ResultExt},
    utils, views,
    views::homepage as homepage_views,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(homepage))
        .route("/login", get(login_page).post(login_post))
        .route("/logout", post(logout_post))
}

async fn homepage(
    State(state): State<AppState>,
    jar: CookieJar,
    IsHtmx(is_htmx): IsHtmx,
) -> Result<Markup, AppError> {
    let user = match jar.get(names::USER_SESSION_COOKIE_NAME) {
        Some(cookie) => state
            .db
            .get_user_by_session(cookie.value())
            .await
            .reject("could not look up session")?,
        None => None,
    };

    let Some(user) = user else {
        return Ok(views::render(
            is_htmx,
            "Sign in",
            homepage_views::login(homepage_views::LoginState::NoError),
        ));
    };

    let quizzes = state.db.quizzes().await.reject("could not get quizzes")?;

    let body = if user.is_admin() {
        let mut students = Vec::new();
        for student in state.db.students().await.reject("could not get students")? {
            let evaluations = state
                .db
                .evaluations_for(student.id)
                .await
                .reject("could not get evaluations")?;
            students.push(homepage_views::AdminStudentEntry {
                student,
                evaluations,
            });
        }
        homepage_views::admin_home(homepage_views::AdminHomeData {
            display_name: user.display_name,
            quizzes,
            students,
        })
    } else {
        let graded_average = state
            .db
            .graded_average(user.id)
            .await
            .reject("could not get graded average")?;
        homepage_views::student_home(homepage_views::StudentHomeData {
            display_name: user.display_name,
            quizzes,
            graded_average,
        })
    };

    Ok(views::render(is_htmx, "Home", body))
}

async fn login_page(IsHtmx(is_htmx): IsHtmx) -> Markup {
    views::render(
        is_htmx,
        "Sign in",
        homepage_views::login(homepage_views::LoginState::NoError),
    )
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login_post(
    State(state): State<AppState>,
    IsHtmx(is_htmx): IsHtmx,
    Form(body): Form<LoginBody>,
) -> Result<axum::response::Response, AppError> {
    let user = state
        .db
        .verify_password(&body.email, &body.password)
        .await
        .reject("could not verify credentials")?;

    let Some(user) = user else {
        tracing::warn!("failed login for {}", body.email);
        let page = views::render(
            is_htmx,
            "Sign in",
            homepage_views::login(homepage_views::LoginState::BadCredentials),
        );
        return Ok(page.into_response());
    };

    let session_id = state
        .db
        .create_user_session(user.id)
        .await
        .reject("could not create session")?;

    let cookie = utils::cookie(
        names::USER_SESSION_COOKIE_NAME,
        &session_id,
        state.secure_cookies,
    );
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie.parse().reject("could not build cookie")?);
    headers.insert(
        "HX-Redirect",
        "/".parse().reject("could not build redirect")?,
    );

    tracing::info!("user {} signed in", user.id);
    Ok((headers, "").into_response())
}

async fn logout_post(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<axum::response::Response, AppError> {
    if let Some(cookie) = jar.get(names::USER_SESSION_COOKIE_NAME) {
        if let Err(e) = state.db.delete_user_session(cookie.value()).await {
            tracing::warn!("could not delete session: {e}");
        }
    }

    let mut headers = HeaderMap::new();
    headers.insert(
        SET_COOKIE,
        utils::clear_cookie(names::USER_SESSION_COOKIE_NAME)
            .parse()
            .reject("could not build cookie")?,
    );
    headers.insert(
        "HX-Redirect",
        "/".parse().reject("could not build redirect")?,
    );

    Ok((headers, "").into_response())
}
