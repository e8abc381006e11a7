//! HTTP routes.
//!
//! | Method | Path                     | Action                                  |
//! |--------|--------------------------|-----------------------------------------|
//! | GET    | `/`                      | redirect to `/home` or `/login`         |
//! | GET    | `/login`                 | login form                              |
//! | POST   | `/login`                 | authenticate, start a session           |
//! | GET    | `/create_user`           | registration form                       |
//! | POST   | `/create_user`           | create an account                       |
//! | GET    | `/home`                  | player page (runs catch-up in auto mode)|
//! | POST   | `/adventure`             | one manual adventure                    |
//! | POST   | `/buy/:item`             | shop purchase                           |
//! | POST   | `/toggle_auto_adventure` | flip auto mode                          |
//! | GET    | `/get_gold`, `/get_xp`   | plain-text poll (runs catch-up)         |
//! | GET    | `/api/state`             | JSON player state                       |
//! | POST   | `/logout`                | end the session                         |
//! | GET    | `/metrics`               | JSON counters                           |

use std::sync::Arc;

use axum::{
    extract::{Form, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use log::error;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::actions::GameActions;
use super::errors::{ActionError, AuthError};
use super::render;
use crate::game::shop::display_name;
use crate::game::{xp_threshold, Barbarian, ShopError};
use crate::logutil::escape_log;
use crate::metrics;
use crate::validation::{is_valid_session_token, validate_item_id};

pub const SESSION_COOKIE: &str = "barbarian_session";

/// Text shown on the site header and login page.
#[derive(Debug, Clone)]
pub struct SiteInfo {
    pub name: String,
    pub welcome: String,
}

#[derive(Clone)]
pub struct AppState {
    pub actions: Arc<GameActions>,
    pub site: Arc<SiteInfo>,
}

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
struct StateView<'a> {
    username: &'a str,
    #[serde(flatten)]
    barbarian: &'a Barbarian,
    xp_threshold: u64,
    xp_to_next_level: u64,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/login", get(login_form).post(login_submit))
        .route("/create_user", get(create_user_form).post(create_user_submit))
        .route("/home", get(home))
        .route("/adventure", post(adventure))
        .route("/buy/:item", post(buy))
        .route("/toggle_auto_adventure", post(toggle_auto_adventure))
        .route("/get_gold", get(get_gold))
        .route("/get_xp", get(get_xp))
        .route("/api/state", get(api_state))
        .route("/logout", post(logout))
        .route("/metrics", get(metrics_json))
        .with_state(state)
}

/// Session token from the request cookies, if it is well formed.
pub fn session_token(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .map(|c| c.value())
        .filter(|token| is_valid_session_token(token))
        .map(str::to_string)
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

fn missing_player() -> Response {
    (StatusCode::UNAUTHORIZED, ActionError::MissingPlayer.to_string()).into_response()
}

fn action_error_response(err: ActionError) -> Response {
    match err {
        ActionError::MissingPlayer => missing_player(),
        ActionError::Shop(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
        ActionError::Store(e) => {
            error!("Store failure: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
        }
    }
}

async fn root(State(app): State<AppState>, jar: CookieJar) -> Redirect {
    let logged_in = match session_token(&jar) {
        Some(token) => app.actions.username(&token).await.is_some(),
        None => false,
    };
    if logged_in {
        Redirect::to("/home")
    } else {
        Redirect::to("/login")
    }
}

async fn login_form(State(app): State<AppState>) -> Html<String> {
    Html(render::login_page(&app.site.name, &app.site.welcome, None))
}

async fn login_submit(
    State(app): State<AppState>,
    jar: CookieJar,
    Form(creds): Form<Credentials>,
) -> Response {
    match app.actions.login(&creds.username, &creds.password).await {
        Ok(outcome) => (jar.add(session_cookie(outcome.token)), Redirect::to("/home")).into_response(),
        Err(AuthError::UnknownUser) => (
            StatusCode::UNAUTHORIZED,
            Html(render::create_user_page(
                &app.site.name,
                Some(AuthError::UnknownUser.to_string().as_str()),
            )),
        )
            .into_response(),
        Err(AuthError::BadPassword) => (
            StatusCode::UNAUTHORIZED,
            Html(render::login_page(
                &app.site.name,
                &app.site.welcome,
                Some(AuthError::BadPassword.to_string().as_str()),
            )),
        )
            .into_response(),
        Err(AuthError::Store(e)) => {
            error!("Login for {} failed: {}", escape_log(&creds.username), e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
        }
    }
}

async fn create_user_form(State(app): State<AppState>) -> Html<String> {
    Html(render::create_user_page(&app.site.name, None))
}

async fn create_user_submit(State(app): State<AppState>, Form(creds): Form<Credentials>) -> Response {
    match app.actions.create_account(&creds.username, &creds.password).await {
        Ok(_) => Html(render::login_page(
            &app.site.name,
            &app.site.welcome,
            Some("Account created. You can log in now."),
        ))
        .into_response(),
        Err(e) if e.is_user_error() => (
            StatusCode::BAD_REQUEST,
            Html(render::create_user_page(&app.site.name, Some(e.to_string().as_str()))),
        )
            .into_response(),
        Err(e) => {
            error!("Account creation for {} failed: {}", escape_log(&creds.username), e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
        }
    }
}

async fn home(State(app): State<AppState>, jar: CookieJar) -> Response {
    let Some(token) = session_token(&jar) else {
        return Redirect::to("/login").into_response();
    };
    let mut rng = StdRng::from_entropy();
    let barbarian = match app.actions.poll(&token, Utc::now(), &mut rng).await {
        Ok(b) => b,
        Err(ActionError::MissingPlayer) => return Redirect::to("/login").into_response(),
        Err(e) => return action_error_response(e),
    };
    let username = app.actions.username(&token).await.unwrap_or_default();
    let flash = app.actions.take_flash(&token).await;
    Html(render::home_page(
        &app.site.name,
        &username,
        &barbarian,
        app.actions.shop(),
        app.actions.rules().adventure_interval_secs,
        flash.as_deref(),
    ))
    .into_response()
}

async fn adventure(State(app): State<AppState>, jar: CookieJar) -> Response {
    let Some(token) = session_token(&jar) else {
        return missing_player();
    };
    let mut rng = StdRng::from_entropy();
    match app.actions.do_adventure(&token, &mut rng).await {
        Ok(outcome) => {
            let found = outcome
                .item
                .as_deref()
                .map(|i| format!(" and found a {}", display_name(i)))
                .unwrap_or_default();
            let mut msg = format!(
                "You earned {} gold and {} experience{}.",
                outcome.gold_earned, outcome.xp_earned, found
            );
            if outcome.levels_gained > 0 {
                msg.push_str(" Level up!");
            }
            app.actions.set_flash(&token, msg).await;
            Redirect::to("/home").into_response()
        }
        Err(e) => action_error_response(e),
    }
}

async fn buy(State(app): State<AppState>, jar: CookieJar, Path(item): Path<String>) -> Response {
    let Some(token) = session_token(&jar) else {
        return missing_player();
    };
    let result = match validate_item_id(&item) {
        Ok(item) => app.actions.buy(&token, item).await,
        Err(_) => Err(ShopError::UnknownItem(item.clone()).into()),
    };
    let msg = match result {
        Ok(purchase) => purchase.message,
        Err(ActionError::Shop(e)) => e.to_string(),
        Err(e) => return action_error_response(e),
    };
    app.actions.set_flash(&token, msg).await;
    Redirect::to("/home").into_response()
}

async fn toggle_auto_adventure(State(app): State<AppState>, jar: CookieJar) -> Response {
    let Some(token) = session_token(&jar) else {
        return missing_player();
    };
    match app.actions.toggle_auto(&token, Utc::now()).await {
        Ok(_) => Redirect::to("/home").into_response(),
        Err(e) => action_error_response(e),
    }
}

async fn polled_state(app: &AppState, jar: &CookieJar) -> Result<Barbarian, Response> {
    let token = session_token(jar).ok_or_else(missing_player)?;
    let mut rng = StdRng::from_entropy();
    app.actions
        .poll(&token, Utc::now(), &mut rng)
        .await
        .map_err(action_error_response)
}

async fn get_gold(State(app): State<AppState>, jar: CookieJar) -> Response {
    match polled_state(&app, &jar).await {
        Ok(b) => b.gold.to_string().into_response(),
        Err(resp) => resp,
    }
}

async fn get_xp(State(app): State<AppState>, jar: CookieJar) -> Response {
    match polled_state(&app, &jar).await {
        Ok(b) => b.experience.to_string().into_response(),
        Err(resp) => resp,
    }
}

async fn api_state(State(app): State<AppState>, jar: CookieJar) -> Response {
    let barbarian = match polled_state(&app, &jar).await {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let token = session_token(&jar).unwrap_or_default();
    let username = app.actions.username(&token).await.unwrap_or_default();
    Json(StateView {
        username: &username,
        barbarian: &barbarian,
        xp_threshold: xp_threshold(barbarian.level),
        xp_to_next_level: barbarian.xp_to_next_level(),
    })
    .into_response()
}

async fn logout(State(app): State<AppState>, jar: CookieJar) -> Response {
    if let Some(token) = session_token(&jar) {
        app.actions.logout(&token).await;
    }
    let cleared = Cookie::build((SESSION_COOKIE, "")).path("/").build();
    (jar.remove(cleared), Redirect::to("/login")).into_response()
}

async fn metrics_json(State(app): State<AppState>) -> Json<metrics::Snapshot> {
    let mut snap = metrics::snapshot();
    snap.active_sessions = app.actions.active_sessions().await;
    Json(snap)
}
