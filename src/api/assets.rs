use axum::{
    body::Body,
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Redirect, Response},
};
use rust_embed::RustEmbed;
use tower_sessions::Session;

use super::auth::current_user;

#[derive(RustEmbed)]
#[folder = "web"]
struct Asset;

fn render(path: &str) -> Response {
    match Asset::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                [(header::CONTENT_TYPE, mime.as_ref())],
                Body::from(content.data),
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, "404 Not Found").into_response(),
    }
}

/// GET / — public landing page.
pub async fn index() -> Response {
    render("index.html")
}

/// GET /login
pub async fn login_page() -> Response {
    render("login.html")
}

/// GET /signup
pub async fn signup_page() -> Response {
    render("signup.html")
}

/// GET /chat — requires a session.
pub async fn chat_page(session: Session) -> Response {
    if current_user(&session).await.is_none() {
        return Redirect::to("/login").into_response();
    }
    render("chat.html")
}

/// GET /admin — requires an admin session.
pub async fn admin_page(session: Session) -> Response {
    match current_user(&session).await {
        Some(user) if user.is_admin => render("admin.html"),
        Some(_) => Redirect::to("/").into_response(),
        None => Redirect::to("/login").into_response(),
    }
}

/// Fallback for static files (JS/CSS).
pub async fn serve_asset(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');
    render(path)
}
