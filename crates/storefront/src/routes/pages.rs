//! Site-level pages: the landing redirect and the generic error page.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::{IntoResponse, Redirect, Response};
use tower_sessions::Session;
use tracing::instrument;

use super::PRODUCTS_PATH;
use crate::filters;
use crate::models::Flash;

/// Error page template.
#[derive(Template, WebTemplate)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub flash: Option<Flash>,
}

/// The catalog is the landing page.
pub async fn home() -> Redirect {
    Redirect::to(PRODUCTS_PATH)
}

/// Display the generic error page.
///
/// Never fails: a session error here would redirect back to this page.
#[instrument(skip(session))]
pub async fn error(session: Session) -> Response {
    let flash = Flash::take(&session).await.unwrap_or_else(|e| {
        tracing::warn!("Failed to read flash for error page: {e}");
        None
    });
    ErrorTemplate { flash }.into_response()
}
