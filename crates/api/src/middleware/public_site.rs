//! Public wedding site branch, evaluated before the application router.
//!
//! `/{prefix}/{slug}` renders the site and `/{prefix}/{slug}/rsvp` takes the
//! RSVP form post. These paths never reach auth-gated routes, whether or
//! not the visitor is signed in.

use axum::{
    body::Body,
    extract::{FromRequest, State},
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Response},
    Form,
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::{
    record_guest_sync, record_rsvp_rejected, record_rsvp_submitted, RouteLabel,
};
use crate::middleware::rate_limit::{enforce, request_client_key};
use crate::middleware::user_auth::UserAuth;
use crate::services::site_page::{render_error, render_not_found, Notice, SitePage};
use domain::models::{PublicSite, RsvpSubmission};
use domain::services::routing::split_public_path;
use domain::services::{resolve, Route, RsvpForm, RsvpFormState, RsvpReceipt};
use domain::SiteError;

const SITE_LABEL: RouteLabel = RouteLabel("public_site");
const RSVP_LABEL: RouteLabel = RouteLabel("public_site_rsvp");

/// Page state after a form post.
struct Outcome<'a> {
    notice: Option<Notice>,
    form: Option<&'a RsvpSubmission>,
    done: bool,
}

impl Outcome<'_> {
    fn blank() -> Self {
        Self {
            notice: None,
            form: None,
            done: false,
        }
    }
}

pub async fn public_site_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    let prefix = state.config.public_prefix();

    let slug = match resolve(&path, prefix) {
        Route::Internal => return next.run(req).await,
        Route::PublicSite(slug) => slug,
    };
    let rest = split_public_path(&path, prefix)
        .map(|p| p.rest.trim_end_matches('/'))
        .unwrap_or_default();

    let (label, mut response) = match (req.method().clone(), rest) {
        (Method::GET | Method::HEAD, "") => (
            SITE_LABEL,
            render_site(&state, &slug, req.headers(), Outcome::blank(), StatusCode::OK).await,
        ),
        (Method::POST, "rsvp") => (RSVP_LABEL, submit_rsvp(&state, slug, req).await),
        (_, "") => (SITE_LABEL, method_not_allowed("GET, HEAD")),
        (_, "rsvp") => (RSVP_LABEL, method_not_allowed("POST")),
        _ => (
            SITE_LABEL,
            html(StatusCode::NOT_FOUND, render_not_found(&slug)),
        ),
    };

    response.extensions_mut().insert(label);
    response
}

async fn submit_rsvp(state: &AppState, slug: String, req: Request<Body>) -> Response {
    let client = request_client_key(&req);
    if let Err(limited) = enforce(state, &client) {
        record_rsvp_rejected("rate_limited");
        return limited;
    }

    let headers = req.headers().clone();
    let input = match Form::<RsvpSubmission>::from_request(req, state).await {
        Ok(Form(input)) => input,
        Err(rejection) => {
            tracing::debug!(slug = %slug, error = %rejection, "Unreadable RSVP form");
            record_rsvp_rejected("malformed");
            return rejection.into_response();
        }
    };

    let mut form = RsvpForm::with_input(slug.clone(), input);
    let settled = form.submit(&state.rsvps).await.clone();
    match settled {
        RsvpFormState::Accepted(receipt) => {
            record_rsvp_submitted(receipt.duplicate);
            record_guest_sync(receipt.sync.as_str());
            let outcome = Outcome {
                notice: Some(Notice::Success(accepted_message(&receipt).to_string())),
                form: None,
                done: true,
            };
            render_site(state, &slug, &headers, outcome, StatusCode::OK).await
        }
        RsvpFormState::Rejected(SiteError::SiteNotFound) => {
            record_rsvp_rejected("site_not_found");
            html(StatusCode::NOT_FOUND, render_not_found(&slug))
        }
        RsvpFormState::Rejected(err) => {
            let (status, code) = ApiError::from(err.clone()).status_and_code();
            record_rsvp_rejected(code);
            let outcome = Outcome {
                notice: Some(Notice::Error(err.to_string())),
                form: Some(form.input()),
                done: false,
            };
            render_site(state, &slug, &headers, outcome, status).await
        }
        RsvpFormState::Draft | RsvpFormState::Submitting => {
            tracing::error!(slug = %slug, "RSVP form did not settle");
            html(
                StatusCode::INTERNAL_SERVER_ERROR,
                render_error(&SiteError::SubmissionFailed.to_string()),
            )
        }
    }
}

fn accepted_message(receipt: &RsvpReceipt) -> &'static str {
    if receipt.response.confirmed {
        "Presença confirmada! Seu nome já está na lista de convidados."
    } else {
        "Resposta registrada. Obrigado por nos avisar!"
    }
}

async fn render_site(
    state: &AppState,
    slug: &str,
    headers: &HeaderMap,
    outcome: Outcome<'_>,
    status: StatusCode,
) -> Response {
    let record = match state.sites.public_by_slug(slug).await {
        Ok(record) => record,
        Err(SiteError::SiteNotFound) => {
            return html(StatusCode::NOT_FOUND, render_not_found(slug));
        }
        Err(err) => {
            let message = match outcome.notice {
                Some(Notice::Success(msg)) => msg,
                _ => err.to_string(),
            };
            let status = if outcome.done {
                status
            } else {
                StatusCode::SERVICE_UNAVAILABLE
            };
            return html(status, render_error(&message));
        }
    };

    let viewer_is_owner = matches!(
        UserAuth::viewer(&state.jwt, &state.cookies, headers),
        Some(auth) if auth.user_id == record.owner_id
    );
    let site = PublicSite::from(record);

    let mut page = SitePage::new(&site, rsvp_action(state.config.public_prefix(), slug));
    page.editor_url = viewer_is_owner.then_some(state.config.sites.editor_url.as_str());
    page.notice = outcome.notice;
    page.form = outcome.form;
    page.rsvp_done = outcome.done;

    html(status, page.render())
}

fn rsvp_action(prefix: &str, slug: &str) -> String {
    format!("/{}/{}/rsvp", prefix, slug)
}

fn html(status: StatusCode, body: String) -> Response {
    let mut response = (status, Html(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    response
}

fn method_not_allowed(allow: &'static str) -> Response {
    let mut response = StatusCode::METHOD_NOT_ALLOWED.into_response();
    response
        .headers_mut()
        .insert(header::ALLOW, HeaderValue::from_static(allow));
    response
}
