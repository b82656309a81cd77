use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};

use crate::{
    application::{
        error::HttpError,
        reports::{ReportPageError, ReportService, report_path},
    },
    infra::assets,
    presentation::views::{
        ArchiveTemplate, ErrorPageView, IndexTemplate, LayoutChrome, LayoutContext,
        ReportTemplate, render_not_found_response, render_template_response,
    },
};

use super::{
    RouterState,
    middleware::{log_responses, set_request_context},
};

#[derive(Clone)]
pub struct HttpState {
    pub reports: Arc<ReportService>,
    pub chrome: Arc<LayoutChrome>,
}

impl HttpState {
    fn chrome(&self) -> LayoutChrome {
        LayoutChrome::clone(&self.chrome)
    }
}

pub fn build_router(state: RouterState) -> Router<RouterState> {
    Router::new()
        .route("/", get(index))
        .route("/blog/{week}", get(report_detail))
        .route("/archive", get(archive))
        .route("/sw.js", get(assets::serve_service_worker))
        .route("/favicon.ico", get(assets::serve_favicon))
        .route("/static/{*path}", get(assets::serve_static))
        .route("/_health", get(health))
        .fallback(fallback)
        .with_state(state)
}

async fn index(State(state): State<HttpState>) -> Response {
    let content = state.reports.home().await;
    let chrome = state.chrome().with_page(None, None, "/");
    let view = LayoutContext::new(chrome, content);
    render_template_response(IndexTemplate { view }, StatusCode::OK)
}

async fn report_detail(State(state): State<HttpState>, Path(week): Path<String>) -> Response {
    match state.reports.report(&week).await {
        Ok(content) => {
            let chrome = state.chrome().with_page(
                Some(&content.title),
                Some(&content.excerpt),
                &report_path(&content.week),
            );
            let view = LayoutContext::new(chrome, content);
            render_template_response(ReportTemplate { view }, StatusCode::OK)
        }
        Err(ReportPageError::NotFound(_)) => {
            render_not_found_response(state.chrome(), ErrorPageView::report_not_found())
        }
        Err(err @ ReportPageError::Render(_)) => HttpError::from_error(
            "infra::http::public::report_detail",
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to render report",
            &err,
        )
        .into_response(),
    }
}

async fn archive(State(state): State<HttpState>) -> Response {
    let content = state.reports.archive().await;
    let chrome = state
        .chrome()
        .with_page(Some("Archive"), None, "/archive");
    let view = LayoutContext::new(chrome, content);
    render_template_response(ArchiveTemplate { view }, StatusCode::OK)
}

async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn fallback(State(state): State<HttpState>) -> Response {
    render_not_found_response(state.chrome(), ErrorPageView::not_found())
}

/// Public pages and the subscription API behind the shared logging middleware.
pub fn build_public_app(state: RouterState) -> Router {
    build_router(state.clone())
        .merge(super::api::build_api_router(state.clone()))
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}
