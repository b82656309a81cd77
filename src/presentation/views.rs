use crate::application::error::{ErrorReport, HttpError};
use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn render_not_found_response(chrome: LayoutChrome, content: ErrorPageView) -> Response {
    let view = LayoutContext::new(chrome, content);
    let mut response = render_template_response(ErrorTemplate { view }, StatusCode::NOT_FOUND);
    ErrorReport::from_message(
        "presentation::views::render_not_found_response",
        StatusCode::NOT_FOUND,
        "Resource not found",
    )
    .attach(&mut response);
    response
}

#[derive(Clone)]
pub struct BrandView {
    pub title: String,
    pub href: String,
}

#[derive(Clone)]
pub struct NavigationLinkView {
    pub label: String,
    pub href: String,
}

#[derive(Clone)]
pub struct FooterView {
    pub copy: String,
}

#[derive(Clone)]
pub struct PageMetaView {
    pub title: String,
    pub description: String,
    pub canonical: String,
}

/// Site-wide frame shared by every public page.
#[derive(Clone)]
pub struct LayoutChrome {
    pub brand: BrandView,
    pub navigation: Vec<NavigationLinkView>,
    pub footer: FooterView,
    pub meta: PageMetaView,
}

impl LayoutChrome {
    pub fn for_site(title: &str, description: &str, base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            brand: BrandView {
                title: title.to_string(),
                href: base_url.clone(),
            },
            navigation: vec![
                NavigationLinkView {
                    label: "Home".to_string(),
                    href: "/".to_string(),
                },
                NavigationLinkView {
                    label: "Archive".to_string(),
                    href: "/archive".to_string(),
                },
            ],
            footer: FooterView {
                copy: format!("{title}. Generated weekly from the React ecosystem."),
            },
            meta: PageMetaView {
                title: title.to_string(),
                description: description.to_string(),
                canonical: format!("{base_url}/"),
            },
        }
    }

    pub fn with_page(self, title: Option<&str>, description: Option<&str>, path: &str) -> Self {
        let meta = PageMetaView {
            title: match title {
                Some(title) => format!("{title} | {}", self.brand.title),
                None => self.brand.title.clone(),
            },
            description: description
                .map(str::to_string)
                .unwrap_or(self.meta.description.clone()),
            canonical: format!("{}{path}", self.brand.href.trim_end_matches('/')),
        };
        Self { meta, ..self }
    }
}

pub struct LayoutContext<T> {
    pub brand: BrandView,
    pub navigation: Vec<NavigationLinkView>,
    pub footer: FooterView,
    pub meta: PageMetaView,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(chrome: LayoutChrome, content: T) -> Self {
        Self {
            brand: chrome.brand,
            navigation: chrome.navigation,
            footer: chrome.footer,
            meta: chrome.meta,
            content,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportCard {
    pub week: String,
    pub href: String,
    pub title: String,
    pub excerpt: String,
    pub iso_date: String,
    pub published: String,
}

#[derive(Debug, Clone)]
pub struct ReportLink {
    pub href: String,
    pub title: String,
}

pub struct FeatureView {
    pub icon: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

pub struct HomeView {
    pub latest: Option<ReportCard>,
    pub previous: Vec<ReportCard>,
    pub show_view_all: bool,
    pub features: Vec<FeatureView>,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub view: LayoutContext<HomeView>,
}

#[derive(Debug)]
pub struct ReportDetailView {
    pub week: String,
    pub title: String,
    pub published: String,
    pub iso_date: String,
    pub excerpt: String,
    pub content_html: String,
    pub previous: Option<ReportLink>,
    pub next: Option<ReportLink>,
}

#[derive(Template)]
#[template(path = "report.html")]
pub struct ReportTemplate {
    pub view: LayoutContext<ReportDetailView>,
}

pub struct ArchiveView {
    pub reports: Vec<ReportCard>,
    pub total: usize,
}

#[derive(Template)]
#[template(path = "archive.html")]
pub struct ArchiveTemplate {
    pub view: LayoutContext<ArchiveView>,
}

pub struct ErrorAction {
    pub href: String,
    pub label: String,
}

impl ErrorAction {
    pub fn home() -> Self {
        Self {
            href: "/".to_string(),
            label: "Back to home".to_string(),
        }
    }
}

pub struct ErrorPageView {
    pub title: String,
    pub message: String,
    pub primary_action: Option<ErrorAction>,
}

impl ErrorPageView {
    pub fn not_found() -> Self {
        Self {
            title: "Page Not Found".to_string(),
            message: "The page you requested does not exist.".to_string(),
            primary_action: Some(ErrorAction::home()),
        }
    }

    pub fn report_not_found() -> Self {
        Self {
            title: "Report Not Found".to_string(),
            message: "The report you're looking for doesn't exist.".to_string(),
            primary_action: Some(ErrorAction::home()),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<ErrorPageView>,
}
