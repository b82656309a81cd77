//! GitHub search API and the awesome-react README over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client, Response,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use serde::Deserialize;
use url::Url;

use crate::application::generator::{EcosystemSource, TrendingRepository, UpstreamError};
use crate::config::GithubSettings;

use super::error::InfraError;

const SEARCH_QUERY: [(&str, &str); 4] = [
    ("q", "react language:javascript language:typescript"),
    ("sort", "stars"),
    ("order", "desc"),
    ("per_page", "10"),
];

#[derive(Debug, Deserialize)]
struct SearchResponse {
    items: Vec<TrendingRepository>,
}

pub struct GithubSource {
    client: Client,
    token: Option<String>,
    api_base: String,
    awesome_readme_url: String,
}

impl GithubSource {
    pub fn new(settings: &GithubSettings) -> Result<Self, InfraError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("weekly-trends/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.timeout_seconds.get().into()))
            .build()
            .map_err(|err| InfraError::configuration(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            token: settings.token.clone(),
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            awesome_readme_url: settings.awesome_readme_url.clone(),
        })
    }
}

#[async_trait]
impl EcosystemSource for GithubSource {
    async fn trending_repositories(&self) -> Result<Vec<TrendingRepository>, UpstreamError> {
        let token = self.token.as_deref().ok_or(UpstreamError::MissingToken)?;

        let url = Url::parse_with_params(
            &format!("{}/search/repositories", self.api_base),
            SEARCH_QUERY,
        )
        .map_err(|err| UpstreamError::InvalidRequest(format!("search URL: {err}")))?;

        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, format!("token {token}"))
            .header(ACCEPT, "application/vnd.github.v3+json")
            .send()
            .await
            .map_err(transport_error)?;

        let body: SearchResponse = check_status(response)?
            .json()
            .await
            .map_err(|err| UpstreamError::Decode(err.to_string()))?;
        Ok(body.items)
    }

    async fn awesome_readme(&self) -> Result<String, UpstreamError> {
        let response = self
            .client
            .get(&self.awesome_readme_url)
            .send()
            .await
            .map_err(transport_error)?;

        check_status(response)?
            .text()
            .await
            .map_err(|err| UpstreamError::Decode(err.to_string()))
    }
}

fn check_status(response: Response) -> Result<Response, UpstreamError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(UpstreamError::Status {
            status: status.as_u16(),
        })
    }
}

fn transport_error(err: reqwest::Error) -> UpstreamError {
    UpstreamError::Transport(err.to_string())
}
