use std::sync::Arc;

use axum::body::Body;
use axum::extract::{RawQuery, State};
use axum::http::header::{InvalidHeaderValue, CONTENT_TYPE, LINK};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::Url;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::{IntoParams, ToSchema};

use crate::finder::HostRecord;
use crate::AppState;

/// Documented parameters. The raw query string is forwarded upstream as-is.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Institution name fragment
    pub name: Option<String>,
    /// Results per page
    pub per_page: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Invalid upstream URL: {0}")]
    Url(String),
    #[error("Upstream request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Malformed upstream response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Response build error: {0}")]
    Response(#[from] axum::http::Error),
    #[error("Invalid Link header: {0}")]
    Header(#[from] InvalidHeaderValue),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        tracing::warn!("Proxy error: {}", self);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// 拼接上游地址，查询串原样替换
pub fn upstream_url(base: &str, query: Option<&str>) -> Result<Url, ProxyError> {
    let mut url = Url::parse(base).map_err(|e| ProxyError::Url(e.to_string()))?;
    url.set_query(query.filter(|q| !q.is_empty()));
    Ok(url)
}

/// 合并上游的全部 Link 行
///
/// 单行时原样复制；多行时按 `", "` 拼接为一个值，与 RFC 7230 的字段合并规则一致。
pub fn merged_link(headers: &HeaderMap) -> Result<Option<HeaderValue>, ProxyError> {
    let mut values = headers.get_all(LINK).iter();
    let Some(first) = values.next() else {
        return Ok(None);
    };

    let mut merged = first.as_bytes().to_vec();
    for value in values {
        merged.extend_from_slice(b", ");
        merged.extend_from_slice(value.as_bytes());
    }
    Ok(Some(HeaderValue::from_bytes(&merged)?))
}

/// Search institutions through the upstream accounts search
#[utoipa::path(
    get,
    path = "/api/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Upstream results; the Link header is passed through", body = [HostRecord]),
        (status = 500, description = "Upstream unreachable or malformed", body = ErrorResponse)
    ),
    tag = "Search"
)]
pub async fn search(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> Result<Response, ProxyError> {
    let url = upstream_url(&state.config.upstream.search_url, query.as_deref())?;
    tracing::debug!("Forwarding to {}", url);

    let upstream = state.http.get(url).send().await?;
    let status = upstream.status();
    let link = merged_link(upstream.headers())?;
    let body = upstream.bytes().await?;

    // 只校验是 JSON，响应体原样返回
    serde_json::from_slice::<IgnoredAny>(&body)?;

    let mut builder = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json");
    if let Some(link) = link {
        builder = builder.header(LINK, link);
    }

    tracing::debug!("Upstream answered {} ({} bytes)", status, body.len());
    Ok(builder.body(Body::from(body))?)
}
