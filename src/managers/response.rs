use crate::errors::{classify_status, LfsError, ServerError};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

static LFS_MEDIA_TYPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\Aapplication/vnd\.git\-lfs\+json(;|\z)").expect("lfs media type regex")
});
static JSON_MEDIA_TYPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\Aapplication/json(;|\z)").expect("json media type regex"));

/// The body stays open until it is decoded or taken; after that
/// [`Response::is_body_closed`] reports `true`.
#[derive(Debug)]
pub struct Response {
    method: Method,
    url: Url,
    status: StatusCode,
    headers: HeaderMap,
    body: Option<reqwest::Response>,
}

impl Response {
    /// `method` and `url` describe the originating request; `inner.url()` may
    /// differ after redirects.
    pub fn new(method: Method, url: Url, inner: reqwest::Response) -> Self {
        Self {
            method,
            url,
            status: inner.status(),
            headers: inner.headers().clone(),
            body: Some(inner),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    pub fn is_body_closed(&self) -> bool {
        self.body.is_none()
    }

    pub fn take_body(&mut self) -> Option<reqwest::Response> {
        self.body.take()
    }
}

pub fn is_json_media_type(content_type: &str) -> bool {
    LFS_MEDIA_TYPE_RE.is_match(content_type) || JSON_MEDIA_TYPE_RE.is_match(content_type)
}

/// Replaces `target` with the decoded body when the content type is one of
/// the accepted media types. Any other content type is a no-op.
///
/// On a match the body is consumed whether or not decoding succeeds. Bytes
/// after the first JSON value are ignored.
pub async fn decode_response<T: DeserializeOwned>(
    res: &mut Response,
    target: &mut T,
) -> Result<(), LfsError> {
    if !res.content_type().map(is_json_media_type).unwrap_or(false) {
        return Ok(());
    }
    let Some(body) = res.take_body() else {
        return Err(LfsError::BodyConsumed {
            method: res.method.clone(),
            url: res.url.clone(),
        });
    };
    let bytes = body.bytes().await.map_err(|source| LfsError::ReadBody {
        method: res.method.clone(),
        url: res.url.clone(),
        source,
    })?;
    let mut de = serde_json::Deserializer::from_slice(&bytes);
    *target = T::deserialize(&mut de).map_err(|source| LfsError::Decode {
        method: res.method.clone(),
        url: res.url.clone(),
        source,
    })?;
    Ok(())
}

/// Statuses of 400 and above become an [`LfsError::Http`]. When the error
/// body cannot be decoded the failure is wrapped in [`LfsError::Status`] so
/// the status class survives.
pub async fn handle_response(res: &mut Response) -> Result<(), LfsError> {
    let status = res.status().as_u16();
    if status < 400 {
        return Ok(());
    }
    let mut payload = ServerError::default();
    if let Err(err) = decode_response(res, &mut payload).await {
        return Err(LfsError::Status {
            status,
            class: classify_status(status),
            source: Box::new(err),
        });
    }
    Err(payload.into_error(status, res.url()))
}
