use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ClientError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        })
    }
}

/// A request relative to the API base URL.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub bearer: Option<String>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            bearer: None,
            body: None,
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::Delete,
            ..Self::get(path)
        }
    }

    pub fn post<T: Serialize>(path: impl Into<String>, body: &T) -> Result<Self, ClientError> {
        Ok(Self {
            method: Method::Post,
            path: path.into(),
            bearer: None,
            body: Some(serde_json::to_vec(body)?),
        })
    }

    pub fn patch<T: Serialize>(path: impl Into<String>, body: &T) -> Result<Self, ClientError> {
        Ok(Self {
            method: Method::Patch,
            ..Self::post(path, body)?
        })
    }

    pub fn with_bearer(mut self, token: Option<String>) -> Self {
        self.bearer = token;
        self
    }
}

/// Raw response. Any HTTP status arrives here; only failures to reach the
/// server at all surface as transport errors.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

const GENERIC_FAILURE: &str = "request failed";

impl HttpResponse {
    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self {
            status,
            content_type: Some("application/json".to_string()),
            body: value.to_string(),
        }
    }

    pub fn empty(status: u16) -> Self {
        Self {
            status,
            content_type: None,
            body: String::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.contains("application/json"))
    }

    /// 401/403 become [`ClientError::Unauthorized`]; any other non-2xx status
    /// becomes an application error carrying the server's `error` message
    /// when it sent one.
    pub fn error_for_status(self) -> Result<Self, ClientError> {
        if self.status == 401 || self.status == 403 {
            return Err(ClientError::Unauthorized {
                status: self.status,
            });
        }
        if self.is_success() {
            return Ok(self);
        }

        let message = if self.is_json() {
            serde_json::from_str::<serde_json::Value>(&self.body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        } else {
            None
        };

        Err(ClientError::Application {
            status: Some(self.status),
            message: message.unwrap_or_else(|| format!("{GENERIC_FAILURE} (HTTP {})", self.status)),
        })
    }

    pub fn into_json<T: DeserializeOwned>(self) -> Result<T, ClientError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// The seam between the API client and the network.
///
/// Implementations return `Err` only when the request never produced an
/// HTTP response. Methods return boxed futures for dyn compatibility.
pub trait Transport: Send + Sync {
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, Result<HttpResponse, ClientError>>;
}

/// Blocking `ureq` agent driven from tokio's blocking pool.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    base_url: String,
}

impl UreqTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, Result<HttpResponse, ClientError>> {
        let agent = self.agent.clone();
        let url = format!("{}{}", self.base_url, request.path);

        Box::pin(async move {
            tokio::task::spawn_blocking(move || execute(&agent, &url, request))
                .await
                .map_err(|e| ClientError::application(format!("request task failed: {e}")))?
        })
    }
}

fn execute(agent: &ureq::Agent, url: &str, request: HttpRequest) -> Result<HttpResponse, ClientError> {
    debug!(method = %request.method, url, "sending request");

    let auth = request.bearer.as_ref().map(|t| format!("Bearer {t}"));
    let body = request.body.unwrap_or_default();

    let result = match request.method {
        Method::Get | Method::Delete => {
            let mut req = if request.method == Method::Get {
                agent.get(url)
            } else {
                agent.delete(url)
            }
            .header("Accept", "application/json");
            if let Some(auth) = &auth {
                req = req.header("Authorization", auth.as_str());
            }
            req.call()
        }
        Method::Post | Method::Patch => {
            let mut req = if request.method == Method::Post {
                agent.post(url)
            } else {
                agent.patch(url)
            }
            .header("Accept", "application/json")
            .header("Content-Type", "application/json");
            if let Some(auth) = &auth {
                req = req.header("Authorization", auth.as_str());
            }
            req.send(&body[..])
        }
    };

    let mut resp = result.map_err(classify)?;
    let status = resp.status().as_u16();
    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = resp.body_mut().read_to_string().map_err(classify)?;

    debug!(status, url, "response received");

    Ok(HttpResponse {
        status,
        content_type,
        body,
    })
}

/// Failures that mean "the server was never reached" are connectivity
/// errors, timeouts included. Everything else is an application error.
fn classify(err: ureq::Error) -> ClientError {
    match err {
        ureq::Error::Io(_)
        | ureq::Error::Timeout(_)
        | ureq::Error::HostNotFound
        | ureq::Error::ConnectionFailed => ClientError::Connectivity(err.to_string()),
        other => ClientError::application(other.to_string()),
    }
}
