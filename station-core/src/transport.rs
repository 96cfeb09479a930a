use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use std::fmt::Debug;

use crate::error::TransportError;

/// Status code and body of a provider response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The HTTP collaborator used by the station. One GET per call, no retries.
#[async_trait]
pub trait HttpTransport: Send + Sync + Debug {
    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<HttpResponse, TransportError>;
}

#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self { http: Client::new() }
    }

    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<HttpResponse, TransportError> {
        let res = self.http.get(url).query(query).send().await?;

        let status = res.status().as_u16();
        let body = res.text().await?;
        debug!("GET {url} -> {status} ({} bytes)", body.len());

        Ok(HttpResponse { status, body })
    }
}

/// Provider endpoints used by the station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub current: String,
    pub forecast: String,
}

impl Endpoints {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openweathermap.org/data/2.5";

    /// Endpoints under `base_url`, e.g. a proxy or a local stub.
    pub fn with_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            current: format!("{base}/weather"),
            forecast: format!("{base}/forecast"),
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::with_base_url(Self::DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// A request seen by [`ScriptedTransport`].
    #[derive(Debug, Clone, PartialEq)]
    pub struct Recorded {
        pub url: String,
        pub query: Vec<(String, String)>,
    }

    impl Recorded {
        pub fn param(&self, name: &str) -> Option<&str> {
            self.query.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
        }
    }

    /// Replays queued responses in order and records every request.
    #[derive(Debug, Clone, Default)]
    pub struct ScriptedTransport {
        responses: Arc<Mutex<VecDeque<Result<HttpResponse, TransportError>>>>,
        requests: Arc<Mutex<Vec<Recorded>>>,
    }

    impl ScriptedTransport {
        pub fn respond(self, status: u16, body: impl Into<String>) -> Self {
            self.responses.lock().unwrap().push_back(Ok(HttpResponse::new(status, body)));
            self
        }

        pub fn fail(self, message: &str) -> Self {
            self.responses.lock().unwrap().push_back(Err(TransportError::new(message)));
            self
        }

        pub fn requests(&self) -> Vec<Recorded> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<HttpResponse, TransportError> {
            self.requests.lock().unwrap().push(Recorded {
                url: url.to_string(),
                query: query.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
            });
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::new("no scripted response left")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_endpoints_point_at_openweather() {
        let e = Endpoints::default();
        assert_eq!(e.current, "https://api.openweathermap.org/data/2.5/weather");
        assert_eq!(e.forecast, "https://api.openweathermap.org/data/2.5/forecast");
    }

    #[test]
    fn base_url_trailing_slash_is_ignored() {
        let e = Endpoints::with_base_url("http://localhost:8080/");
        assert_eq!(e.current, "http://localhost:8080/weather");
    }

    #[test]
    fn success_range() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(404, "").is_success());
        assert!(!HttpResponse::new(301, "").is_success());
    }
}
