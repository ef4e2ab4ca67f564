// SPDX-FileCopyrightText: 2024 Clinic Desk contributors
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use log::{debug, warn};
use reqwest::{header, Method, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::{
    error::{self, Result},
    gate::SessionGate,
    metadata,
};

/// One outbound call, owned by whoever issues it.
#[derive(Clone, Debug)]
pub(crate) struct PendingRequest {
    method: Method,
    path: String,
    query: Vec<(&'static str, String)>,
    body: Option<Value>,
    requires_auth: bool,
}

impl PendingRequest {
    pub(crate) fn new<P: Into<String>>(method: Method, path: P) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            requires_auth: true,
        }
    }

    pub(crate) fn get<P: Into<String>>(path: P) -> Self {
        Self::new(Method::GET, path)
    }

    pub(crate) fn post<P: Into<String>>(path: P) -> Self {
        Self::new(Method::POST, path)
    }

    pub(crate) fn put<P: Into<String>>(path: P) -> Self {
        Self::new(Method::PUT, path)
    }

    pub(crate) fn delete<P: Into<String>>(path: P) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub(crate) fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub(crate) fn with_query<V: ToString>(mut self, key: &'static str, value: V) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    /// Sent without a credential, and a 401 leaves the session alone.
    pub(crate) const fn anonymous(mut self) -> Self {
        self.requires_auth = false;
        self
    }

    pub(crate) fn method(&self) -> &Method {
        &self.method
    }

    pub(crate) fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn query(&self) -> &[(&'static str, String)] {
        &self.query
    }

    pub(crate) fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub(crate) const fn requires_auth(&self) -> bool {
        self.requires_auth
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

fn error_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.message.or(body.error))
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| format!("request failed with status {}", status.as_u16()))
}

/// JSON requests against the clinic backend on behalf of the current session.
pub(crate) struct HttpClient {
    http: reqwest::Client,
    base: Url,
    gate: Arc<SessionGate>,
}

impl HttpClient {
    pub(crate) fn new(base: Url, gate: Arc<SessionGate>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(metadata::USER_AGENT.as_str())
            .build()
            .map_err(error::Api::Network)?;
        Ok(Self { http, base, gate })
    }

    pub(crate) fn gate(&self) -> &Arc<SessionGate> {
        &self.gate
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Performs the call. Failures surface immediately; nothing is retried.
    pub(crate) async fn request(&self, req: PendingRequest) -> Result<Value, error::Api> {
        let mut builder = self
            .http
            .request(req.method().clone(), self.url(req.path()))
            .header(header::ACCEPT, "application/json");
        if !req.query().is_empty() {
            builder = builder.query(req.query());
        }
        let mut bearer = false;
        if req.requires_auth() {
            if let Some(credential) = self.gate.credential().await {
                builder = builder.bearer_auth(credential.expose());
                bearer = true;
            }
        }
        if let Some(body) = req.body() {
            builder = builder.json(body);
        }

        debug!("{} {}", req.method(), req.path());
        let response = builder.send().await.map_err(error::Api::Network)?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            // Only a session we actually sent can have been rejected.
            if bearer {
                warn!(
                    "The server rejected our session during {} {}",
                    req.method(),
                    req.path()
                );
                self.gate.logout().await;
            }
            return Err(error::Api::Unauthorized);
        }

        let body = response.bytes().await.map_err(error::Api::Network)?;
        if !status.is_success() {
            return Err(error::Api::Server {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&body).map_err(error::Api::MalformedResponse)
    }

    /// Like [`request`](Self::request), decoding the body into `R`.
    pub(crate) async fn fetch<R: DeserializeOwned>(&self, req: PendingRequest) -> Result<R, error::Api> {
        let value = self.request(req).await?;
        serde_json::from_value(value).map_err(error::Api::MalformedResponse)
    }
}
