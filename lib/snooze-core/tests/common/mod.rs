//! Shared fixtures: a recording in-memory transport and the test models.

#![allow(dead_code)]

use std::sync::{Arc, Mutex, PoisonError};

use reqwest::header::CONTENT_TYPE;
use reqwest::{Body, Request};
use serde::{Deserialize, Serialize};
use snooze_core::{
    Client, ResponseEnvelope, SnoozeError, Transport, TransportConfig, TransportFuture,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u32,
    pub name: String,
}

impl User {
    pub fn new(id: u32, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
        }
    }
}

/// A request as seen by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub method: String,
    pub url: String,
    pub content_type: Option<String>,
    pub api_key: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Clone)]
enum Reply {
    /// Sends the request body back with the request content type.
    Echo,
    Respond(ResponseEnvelope),
    Fail(String),
}

/// In-memory [`Transport`] recording every request.
#[derive(Debug, Clone)]
pub struct MockTransport {
    reply: Reply,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockTransport {
    pub fn echo() -> Self {
        Self::with_reply(Reply::Echo)
    }

    pub fn respond(response: ResponseEnvelope) -> Self {
        Self::with_reply(Reply::Respond(response))
    }

    pub fn fail(message: &str) -> Self {
        Self::with_reply(Reply::Fail(message.to_string()))
    }

    fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            requests: Arc::default(),
        }
    }

    /// A client sending everything to this transport, rooted at `http://api.test`.
    pub fn client(&self) -> Client {
        Client::builder()
            .with_root("http://api.test")
            .with_transport(self.clone())
            .build()
            .expect("valid client")
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Transport for MockTransport {
    fn send(&self, request: Request, _config: TransportConfig) -> TransportFuture<'_> {
        let header = |name: &str| {
            request
                .headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(ToOwned::to_owned)
        };
        let content_type = header(CONTENT_TYPE.as_str());
        let body = request.body().and_then(Body::as_bytes).map(<[u8]>::to_vec);

        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Recorded {
                method: request.method().to_string(),
                url: request.url().to_string(),
                content_type: content_type.clone(),
                api_key: header("x-api-key"),
                body: body
                    .as_deref()
                    .map(|bytes| String::from_utf8_lossy(bytes).into_owned()),
            });

        let reply = match &self.reply {
            Reply::Echo => Ok(ResponseEnvelope {
                status: reqwest::StatusCode::OK,
                content_type,
                body: body.map(Into::into),
            }),
            Reply::Respond(response) => Ok(response.clone()),
            Reply::Fail(message) => Err(SnoozeError::transport(message.clone())),
        };
        Box::pin(async move { reply })
    }
}
