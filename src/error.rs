// SPDX-FileCopyrightText: 2024 Clinic Desk contributors
//
// SPDX-License-Identifier: Apache-2.0

use std::{io, result};

use thiserror::Error;

use crate::model::RoleTag;

pub(crate) type Result<T, E = Error> = result::Result<T, E>;

#[derive(Error, Debug)]
pub(crate) enum Error {
    #[error("IO operation failed: {0}")]
    Io(#[from] io::Error),
    #[error("JSON format error: {0}")]
    Json(serde_json::Error),
    #[error("storage error: {0}")]
    Storage(#[from] Storage),
    #[error("session error: {0}")]
    Session(#[from] Session),
    #[error("API error: {0}")]
    Api(#[from] Api),
    #[error("dashboard error: {0}")]
    Dashboard(#[from] Dashboard),
    #[error("command execution failed")]
    Command,
    #[error("operation cancelled")]
    Cancelled,
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        // LINT: Deliberate fall-through that should catch future cases added to
        // the enum.
        #[allow(clippy::wildcard_enum_match_arm)]
        match value.classify() {
            serde_json::error::Category::Io => Self::Io(value.into()),
            _ => Self::Json(value),
        }
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::Io(value.into())
    }
}

#[derive(Error, Debug)]
pub(crate) enum Storage {
    #[error("durable storage is unavailable: {0}")]
    Unavailable(#[source] io::Error),
    #[error("stored data could not be decoded: {0}")]
    Corrupt(#[source] serde_json::Error),
}

#[derive(Error, Debug)]
pub(crate) enum Session {
    #[error("credential is not a well-formed bearer token")]
    MalformedCredential,
    #[error("not signed in")]
    NotAuthenticated,
    #[error("the signed-in user does not have the {0} role")]
    Forbidden(RoleTag),
    #[error("the session could not be stored")]
    NotPersisted,
    #[error("invalid username or password")]
    InvalidLogin,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    Network,
    Unauthorized,
    Server,
    MalformedResponse,
}

#[derive(Error, Debug)]
pub(crate) enum Api {
    #[error("could not reach the server: {0}")]
    Network(#[source] reqwest::Error),
    #[error("the server rejected the session credential")]
    Unauthorized,
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("server response could not be parsed: {0}")]
    MalformedResponse(#[source] serde_json::Error),
}

impl Api {
    pub(crate) const fn kind(&self) -> ApiErrorKind {
        match *self {
            Self::Network(_) => ApiErrorKind::Network,
            Self::Unauthorized => ApiErrorKind::Unauthorized,
            Self::Server { .. } => ApiErrorKind::Server,
            Self::MalformedResponse(_) => ApiErrorKind::MalformedResponse,
        }
    }
}

#[derive(Error, Debug)]
pub(crate) enum Dashboard {
    #[error("required view element #{0} is missing")]
    MissingViewBinding(String),
}
