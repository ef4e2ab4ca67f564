// SPDX-FileCopyrightText: 2024 Clinic Desk contributors
//
// SPDX-License-Identifier: Apache-2.0

use std::io::{self, BufRead as _, Write as _};

use async_trait::async_trait;
use secrecy::SecretString;
use tokio::task;

use crate::error::Result;

#[derive(Debug, Clone)]
pub(crate) struct Request {
    label: String,
    error: Option<String>,
}

impl Request {
    pub(crate) fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

pub(crate) struct RequestBuilder {
    label: String,
    error: Option<String>,
}

impl RequestBuilder {
    pub(crate) fn new(label: &str) -> Self {
        Self {
            label: label.to_owned(),
            error: None,
        }
    }

    pub(crate) fn with_error(mut self, error: &str) -> Self {
        self.error = Some(error.to_owned());
        self
    }

    pub(crate) fn into_request(self) -> Request {
        Request {
            label: self.label,
            error: self.error,
        }
    }
}

/// Asks the person at the terminal for sign-in details.
#[async_trait]
pub(crate) trait Prompt: Send + Sync {
    /// Reads a line that may be echoed. `None` means there is no one to ask.
    async fn line(&self, req: Request) -> Result<Option<String>>;

    /// Reads a secret without echoing it.
    async fn secret(&self, req: Request) -> Result<Option<SecretString>>;
}

pub(crate) struct RpasswordPrompt;

#[async_trait]
impl Prompt for RpasswordPrompt {
    async fn line(&self, req: Request) -> Result<Option<String>> {
        if let Some(error) = req.error() {
            eprintln!("Error: {error}");
        }

        task::spawn_blocking(move || -> Result<Option<String>> {
            eprint!("{}: ", req.label);
            io::stderr().flush()?;
            let mut line = String::new();
            let read = io::stdin().lock().read_line(&mut line)?;
            Ok(if read == 0 {
                None
            } else {
                Some(line.trim().to_owned())
            })
        })
        .await?
    }

    async fn secret(&self, req: Request) -> Result<Option<SecretString>> {
        if let Some(error) = req.error() {
            eprintln!("Error: {error}");
        }

        Ok(Some(
            task::spawn_blocking(move || {
                rpassword::prompt_password(format!("{}: ", req.label)).map(SecretString::new)
            })
            .await??,
        ))
    }
}
