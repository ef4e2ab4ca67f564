// SPDX-FileCopyrightText: 2024 Clinic Desk contributors
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;
use inflector::Inflector as _;
use log::{debug, error, info, warn};
use secrecy::SecretString;

use crate::{
    api::{Endpoint as _, RegisterPatient},
    app::App,
    dashboard::Activation,
    error::{self, Error, Result},
    login, metadata,
    password::RequestBuilder,
};

const PASSWORD_ATTEMPTS: usize = 3;

/// Sign in to the clinic.
#[derive(Debug, Parser)]
pub(crate) struct Login {
    /// The username to sign in as. Prompted for when omitted.
    #[arg(long, short)]
    username: Option<String>,

    /// The password. Prompted for, without echo, when omitted.
    #[arg(long, env = "CLINIC_DESK_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[async_trait]
impl super::Command for Login {
    async fn execute(self, app: &App) -> Result<()> {
        let username = match self.username {
            Some(username) => username,
            None => app
                .prompt()
                .line(RequestBuilder::new("Username").into_request())
                .await?
                .ok_or(Error::Cancelled)?,
        };
        let username = username.trim();
        if username.is_empty() {
            error!("A username is required to sign in");
            return Err(Error::Command);
        }

        if app.gate().is_authenticated().await {
            info!("Replacing the current session");
        }

        let identity = if let Some(password) = self.password {
            login::sign_in(app.api(), username, SecretString::new(password)).await?
        } else {
            let mut retry: Option<String> = None;
            let mut attempt = 1;
            loop {
                let mut req = RequestBuilder::new("Password");
                if let Some(ref e) = retry {
                    req = req.with_error(e);
                }
                let password = app
                    .prompt()
                    .secret(req.into_request())
                    .await?
                    .ok_or(Error::Cancelled)?;

                match login::sign_in(app.api(), username, password).await {
                    Err(Error::Session(e @ error::Session::InvalidLogin))
                        if attempt < PASSWORD_ATTEMPTS =>
                    {
                        retry = Some(e.to_string().to_sentence_case());
                        attempt += 1;
                    }
                    result => break result?,
                }
            }
        };

        let Some(role) = identity.primary_role() else {
            warn!(
                "The account {} has no role with a dashboard: {}",
                identity.username,
                identity.roles.join(", ")
            );
            println!("Signed in as {}.", identity.username);
            return Ok(());
        };
        println!(
            "Signed in as {} ({}).",
            identity.username,
            role.as_str().to_title_case()
        );

        let dispatcher = app.dispatcher();
        match dispatcher.dispatch_from_session().await? {
            Some(Activation::Activated | Activation::AlreadyActive) => {
                println!("{}", dispatcher.viewport().snapshot());
            }
            Some(Activation::Superseded) | None => {
                debug!("The dashboard did not open after signing in");
            }
        }
        Ok(())
    }
}

/// Create a patient account.
#[derive(Debug, Parser)]
pub(crate) struct Register {
    /// Full name.
    #[arg(long)]
    name: String,

    /// Email address. It is also the username to sign in with.
    #[arg(long)]
    email: String,

    #[arg(long)]
    phone: String,

    #[arg(long)]
    address: String,

    /// The new password. Prompted for, without echo, when omitted.
    #[arg(long, env = "CLINIC_DESK_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[async_trait]
impl super::Command for Register {
    async fn execute(self, app: &App) -> Result<()> {
        let password = match self.password {
            Some(password) => SecretString::new(password),
            None => app
                .prompt()
                .secret(RequestBuilder::new("New password").into_request())
                .await?
                .ok_or(Error::Cancelled)?,
        };

        let _ = RegisterPatient {
            name: self.name.trim().to_owned(),
            email: self.email.trim().to_owned(),
            phone_number: self.phone.trim().to_owned(),
            address: self.address.trim().to_owned(),
            password,
        }
        .execute(app.api())
        .await?;
        info!("Registered patient {}", self.email.trim());
        println!(
            "Registration successful. Sign in with `{} login --username {}`.",
            *metadata::CLIENT_NAME,
            self.email.trim()
        );
        Ok(())
    }
}

/// Sign out and forget the stored session.
#[derive(Debug, Parser)]
pub(crate) struct Logout {}

#[async_trait]
impl super::Command for Logout {
    async fn execute(self, app: &App) -> Result<()> {
        app.dispatcher().deactivate();
        app.gate().logout().await;
        Ok(())
    }
}

/// Show who is signed in.
#[derive(Debug, Parser)]
pub(crate) struct Status {}

#[async_trait]
impl super::Command for Status {
    async fn execute(self, app: &App) -> Result<()> {
        let Some(identity) = app.gate().identity().await else {
            println!("Not signed in.");
            return Ok(());
        };

        let role = app
            .gate()
            .primary_role()
            .await
            .map_or_else(|| "none".to_owned(), |role| role.as_str().to_title_case());
        let storage = if app.gate().store().is_persistent().await {
            "saved on disk"
        } else {
            "kept in memory"
        };
        println!(
            "Signed in as {}\nPrimary role: {}\nRoles: {}\nSession: {}",
            identity.username,
            role,
            identity.roles.join(", "),
            storage
        );
        Ok(())
    }
}
