// SPDX-FileCopyrightText: 2024 Clinic Desk contributors
//
// SPDX-License-Identifier: Apache-2.0

use log::info;
use secrecy::SecretString;

use crate::{
    api::{Endpoint as _, SignIn},
    error::{self, Error, Result},
    http::HttpClient,
    model::{Credential, Identity},
};

/// Exchanges a username and password for a stored session.
pub(crate) async fn sign_in(
    api: &HttpClient,
    username: &str,
    password: SecretString,
) -> Result<Identity> {
    let response = match (SignIn {
        username: username.to_owned(),
        password,
    })
    .execute(api)
    .await
    {
        Err(Error::Api(error::Api::Unauthorized)) => {
            return Err(error::Session::InvalidLogin.into())
        }
        other => other?,
    };

    let credential = Credential::parse(&response.token)?;
    let identity = Identity::new(
        response
            .username
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| username.to_owned()),
        response.roles,
    );

    if !api.gate().establish(&credential, &identity).await {
        return Err(error::Session::NotPersisted.into());
    }
    info!("Signed in as {}", identity.username);
    Ok(identity)
}
