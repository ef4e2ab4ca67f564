// SPDX-FileCopyrightText: 2024 Clinic Desk contributors
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use futures_util::lock::Mutex;
use log::{debug, info};

use crate::{
    error::{self, Result},
    metadata,
    model::{Credential, Identity, RoleTag},
    token_store::TokenStore,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Route {
    /// Where a user lands after their session ends.
    Root,
    /// Where unauthenticated users are sent to sign in.
    Login,
}

impl Route {
    pub(crate) const fn path(self) -> &'static str {
        match self {
            Self::Root => "/",
            Self::Login => "/login",
        }
    }
}

pub(crate) trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Tells the person at the terminal where to go next.
pub(crate) struct Terminal;

impl Navigator for Terminal {
    fn navigate(&self, route: Route) {
        debug!("Navigating to {}", route.path());
        match route {
            Route::Root => eprintln!(
                "You are signed out of {}. Run `{} login` to sign in again.",
                *metadata::CLIENT_DISPLAY_NAME,
                *metadata::CLIENT_NAME
            ),
            Route::Login => eprintln!(
                "You need to sign in first. Run `{} login`.",
                *metadata::CLIENT_NAME
            ),
        }
    }
}

/// Authorization decisions derived from the stored session.
pub(crate) struct SessionGate {
    store: TokenStore,
    cache: Mutex<Option<Identity>>,
    navigator: Arc<dyn Navigator>,
}

impl SessionGate {
    pub(crate) fn new(store: TokenStore, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            store,
            cache: Mutex::new(None),
            navigator,
        }
    }

    pub(crate) fn store(&self) -> &TokenStore {
        &self.store
    }

    pub(crate) async fn is_authenticated(&self) -> bool {
        if self.store.read_session().await.is_some() {
            true
        } else {
            *self.cache.lock().await = None;
            false
        }
    }

    pub(crate) async fn credential(&self) -> Option<Credential> {
        self.store.read_credential().await
    }

    /// The signed-in identity, read from storage at most once until the
    /// session changes.
    pub(crate) async fn identity(&self) -> Option<Identity> {
        let mut cache = self.cache.lock().await;
        if cache.is_none() {
            *cache = self.store.read_session().await.map(|session| session.identity);
        }
        cache.clone()
    }

    pub(crate) async fn has_role<R: AsRef<str> + Send>(&self, required: R) -> bool {
        self.identity()
            .await
            .map_or(false, |identity| identity.has_role(required))
    }

    pub(crate) async fn primary_role(&self) -> Option<RoleTag> {
        self.identity()
            .await
            .and_then(|identity| identity.primary_role())
    }

    /// Replaces the stored session wholesale.
    pub(crate) async fn establish(&self, credential: &Credential, identity: &Identity) -> bool {
        let mut cache = self.cache.lock().await;
        if self.store.write(credential, identity).await {
            *cache = Some(identity.clone());
            true
        } else {
            *cache = None;
            false
        }
    }

    /// Lets the caller through only with a session, and with `role` when one
    /// is given.
    pub(crate) async fn require(&self, role: Option<RoleTag>) -> Result<Identity> {
        let Some(identity) = self.identity().await else {
            self.navigator.navigate(Route::Login);
            return Err(error::Session::NotAuthenticated.into());
        };

        if let Some(role) = role {
            if !self.has_role(role).await {
                return Err(error::Session::Forbidden(role).into());
            }
        }
        Ok(identity)
    }

    pub(crate) async fn logout(&self) {
        let mut cache = self.cache.lock().await;
        if let Some(identity) = self.store.read_identity().await {
            info!("Signing out {}", identity.username);
        }
        self.store.clear().await;
        *cache = None;
        self.navigator.navigate(Route::Root);
    }
}
