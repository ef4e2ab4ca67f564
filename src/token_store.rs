// SPDX-FileCopyrightText: 2024 Clinic Desk contributors
//
// SPDX-License-Identifier: Apache-2.0

use futures_util::lock::Mutex;
use log::{debug, warn};

use crate::{
    model::{Credential, Identity, Session},
    storage::{IsPersistent, Storage},
};

pub(crate) type CredentialStorage = Box<dyn Storage<String>>;
pub(crate) type IdentityStorage = Box<dyn Storage<Identity>>;

struct Slots {
    credential: CredentialStorage,
    identity: IdentityStorage,
}

impl Slots {
    async fn credential(&mut self) -> Option<Credential> {
        match self.credential.get().await {
            Ok(Some(raw)) => match Credential::parse(&raw) {
                Ok(credential) => Some(credential),
                Err(e) => {
                    warn!("Ignoring the stored credential: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("We could not read the stored credential: {}", e);
                None
            }
        }
    }

    async fn identity(&mut self) -> Option<Identity> {
        match self.identity.get().await {
            Ok(identity) => identity,
            Err(e) => {
                warn!("We could not read the stored identity: {}", e);
                None
            }
        }
    }

    async fn clear(&mut self) {
        if let Err(e) = self.credential.clear().await {
            warn!("We could not remove the stored credential: {}", e);
        }
        if let Err(e) = self.identity.clear().await {
            warn!("We could not remove the stored identity: {}", e);
        }
    }
}

/// Keeps the credential and identity in two storage slots and guarantees
/// that callers only ever observe both or neither.
pub(crate) struct TokenStore {
    slots: Mutex<Slots>,
}

impl TokenStore {
    pub(crate) fn new(credential: CredentialStorage, identity: IdentityStorage) -> Self {
        Self {
            slots: Mutex::new(Slots {
                credential,
                identity,
            }),
        }
    }

    pub(crate) async fn is_persistent(&self) -> bool {
        let slots = self.slots.lock().await;
        slots.credential.is_persistent() && slots.identity.is_persistent()
    }

    /// Stores a new session. Returns `false`, leaving no partial session
    /// behind, if the identity is unusable or storage misbehaves.
    pub(crate) async fn write(&self, credential: &Credential, identity: &Identity) -> bool {
        if !identity.is_valid() {
            warn!("Refusing to store a session without a username");
            return false;
        }

        let mut slots = self.slots.lock().await;
        if let Err(e) = slots.credential.update(&credential.expose().to_owned()).await {
            warn!("We could not store the credential: {}", e);
            slots.clear().await;
            return false;
        }
        if let Err(e) = slots.identity.update(identity).await {
            warn!("We could not store the identity: {}", e);
            slots.clear().await;
            return false;
        }

        let credential_verified = matches!(
            slots.credential.get().await,
            Ok(Some(ref raw)) if credential.matches(raw)
        );
        let identity_verified = matches!(
            slots.identity.get().await,
            Ok(Some(ref stored)) if stored == identity
        );
        if !(credential_verified && identity_verified) {
            warn!("Stored session did not read back as written; discarding it");
            slots.clear().await;
            return false;
        }

        debug!("Stored session for {}", identity.username);
        true
    }

    pub(crate) async fn read_credential(&self) -> Option<Credential> {
        self.slots.lock().await.credential().await
    }

    pub(crate) async fn read_identity(&self) -> Option<Identity> {
        self.slots.lock().await.identity().await
    }

    /// Reads both halves. A lone credential or identity is corrupt state and
    /// is removed.
    pub(crate) async fn read_session(&self) -> Option<Session> {
        let mut slots = self.slots.lock().await;
        match (slots.credential().await, slots.identity().await) {
            (Some(credential), Some(identity)) => Some(Session {
                credential,
                identity,
            }),
            (None, None) => None,
            (credential, identity) => {
                warn!(
                    "Discarding an incomplete session (credential present: {}, identity present: {})",
                    credential.is_some(),
                    identity.is_some()
                );
                slots.clear().await;
                None
            }
        }
    }

    pub(crate) async fn clear(&self) {
        self.slots.lock().await.clear().await;
    }
}
