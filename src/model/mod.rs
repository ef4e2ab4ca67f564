// SPDX-FileCopyrightText: 2024 Clinic Desk contributors
//
// SPDX-License-Identifier: Apache-2.0

pub(crate) mod clinic;
mod credential;
mod identity;
mod role;

pub(crate) use credential::Credential;
pub(crate) use identity::Identity;
pub(crate) use role::RoleTag;

/// A stored credential together with the identity it was issued for.
#[derive(Clone, Debug)]
pub(crate) struct Session {
    pub(crate) credential: Credential,
    pub(crate) identity: Identity,
}
