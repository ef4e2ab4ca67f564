// SPDX-FileCopyrightText: 2024 Clinic Desk contributors
//
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use super::RoleTag;

/// The signed-in user. Roles are kept exactly as the backend issued them and
/// normalized only when compared.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Identity {
    pub(crate) username: String,
    #[serde(default)]
    pub(crate) roles: Vec<String>,
}

impl Identity {
    pub(crate) fn new<U, I, R>(username: U, roles: I) -> Self
    where
        U: Into<String>,
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        Self {
            username: username.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    pub(crate) fn is_valid(&self) -> bool {
        !self.username.trim().is_empty()
    }

    pub(crate) fn primary_role(&self) -> Option<RoleTag> {
        self.roles.first().and_then(|role| RoleTag::normalize(role))
    }

    /// `required` may be a [`RoleTag`] or any spelling of one.
    pub(crate) fn has_role<R: AsRef<str>>(&self, required: R) -> bool {
        RoleTag::normalize(required.as_ref()).map_or(false, |required| {
            self.roles
                .iter()
                .any(|role| RoleTag::normalize(role) == Some(required))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_role_is_first_role() {
        let identity = Identity::new("drsmith", ["ROLE_DOCTOR", "ROLE_ADMIN"]);

        assert_eq!(identity.primary_role(), Some(RoleTag::Doctor));
    }

    #[test]
    fn primary_role_is_absent_without_roles() {
        let identity = Identity::new("drsmith", Vec::<String>::new());

        assert_eq!(identity.primary_role(), None);
    }

    #[test]
    fn has_role_agrees_across_spellings() {
        let identity = Identity::new("root", ["ROLE_ADMIN"]);

        assert!(identity.has_role("ADMIN"));
        assert!(identity.has_role("admin"));
        assert!(identity.has_role("ROLE_ADMIN"));
        assert!(identity.has_role(RoleTag::Admin));
        assert!(!identity.has_role(RoleTag::Doctor));
        assert!(!identity.has_role("superuser"));
    }

    #[test]
    fn blank_username_is_invalid() {
        assert!(!Identity::new("  ", ["ROLE_ADMIN"]).is_valid());
        assert!(Identity::new("root", ["ROLE_ADMIN"]).is_valid());
    }

    #[test]
    fn missing_roles_deserialize_as_empty() -> Result<(), serde_json::Error> {
        let identity: Identity = serde_json::from_str(r#"{"username":"ada"}"#)?;

        assert!(identity.roles.is_empty());
        Ok(())
    }
}
