// SPDX-FileCopyrightText: 2024 Clinic Desk contributors
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub(crate) enum RoleTag {
    Admin,
    Doctor,
    Patient,
}

impl RoleTag {
    /// Prefix the backend puts in front of granted authorities.
    pub(crate) const PREFIX: &'static str = "ROLE_";

    /// The one normalization applied at every role comparison: surrounding
    /// whitespace and the authority prefix are ignored, case is ignored.
    pub(crate) fn normalize(raw: &str) -> Option<Self> {
        let upper = raw.trim().to_ascii_uppercase();
        let bare = upper.strip_prefix(Self::PREFIX).unwrap_or(&upper);
        match bare {
            "ADMIN" => Some(Self::Admin),
            "DOCTOR" => Some(Self::Doctor),
            "PATIENT" => Some(Self::Patient),
            _ => None,
        }
    }

    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Doctor => "DOCTOR",
            Self::Patient => "PATIENT",
        }
    }
}

impl AsRef<str> for RoleTag {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for RoleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
