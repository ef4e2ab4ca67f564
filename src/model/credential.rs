// SPDX-FileCopyrightText: 2024 Clinic Desk contributors
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use secrecy::{ExposeSecret as _, SecretString};
use subtle::ConstantTimeEq as _;

use crate::error;

const SEGMENTS: usize = 3;

/// A bearer token with the shape of a JWT: three non-empty, dot-separated
/// base64url segments.
#[derive(Clone)]
pub(crate) struct Credential(SecretString);

impl Credential {
    pub(crate) fn parse(value: &str) -> Result<Self, error::Session> {
        if is_well_formed(value) {
            Ok(Self(SecretString::new(value.to_owned())))
        } else {
            Err(error::Session::MalformedCredential)
        }
    }

    pub(crate) fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Compares against a raw stored value without leaking timing.
    pub(crate) fn matches(&self, raw: &str) -> bool {
        self.expose().as_bytes().ct_eq(raw.as_bytes()).into()
    }
}

fn is_well_formed(value: &str) -> bool {
    let segments: Vec<&str> = value.split('.').collect();
    segments.len() == SEGMENTS
        && segments.iter().all(|segment| {
            !segment.is_empty()
                && segment
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'='))
        })
}

impl PartialEq for Credential {
    fn eq(&self, other: &Self) -> bool {
        self.matches(other.expose())
    }
}

impl Eq for Credential {}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}
