// SPDX-FileCopyrightText: 2024 Clinic Desk contributors
//
// SPDX-License-Identifier: Apache-2.0

//! Records exchanged with the clinic backend. Every field is optional on the
//! wire, so the structs deserialize leniently.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

fn format_id(id: &Option<i64>) -> String {
    id.map(|id| id.to_string()).unwrap_or_default()
}

fn format_text(text: &Option<String>) -> String {
    text.clone().unwrap_or_default()
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Half of the day a doctor's listed times fall in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum DayPart {
    Am,
    Pm,
}

impl DayPart {
    fn marker(self) -> &'static str {
        match self {
            Self::Am => "AM",
            Self::Pm => "PM",
        }
    }
}

impl fmt::Display for DayPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

/// Doctor IDs grow as doctors are added, so they order by registration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum SortOrder {
    Newest,
    Oldest,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match *self {
            Self::Newest => "newest first",
            Self::Oldest => "oldest first",
        })
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, Tabled)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct Doctor {
    #[tabled(rename = "ID", display_with = "format_id")]
    pub(crate) id: Option<i64>,
    #[tabled(rename = "Name")]
    pub(crate) name: String,
    #[tabled(rename = "Specialty", display_with("Self::format_specialty", self))]
    pub(crate) specialty: Option<String>,
    #[tabled(skip)]
    pub(crate) specialization: Option<String>,
    #[tabled(rename = "Email", display_with = "format_text")]
    pub(crate) email: Option<String>,
    #[tabled(rename = "Phone", display_with = "format_text")]
    pub(crate) phone_number: Option<String>,
    #[tabled(rename = "Available", display_with = "Self::format_times")]
    pub(crate) available_times: Vec<String>,
}

impl Doctor {
    /// The backend fills in either field depending on how the doctor was
    /// registered.
    pub(crate) fn specialty(&self) -> Option<&str> {
        self.specialty
            .as_deref()
            .or(self.specialization.as_deref())
            .filter(|specialty| !specialty.is_empty())
    }

    pub(crate) fn matches(&self, query: &str) -> bool {
        contains_folded(&self.name, query)
            || self
                .specialty()
                .map_or(false, |specialty| contains_folded(specialty, query))
    }

    pub(crate) fn has_specialty(&self, specialty: &str) -> bool {
        self.specialty()
            .map_or(false, |own| own.to_lowercase() == specialty.trim().to_lowercase())
    }

    pub(crate) fn is_available_in(&self, part: DayPart) -> bool {
        self.available_times
            .iter()
            .any(|slot| slot.to_uppercase().contains(part.marker()))
    }

    fn format_specialty(&self) -> String {
        self.specialty().unwrap_or_default().to_owned()
    }

    fn format_times(times: &[String]) -> String {
        times.join(", ")
    }
}

/// The fields an admin submits when adding or editing a doctor.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DoctorForm {
    pub(crate) name: String,
    pub(crate) specialty: String,
    pub(crate) email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) phone_number: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) available_times: Vec<String>,
    /// Left out on edits to keep the current password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) password: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, Tabled)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct Patient {
    #[tabled(rename = "ID", display_with = "format_id")]
    pub(crate) id: Option<i64>,
    #[tabled(rename = "Name")]
    pub(crate) name: String,
    #[tabled(rename = "Email", display_with = "format_text")]
    pub(crate) email: Option<String>,
    #[tabled(rename = "Phone", display_with = "format_text")]
    pub(crate) phone_number: Option<String>,
    #[tabled(rename = "Address", display_with = "format_text")]
    pub(crate) address: Option<String>,
}

impl Patient {
    pub(crate) fn matches(&self, query: &str) -> bool {
        contains_folded(&self.name, query)
            || self
                .email
                .as_deref()
                .map_or(false, |email| contains_folded(email, query))
    }
}

/// A doctor or patient as embedded in another record.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub(crate) struct Party {
    pub(crate) id: Option<i64>,
    pub(crate) name: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, Tabled)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct Appointment {
    #[tabled(rename = "ID", display_with = "format_id")]
    pub(crate) id: Option<i64>,
    #[tabled(rename = "When", display_with = "format_text")]
    pub(crate) appointment_date_time: Option<String>,
    #[tabled(rename = "Patient", display_with = "Self::format_party")]
    pub(crate) patient: Option<Party>,
    #[tabled(skip)]
    pub(crate) doctor: Option<Party>,
    #[tabled(rename = "Reason", display_with = "format_text")]
    pub(crate) reason: Option<String>,
    #[tabled(rename = "Status", display_with = "format_text")]
    pub(crate) status: Option<String>,
}

impl Appointment {
    fn format_party(party: &Option<Party>) -> String {
        party
            .as_ref()
            .map(|party| party.name.clone())
            .unwrap_or_default()
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct Prescription {
    pub(crate) id: Option<i64>,
    pub(crate) patient_id: Option<i64>,
    pub(crate) patient_name: Option<String>,
    pub(crate) medication: String,
    pub(crate) dosage: String,
    pub(crate) duration: Option<String>,
    pub(crate) notes: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct Slots {
    pub(crate) available_slots: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Booking {
    pub(crate) doctor_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) patient_id: Option<i64>,
    pub(crate) date: String,
    pub(crate) time: String,
    pub(crate) reason: String,
}
