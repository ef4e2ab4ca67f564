// SPDX-FileCopyrightText: 2024 Clinic Desk contributors
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use super::{table, Controller};
use crate::{
    api::{Endpoint as _, ListDoctors},
    error::Result,
    http::HttpClient,
    metadata,
    model::{
        clinic::{DayPart, Doctor, SortOrder},
        RoleTag,
    },
    view::{panel, Binding, ListenerId, ViewEvent, Viewport},
};

fn non_blank(text: &str) -> Option<String> {
    Some(text.trim())
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}

/// What the person has narrowed the doctor list down to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Filters {
    query: Option<String>,
    specialty: Option<String>,
    hours: Option<DayPart>,
    order: Option<SortOrder>,
}

impl Filters {
    fn apply(&mut self, event: &ViewEvent) {
        match *event {
            ViewEvent::Search(ref query) => self.query = non_blank(query),
            ViewEvent::Specialty(ref specialty) => {
                self.specialty = specialty.as_deref().and_then(non_blank);
            }
            ViewEvent::Hours(hours) => self.hours = hours,
            ViewEvent::Order(order) => self.order = order,
            ViewEvent::Reset => *self = Self::default(),
        }
    }

    fn keeps(&self, doctor: &Doctor) -> bool {
        self.specialty
            .as_deref()
            .map_or(true, |specialty| doctor.has_specialty(specialty))
            && self.hours.map_or(true, |hours| doctor.is_available_in(hours))
    }

    fn listing(&self, doctors: &[Doctor]) -> String {
        let mut rows: Vec<&Doctor> = table::filtered(doctors, self.query.as_deref(), Doctor::matches)
            .into_iter()
            .filter(|doctor| self.keeps(doctor))
            .collect();
        match self.order {
            Some(SortOrder::Newest) => rows.sort_by(|a, b| b.id.cmp(&a.id)),
            Some(SortOrder::Oldest) => rows.sort_by(|a, b| a.id.cmp(&b.id)),
            None => {}
        }

        let narrowed = self.specialty.is_some() || self.hours.is_some();
        let empty = match self.query {
            _ if narrowed => "No doctors match the current filters.".to_owned(),
            Some(ref query) => format!("No doctors match \"{query}\"."),
            None => "No doctors are registered yet.".to_owned(),
        };
        table::render(rows, &empty)
    }

    fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(ref query) = self.query {
            parts.push(format!("Search: {query}"));
        }
        if let Some(ref specialty) = self.specialty {
            parts.push(format!("Specialty: {specialty}"));
        }
        if let Some(hours) = self.hours {
            parts.push(format!("Hours: {hours}"));
        }
        if let Some(order) = self.order {
            parts.push(format!("Order: {order}"));
        }

        if parts.is_empty() {
            "Search doctors by name or specialty.".to_owned()
        } else {
            parts.join(" | ")
        }
    }
}

struct Panels {
    doctors: Binding,
    search: Binding,
}

/// The searchable doctor list shown to admins and patients.
pub(crate) struct Directory {
    role: RoleTag,
    api: Arc<HttpClient>,
    panels: Option<Panels>,
    doctors: Vec<Doctor>,
    listeners: Vec<ListenerId>,
}

impl Directory {
    pub(crate) fn new(role: RoleTag, api: Arc<HttpClient>) -> Self {
        Self {
            role,
            api,
            panels: None,
            doctors: Vec::new(),
            listeners: Vec::new(),
        }
    }

    fn footer(&self) -> String {
        match self.role {
            RoleTag::Admin => format!(
                "Manage doctors with `{} doctors add|update|delete`.",
                *metadata::CLIENT_NAME
            ),
            RoleTag::Doctor | RoleTag::Patient => format!(
                "Check a doctor's free slots with `{} slots` and book with `{} book`.",
                *metadata::CLIENT_NAME,
                *metadata::CLIENT_NAME
            ),
        }
    }
}

#[async_trait]
impl Controller for Directory {
    fn role(&self) -> RoleTag {
        self.role
    }

    fn bind(&mut self, viewport: &Viewport) -> Result<()> {
        self.panels = Some(Panels {
            doctors: viewport.bind(panel::DOCTOR_LIST)?,
            search: viewport.bind(panel::SEARCH_BAR)?,
        });
        Ok(())
    }

    async fn load(&mut self) -> Result<()> {
        self.doctors = ListDoctors::default().execute(&self.api).await?;
        debug!("Loaded {} doctor(s)", self.doctors.len());
        Ok(())
    }

    fn attach(&mut self, viewport: &Viewport) {
        let Some(ref panels) = self.panels else {
            return;
        };

        let mut filters = Filters::default();
        viewport.render(
            &panels.doctors,
            format!("{}\n{}", filters.listing(&self.doctors), self.footer()),
        );
        viewport.render(&panels.search, filters.summary());

        let doctors = self.doctors.clone();
        let footer = self.footer();
        self.listeners
            .push(viewport.listen(&panels.search, move |event, frame| {
                filters.apply(event);
                frame.set(
                    panel::DOCTOR_LIST,
                    format!("{}\n{}", filters.listing(&doctors), footer),
                );
                frame.set(panel::SEARCH_BAR, filters.summary());
            }));
    }

    fn teardown(&mut self, viewport: &Viewport) {
        for id in self.listeners.drain(..) {
            let _ = viewport.unlisten(id);
        }
        if let Some(ref panels) = self.panels {
            viewport.render(&panels.doctors, String::new());
            viewport.render(&panels.search, String::new());
        }
    }
}
