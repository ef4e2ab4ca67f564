// SPDX-FileCopyrightText: 2024 Clinic Desk contributors
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use super::{table, Controller};
use crate::{
    api::{DoctorAppointments, DoctorPatients, Endpoint as _},
    error::{self, Result},
    http::HttpClient,
    model::{
        clinic::{Appointment, Patient},
        RoleTag,
    },
    view::{panel, Binding, ListenerId, ViewEvent, Viewport},
};

fn patient_listing(patients: &[Patient], query: Option<&str>) -> String {
    let rows = table::filtered(patients, query, Patient::matches);
    let empty = match query {
        Some(query) => format!("No patients match \"{query}\"."),
        None => "You have no patients yet.".to_owned(),
    };
    table::render(rows, &empty)
}

fn search_line(query: Option<&str>) -> String {
    match query {
        Some(query) => format!("Search: {query}"),
        None => "Search patients by name or email.".to_owned(),
    }
}

struct Panels {
    patients: Binding,
    appointments: Binding,
    search: Binding,
}

/// A doctor's patients and upcoming appointments.
pub(crate) struct Caseload {
    api: Arc<HttpClient>,
    panels: Option<Panels>,
    patients: Vec<Patient>,
    appointments: Vec<Appointment>,
    listeners: Vec<ListenerId>,
}

impl Caseload {
    pub(crate) fn new(api: Arc<HttpClient>) -> Self {
        Self {
            api,
            panels: None,
            patients: Vec::new(),
            appointments: Vec::new(),
            listeners: Vec::new(),
        }
    }
}

#[async_trait]
impl Controller for Caseload {
    fn role(&self) -> RoleTag {
        RoleTag::Doctor
    }

    fn bind(&mut self, viewport: &Viewport) -> Result<()> {
        self.panels = Some(Panels {
            patients: viewport.bind(panel::PATIENT_LIST)?,
            appointments: viewport.bind(panel::APPOINTMENT_LIST)?,
            search: viewport.bind(panel::SEARCH_BAR)?,
        });
        Ok(())
    }

    async fn load(&mut self) -> Result<()> {
        let username = self
            .api
            .gate()
            .identity()
            .await
            .ok_or(error::Session::NotAuthenticated)?
            .username;

        let (patients, appointments) = tokio::try_join!(
            DoctorPatients {
                username: username.clone(),
            }
            .execute(&self.api),
            DoctorAppointments { username }.execute(&self.api),
        )?;
        debug!(
            "Loaded {} patient(s) and {} appointment(s)",
            patients.len(),
            appointments.len()
        );
        self.patients = patients;
        self.appointments = appointments;
        Ok(())
    }

    fn attach(&mut self, viewport: &Viewport) {
        let Some(ref panels) = self.panels else {
            return;
        };

        viewport.render(&panels.patients, patient_listing(&self.patients, None));
        viewport.render(
            &panels.appointments,
            table::render(
                self.appointments.iter().collect::<Vec<&Appointment>>(),
                "No appointments scheduled.",
            ),
        );
        viewport.render(&panels.search, search_line(None));

        let patients = self.patients.clone();
        self.listeners
            .push(viewport.listen(&panels.search, move |event, frame| {
                let query = match *event {
                    ViewEvent::Search(ref query) => Some(query.as_str()),
                    ViewEvent::Reset => None,
                    ViewEvent::Specialty(_) | ViewEvent::Hours(_) | ViewEvent::Order(_) => return,
                };
                frame.set(panel::PATIENT_LIST, patient_listing(&patients, query));
                frame.set(panel::SEARCH_BAR, search_line(query));
            }));
    }

    fn teardown(&mut self, viewport: &Viewport) {
        for id in self.listeners.drain(..) {
            let _ = viewport.unlisten(id);
        }
        if let Some(ref panels) = self.panels {
            for binding in [&panels.patients, &panels.appointments, &panels.search] {
                viewport.render(binding, String::new());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        matchers::{header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use crate::{
        dashboard::{DashboardDispatcher, RoleControllers, State},
        model::Identity,
        testing,
    };

    use super::*;

    #[tokio::test]
    async fn loads_the_signed_in_doctors_caseload() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/doctors/drsmith/patients"))
            .and(header("authorization", "Bearer a.b.c"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 4, "name": "Ada Lovelace", "email": "ada@example.org" },
                { "id": 5, "name": "Alan Turing", "email": "alan@example.org" },
            ])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/doctors/drsmith/appointments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": 9,
                "appointmentDateTime": "2024-05-02T09:30",
                "patient": { "id": 4, "name": "Ada Lovelace" },
                "reason": "Checkup",
                "status": "SCHEDULED",
            }])))
            .expect(1)
            .mount(&server)
            .await;
        let (gate, _) = testing::signed_in_gate(Identity::new("drsmith", ["ROLE_DOCTOR"])).await;
        let viewport = Arc::new(Viewport::dashboard());
        let dispatcher = DashboardDispatcher::new(
            Arc::clone(&gate),
            Arc::clone(&viewport),
            Box::new(RoleControllers::new(testing::api(&server.uri(), gate)?)),
        );

        let _ = dispatcher.dispatch_from_session().await?;

        assert_eq!(dispatcher.state(), State::Active(RoleTag::Doctor));
        assert!(viewport
            .content(panel::APPOINTMENT_LIST)
            .unwrap_or_default()
            .contains("Checkup"));

        let _ = viewport.dispatch(panel::SEARCH_BAR, &ViewEvent::Search("alan@".to_owned()));
        let patients = viewport.content(panel::PATIENT_LIST).unwrap_or_default();
        assert!(patients.contains("Alan Turing"));
        assert!(!patients.contains("Ada Lovelace"));

        let _ = viewport.dispatch(panel::SEARCH_BAR, &ViewEvent::Reset);
        let patients = viewport.content(panel::PATIENT_LIST).unwrap_or_default();
        assert!(patients.contains("Ada Lovelace"));
        Ok(())
    }

    #[tokio::test]
    async fn empty_caseload_shows_placeholders() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        let (gate, _) = testing::signed_in_gate(Identity::new("drsmith", ["ROLE_DOCTOR"])).await;
        let viewport = Arc::new(Viewport::dashboard());
        let dispatcher = DashboardDispatcher::new(
            Arc::clone(&gate),
            Arc::clone(&viewport),
            Box::new(RoleControllers::new(testing::api(&server.uri(), gate)?)),
        );

        let _ = dispatcher.activate(RoleTag::Doctor).await?;

        assert_eq!(
            viewport.content(panel::PATIENT_LIST).as_deref(),
            Some("You have no patients yet.")
        );
        assert_eq!(
            viewport.content(panel::APPOINTMENT_LIST).as_deref(),
            Some("No appointments scheduled.")
        );
        Ok(())
    }
}
