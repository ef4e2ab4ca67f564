// SPDX-FileCopyrightText: 2024 Clinic Desk contributors
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;
use log::info;

use crate::{
    api::{AddPrescription, DoctorAppointments, DoctorPatients, Endpoint as _},
    app::App,
    dashboard::table,
    error::Result,
    model::{clinic::Prescription, RoleTag},
};

/// List your patients.
#[derive(Debug, Parser)]
pub(crate) struct Patients {
    /// Only patients whose name or email contains this text.
    #[arg(long, short)]
    search: Option<String>,
}

#[async_trait]
impl super::Command for Patients {
    async fn execute(self, app: &App) -> Result<()> {
        let doctor = app.gate().require(Some(RoleTag::Doctor)).await?;
        let patients = DoctorPatients {
            username: doctor.username,
        }
        .execute(app.api())
        .await?;
        println!(
            "{}",
            table::render(
                table::filtered(&patients, self.search.as_deref(), |patient, query| {
                    patient.matches(query)
                }),
                "No patients found."
            )
        );
        Ok(())
    }
}

/// List your appointments.
#[derive(Debug, Parser)]
pub(crate) struct Appointments {}

#[async_trait]
impl super::Command for Appointments {
    async fn execute(self, app: &App) -> Result<()> {
        let doctor = app.gate().require(Some(RoleTag::Doctor)).await?;
        let appointments = DoctorAppointments {
            username: doctor.username,
        }
        .execute(app.api())
        .await?;
        println!(
            "{}",
            table::render(appointments, "No appointments scheduled.")
        );
        Ok(())
    }
}

/// Write a prescription for one of your patients.
#[derive(Debug, Parser)]
pub(crate) struct Prescribe {
    /// The patient's ID.
    #[arg(long)]
    patient_id: i64,

    /// The patient's name, as it should appear on the prescription.
    #[arg(long)]
    patient_name: Option<String>,

    #[arg(long)]
    medication: String,

    #[arg(long)]
    dosage: String,

    /// How long to take the medication, e.g. `7 days`.
    #[arg(long)]
    duration: Option<String>,

    #[arg(long)]
    notes: Option<String>,
}

#[async_trait]
impl super::Command for Prescribe {
    async fn execute(self, app: &App) -> Result<()> {
        let doctor = app.gate().require(Some(RoleTag::Doctor)).await?;
        let _ = AddPrescription {
            username: doctor.username,
            prescription: Prescription {
                id: None,
                patient_id: Some(self.patient_id),
                patient_name: self.patient_name,
                medication: self.medication,
                dosage: self.dosage,
                duration: self.duration,
                notes: self.notes,
            },
        }
        .execute(app.api())
        .await?;
        info!("Prescription saved for patient {}", self.patient_id);
        println!("Prescription saved.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        matchers::{body_partial_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use crate::{
        command::Command as _,
        error::{self, Error},
        model::Identity,
        testing,
    };

    use super::*;

    #[tokio::test]
    async fn prescriptions_are_filed_under_the_signed_in_doctor() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/doctors/drsmith/prescriptions"))
            .and(body_partial_json(json!({
                "patientId": 4,
                "medication": "Amoxicillin",
                "dosage": "500mg",
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 1 })))
            .expect(1)
            .mount(&server)
            .await;
        let (app, _) =
            testing::signed_in_app(&server.uri(), Identity::new("drsmith", ["ROLE_DOCTOR"])).await?;

        Prescribe {
            patient_id: 4,
            patient_name: None,
            medication: "Amoxicillin".to_owned(),
            dosage: "500mg".to_owned(),
            duration: None,
            notes: None,
        }
        .execute(&app)
        .await
    }

    #[tokio::test]
    async fn only_doctors_see_patients() -> Result<()> {
        let server = MockServer::start().await;
        let (app, _) =
            testing::signed_in_app(&server.uri(), Identity::new("root", ["ROLE_ADMIN"])).await?;

        let result = Patients { search: None }.execute(&app).await;

        assert!(matches!(
            result,
            Err(Error::Session(error::Session::Forbidden(RoleTag::Doctor)))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn expired_session_is_cleared() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/doctors/drsmith/appointments"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        let (app, _) =
            testing::signed_in_app(&server.uri(), Identity::new("drsmith", ["ROLE_DOCTOR"])).await?;

        let result = Appointments {}.execute(&app).await;

        assert!(matches!(result, Err(Error::Api(error::Api::Unauthorized))));
        assert!(!app.gate().is_authenticated().await);
        Ok(())
    }
}
