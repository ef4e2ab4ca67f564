// SPDX-FileCopyrightText: 2024 Clinic Desk contributors
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use secrecy::{ExposeSecret as _, SecretString};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};

use crate::{
    error::Result,
    http::{HttpClient, PendingRequest},
    model::clinic::{Appointment, Booking, Doctor, DoctorForm, Patient, Prescription, Slots},
};

fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[async_trait]
pub(crate) trait Endpoint: Sized + Send {
    type Response: DeserializeOwned + Send;

    fn into_request(self) -> Result<PendingRequest>;

    async fn execute(self, client: &HttpClient) -> Result<Self::Response> {
        let req = self.into_request()?;
        Ok(client.fetch(req).await?)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct SignInResponse {
    pub(crate) token: String,
    pub(crate) username: Option<String>,
    #[serde(default)]
    pub(crate) roles: Vec<String>,
}

pub(crate) struct SignIn {
    pub(crate) username: String,
    pub(crate) password: SecretString,
}

impl Endpoint for SignIn {
    type Response = SignInResponse;

    fn into_request(self) -> Result<PendingRequest> {
        PendingRequest::post("/api/auth/signin")
            .anonymous()
            .with_json(&json!({
                "username": self.username,
                "password": self.password.expose_secret(),
            }))
    }
}

/// Patient self-registration. Needs no session.
pub(crate) struct RegisterPatient {
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) phone_number: String,
    pub(crate) address: String,
    pub(crate) password: SecretString,
}

impl Endpoint for RegisterPatient {
    type Response = Value;

    fn into_request(self) -> Result<PendingRequest> {
        PendingRequest::post("/api/auth/patient/register")
            .anonymous()
            .with_json(&json!({
                "name": self.name,
                "email": self.email,
                "phoneNumber": self.phone_number,
                "address": self.address,
                "password": self.password.expose_secret(),
            }))
    }
}

#[derive(Debug, Default)]
pub(crate) struct ListDoctors {
    pub(crate) name: Option<String>,
    pub(crate) specialty: Option<String>,
}

impl Endpoint for ListDoctors {
    type Response = Vec<Doctor>;

    fn into_request(self) -> Result<PendingRequest> {
        let mut req = PendingRequest::get("/api/doctors");
        if let Some(name) = self.name {
            req = req.with_query("name", name);
        }
        if let Some(specialty) = self.specialty {
            req = req.with_query("specialty", specialty);
        }
        Ok(req)
    }
}

pub(crate) struct CreateDoctor(pub(crate) DoctorForm);

impl Endpoint for CreateDoctor {
    type Response = Doctor;

    fn into_request(self) -> Result<PendingRequest> {
        PendingRequest::post("/api/admin/doctors").with_json(&self.0)
    }
}

pub(crate) struct UpdateDoctor {
    pub(crate) id: i64,
    pub(crate) form: DoctorForm,
}

impl Endpoint for UpdateDoctor {
    type Response = Doctor;

    fn into_request(self) -> Result<PendingRequest> {
        PendingRequest::put(format!("/api/admin/doctors/{}", self.id)).with_json(&self.form)
    }
}

pub(crate) struct DeleteDoctor {
    pub(crate) id: i64,
}

impl Endpoint for DeleteDoctor {
    type Response = Value;

    fn into_request(self) -> Result<PendingRequest> {
        Ok(PendingRequest::delete(format!(
            "/api/admin/doctors/{}",
            self.id
        )))
    }
}

pub(crate) struct DoctorPatients {
    pub(crate) username: String,
}

impl Endpoint for DoctorPatients {
    type Response = Vec<Patient>;

    fn into_request(self) -> Result<PendingRequest> {
        Ok(PendingRequest::get(format!(
            "/api/doctors/{}/patients",
            segment(&self.username)
        )))
    }
}

pub(crate) struct DoctorAppointments {
    pub(crate) username: String,
}

impl Endpoint for DoctorAppointments {
    type Response = Vec<Appointment>;

    fn into_request(self) -> Result<PendingRequest> {
        Ok(PendingRequest::get(format!(
            "/api/doctors/{}/appointments",
            segment(&self.username)
        )))
    }
}

pub(crate) struct AddPrescription {
    pub(crate) username: String,
    pub(crate) prescription: Prescription,
}

impl Endpoint for AddPrescription {
    type Response = Value;

    fn into_request(self) -> Result<PendingRequest> {
        PendingRequest::post(format!(
            "/api/doctors/{}/prescriptions",
            segment(&self.username)
        ))
        .with_json(&self.prescription)
    }
}

pub(crate) struct AvailableSlots {
    pub(crate) doctor_id: i64,
    pub(crate) date: String,
}

impl Endpoint for AvailableSlots {
    type Response = Slots;

    fn into_request(self) -> Result<PendingRequest> {
        Ok(PendingRequest::get("/api/appointments/available-slots")
            .with_query("doctorId", self.doctor_id)
            .with_query("date", self.date))
    }
}

pub(crate) struct BookAppointment(pub(crate) Booking);

impl Endpoint for BookAppointment {
    type Response = Value;

    fn into_request(self) -> Result<PendingRequest> {
        PendingRequest::post("/api/appointments/book").with_json(&self.0)
    }
}
