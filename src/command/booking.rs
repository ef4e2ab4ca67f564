// SPDX-FileCopyrightText: 2024 Clinic Desk contributors
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;
use log::{error, info};

use crate::{
    api::{AvailableSlots, BookAppointment, Endpoint as _},
    app::App,
    error::{Error, Result},
    model::{clinic::Booking, RoleTag},
};

/// Show a doctor's free appointment times on a given day.
#[derive(Debug, Parser)]
pub(crate) struct Slots {
    /// The doctor's ID.
    #[arg(long)]
    doctor_id: i64,

    /// The day, as `YYYY-MM-DD`.
    #[arg(long)]
    date: String,
}

#[async_trait]
impl super::Command for Slots {
    async fn execute(self, app: &App) -> Result<()> {
        let _ = app.gate().require(None).await?;
        let slots = AvailableSlots {
            doctor_id: self.doctor_id,
            date: self.date,
        }
        .execute(app.api())
        .await?;
        if slots.available_slots.is_empty() {
            println!("No free times on that day.");
        } else {
            for slot in slots.available_slots {
                println!("{slot}");
            }
        }
        Ok(())
    }
}

/// Book an appointment with a doctor.
#[derive(Debug, Parser)]
pub(crate) struct Book {
    /// The doctor's ID.
    #[arg(long)]
    doctor_id: i64,

    /// The day, as `YYYY-MM-DD`.
    #[arg(long)]
    date: String,

    /// One of the times listed by `slots`.
    #[arg(long)]
    time: String,

    /// Why you are visiting.
    #[arg(long)]
    reason: String,

    /// Book on behalf of this patient. The server uses the signed-in patient
    /// when omitted.
    #[arg(long)]
    patient_id: Option<i64>,
}

#[async_trait]
impl super::Command for Book {
    async fn execute(self, app: &App) -> Result<()> {
        let patient = app.gate().require(Some(RoleTag::Patient)).await?;

        let slots = AvailableSlots {
            doctor_id: self.doctor_id,
            date: self.date.clone(),
        }
        .execute(app.api())
        .await?;
        if !slots.available_slots.contains(&self.time) {
            error!(
                "{} is not a free time for doctor {} on {}",
                self.time, self.doctor_id, self.date
            );
            return Err(Error::Command);
        }

        let _ = BookAppointment(Booking {
            doctor_id: self.doctor_id,
            patient_id: self.patient_id,
            date: self.date,
            time: self.time,
            reason: self.reason,
        })
        .execute(app.api())
        .await?;
        info!("Booked an appointment for {}", patient.username);
        println!("Appointment booked.");
        Ok(())
    }
}
