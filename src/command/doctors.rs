// SPDX-FileCopyrightText: 2024 Clinic Desk contributors
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::{Args, Parser, Subcommand};
use log::info;

use super::Command as _;
use crate::{
    api::{CreateDoctor, DeleteDoctor, Endpoint as _, ListDoctors, UpdateDoctor},
    app::App,
    dashboard::table,
    error::Result,
    model::{clinic::DoctorForm, RoleTag},
};

/// Browse or manage the clinic's doctors.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    #[command(subcommand)]
    action: Action,
}

#[derive(Debug, Subcommand)]
enum Action {
    List(List),
    Add(Add),
    Update(Update),
    Delete(Delete),
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, app: &App) -> Result<()> {
        match self.action {
            Action::List(cmd) => cmd.execute(app).await,
            Action::Add(cmd) => cmd.execute(app).await,
            Action::Update(cmd) => cmd.execute(app).await,
            Action::Delete(cmd) => cmd.execute(app).await,
        }
    }
}

/// List doctors, optionally filtered on the server.
#[derive(Debug, Parser)]
struct List {
    /// Only doctors whose name contains this text.
    #[arg(long)]
    name: Option<String>,

    /// Only doctors with this specialty.
    #[arg(long)]
    specialty: Option<String>,
}

#[async_trait]
impl super::Command for List {
    async fn execute(self, app: &App) -> Result<()> {
        let _ = app.gate().require(None).await?;
        let doctors = ListDoctors {
            name: self.name,
            specialty: self.specialty,
        }
        .execute(app.api())
        .await?;
        println!("{}", table::render(doctors, "No doctors found."));
        Ok(())
    }
}

#[derive(Debug, Args)]
struct Details {
    /// Full name.
    #[arg(long)]
    name: String,

    #[arg(long)]
    specialty: String,

    #[arg(long)]
    email: String,

    #[arg(long)]
    phone: Option<String>,

    /// Times the doctor takes appointments, e.g. `09:00-10:00`. Repeat or
    /// separate with commas.
    #[arg(long = "available-time", value_delimiter = ',')]
    available_times: Vec<String>,
}

impl Details {
    fn into_form(self, password: Option<String>) -> DoctorForm {
        DoctorForm {
            name: self.name,
            specialty: self.specialty,
            email: self.email,
            phone_number: self.phone,
            available_times: self.available_times,
            password,
        }
    }
}

/// Register a new doctor.
#[derive(Debug, Parser)]
struct Add {
    #[command(flatten)]
    details: Details,

    /// The password the doctor signs in with.
    #[arg(long)]
    password: String,
}

#[async_trait]
impl super::Command for Add {
    async fn execute(self, app: &App) -> Result<()> {
        let _ = app.gate().require(Some(RoleTag::Admin)).await?;
        let doctor = CreateDoctor(self.details.into_form(Some(self.password)))
            .execute(app.api())
            .await?;
        info!("Created doctor {}", doctor.name);
        println!("{}", table::render(vec![doctor], ""));
        Ok(())
    }
}

/// Replace a doctor's details.
#[derive(Debug, Parser)]
struct Update {
    /// The doctor's ID.
    id: i64,

    #[command(flatten)]
    details: Details,

    /// A new password. The current one is kept when omitted.
    #[arg(long)]
    password: Option<String>,
}

#[async_trait]
impl super::Command for Update {
    async fn execute(self, app: &App) -> Result<()> {
        let _ = app.gate().require(Some(RoleTag::Admin)).await?;
        let doctor = UpdateDoctor {
            id: self.id,
            form: self.details.into_form(self.password),
        }
        .execute(app.api())
        .await?;
        println!("{}", table::render(vec![doctor], ""));
        Ok(())
    }
}

/// Remove a doctor.
#[derive(Debug, Parser)]
struct Delete {
    /// The doctor's ID.
    id: i64,
}

#[async_trait]
impl super::Command for Delete {
    async fn execute(self, app: &App) -> Result<()> {
        let _ = app.gate().require(Some(RoleTag::Admin)).await?;
        let _ = DeleteDoctor { id: self.id }.execute(app.api()).await?;
        println!("Deleted doctor {}.", self.id);
        Ok(())
    }
}
