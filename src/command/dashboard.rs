// SPDX-FileCopyrightText: 2024 Clinic Desk contributors
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;
use log::{debug, error};

use crate::{
    app::App,
    dashboard::Activation,
    error::{Error, Result},
    model::{
        clinic::{DayPart, SortOrder},
        RoleTag,
    },
    view::{panel, ViewEvent},
};

/// Show the dashboard for your role.
#[derive(Debug, Default, Parser)]
pub(crate) struct Command {
    /// Open the dashboard of another role you hold instead of your primary
    /// one.
    #[arg(long, value_enum)]
    role: Option<RoleTag>,

    /// Filter the dashboard's main list.
    #[arg(long, short)]
    search: Option<String>,

    /// Only doctors with this specialty.
    #[arg(long)]
    specialty: Option<String>,

    /// Only doctors with times in the morning or the afternoon.
    #[arg(long, value_enum)]
    hours: Option<DayPart>,

    /// Order doctors by when they were added.
    #[arg(long, value_enum)]
    order: Option<SortOrder>,
}

impl Command {
    fn events(&self) -> Vec<ViewEvent> {
        let mut events = Vec::new();
        if let Some(ref query) = self.search {
            events.push(ViewEvent::Search(query.clone()));
        }
        if self.specialty.is_some() {
            events.push(ViewEvent::Specialty(self.specialty.clone()));
        }
        if self.hours.is_some() {
            events.push(ViewEvent::Hours(self.hours));
        }
        if self.order.is_some() {
            events.push(ViewEvent::Order(self.order));
        }
        events
    }
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, app: &App) -> Result<()> {
        let identity = app.gate().require(self.role).await?;
        let dispatcher = app.dispatcher();

        let activation = match self.role {
            Some(role) => dispatcher.activate(role).await?,
            None => {
                let Some(activation) = dispatcher.dispatch_from_session().await? else {
                    error!(
                        "There is no dashboard for the roles of {}: {}",
                        identity.username,
                        identity.roles.join(", ")
                    );
                    return Err(Error::Command);
                };
                activation
            }
        };
        if activation == Activation::Superseded {
            return Err(Error::Cancelled);
        }

        for event in self.events() {
            let delivered = dispatcher.viewport().dispatch(panel::SEARCH_BAR, &event);
            debug!("{:?} reached {} listener(s)", event, delivered);
        }
        println!("{}", dispatcher.viewport().snapshot());
        Ok(())
    }
}
