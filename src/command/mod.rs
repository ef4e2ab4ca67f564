// SPDX-FileCopyrightText: 2024 Clinic Desk contributors
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;

use crate::{app::App, error::Result};

pub(crate) mod booking;
pub(crate) mod care;
pub(crate) mod dashboard;
pub(crate) mod doctors;
pub(crate) mod session;

#[async_trait]
pub(crate) trait Command {
    async fn execute(self, app: &App) -> Result<()>;
}
