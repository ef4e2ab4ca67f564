// SPDX-FileCopyrightText: 2024 Clinic Desk contributors
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use url::Url;

use crate::{
    dashboard::{DashboardDispatcher, RoleControllers},
    error::Result,
    gate::{Navigator, SessionGate},
    http::HttpClient,
    password::Prompt,
    token_store::TokenStore,
    view::Viewport,
};

/// Everything a command needs, wired together once per invocation.
pub(crate) struct App {
    gate: Arc<SessionGate>,
    api: Arc<HttpClient>,
    dispatcher: DashboardDispatcher,
    prompt: Box<dyn Prompt>,
}

impl App {
    pub(crate) fn new(
        base: Url,
        store: TokenStore,
        navigator: Arc<dyn Navigator>,
        prompt: Box<dyn Prompt>,
    ) -> Result<Self> {
        let gate = Arc::new(SessionGate::new(store, navigator));
        let api = Arc::new(HttpClient::new(base, Arc::clone(&gate))?);
        let dispatcher = DashboardDispatcher::new(
            Arc::clone(&gate),
            Arc::new(Viewport::dashboard()),
            Box::new(RoleControllers::new(Arc::clone(&api))),
        );
        Ok(Self {
            gate,
            api,
            dispatcher,
            prompt,
        })
    }

    pub(crate) fn gate(&self) -> &SessionGate {
        &self.gate
    }

    pub(crate) fn api(&self) -> &HttpClient {
        &self.api
    }

    pub(crate) fn dispatcher(&self) -> &DashboardDispatcher {
        &self.dispatcher
    }

    pub(crate) fn prompt(&self) -> &dyn Prompt {
        &*self.prompt
    }
}
