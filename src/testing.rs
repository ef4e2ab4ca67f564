// SPDX-FileCopyrightText: 2024 Clinic Desk contributors
//
// SPDX-License-Identifier: Apache-2.0

//! Fakes shared by the unit tests.

use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};

use async_trait::async_trait;
use parking_lot::Mutex;
use secrecy::SecretString;
use tokio::sync::Notify;

use crate::{
    app::App,
    dashboard::{Controller, ControllerFactory},
    error::{Error, Result},
    gate::{Navigator, Route, SessionGate},
    http::HttpClient,
    model::{Credential, Identity, RoleTag},
    password::{Prompt, Request},
    storage::Memory,
    token_store::TokenStore,
    view::{Binding, ListenerId, ViewEvent, Viewport},
};

#[derive(Default)]
pub(crate) struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub(crate) fn routes(&self) -> Vec<Route> {
        self.routes.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().push(route);
    }
}

pub(crate) fn credential() -> Credential {
    // LINT: Constant input.
    #[allow(clippy::unwrap_used)]
    Credential::parse("a.b.c").unwrap()
}

pub(crate) fn gate() -> (Arc<SessionGate>, Arc<RecordingNavigator>) {
    gate_over(Memory::new(), Memory::new())
}

pub(crate) fn gate_over(
    credential: Memory<String>,
    identity: Memory<Identity>,
) -> (Arc<SessionGate>, Arc<RecordingNavigator>) {
    let navigator = Arc::new(RecordingNavigator::default());
    let store = TokenStore::new(Box::new(credential), Box::new(identity));
    let gate = SessionGate::new(store, Arc::clone(&navigator) as Arc<dyn Navigator>);
    (Arc::new(gate), navigator)
}

pub(crate) async fn signed_in_gate(identity: Identity) -> (Arc<SessionGate>, Arc<RecordingNavigator>) {
    let (gate, navigator) = gate();
    assert!(gate.establish(&credential(), &identity).await);
    (gate, navigator)
}

/// A client for a mock backend at `uri`.
pub(crate) fn api(uri: &str, gate: Arc<SessionGate>) -> Result<Arc<HttpClient>> {
    let base = url::Url::parse(uri).map_err(|_| Error::Command)?;
    Ok(Arc::new(HttpClient::new(base, gate)?))
}

/// Answers prompts from a script. An exhausted script means nobody is there.
#[derive(Default)]
pub(crate) struct ScriptedPrompt {
    lines: Mutex<VecDeque<String>>,
    secrets: Mutex<VecDeque<String>>,
    errors: Arc<Mutex<Vec<String>>>,
}

impl ScriptedPrompt {
    pub(crate) fn new<L, S>(lines: L, secrets: S) -> Self
    where
        L: IntoIterator<Item = &'static str>,
        S: IntoIterator<Item = &'static str>,
    {
        Self {
            lines: Mutex::new(lines.into_iter().map(str::to_owned).collect()),
            secrets: Mutex::new(secrets.into_iter().map(str::to_owned).collect()),
            errors: Arc::default(),
        }
    }

    /// The errors shown alongside prompts so far.
    pub(crate) fn errors(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.errors)
    }

    fn note(&self, req: &Request) {
        if let Some(error) = req.error() {
            self.errors.lock().push(error.to_owned());
        }
    }
}

#[async_trait]
impl Prompt for ScriptedPrompt {
    async fn line(&self, req: Request) -> Result<Option<String>> {
        self.note(&req);
        Ok(self.lines.lock().pop_front())
    }

    async fn secret(&self, req: Request) -> Result<Option<SecretString>> {
        self.note(&req);
        Ok(self.secrets.lock().pop_front().map(SecretString::new))
    }
}

/// An [`App`] talking to the mock backend at `uri`, with an in-memory session.
pub(crate) fn app(uri: &str, prompt: ScriptedPrompt) -> Result<(App, Arc<RecordingNavigator>)> {
    let navigator = Arc::new(RecordingNavigator::default());
    let store = TokenStore::new(Box::new(Memory::<String>::new()), Box::new(Memory::<Identity>::new()));
    let base = url::Url::parse(uri).map_err(|_| Error::Command)?;
    let app = App::new(
        base,
        store,
        Arc::clone(&navigator) as Arc<dyn Navigator>,
        Box::new(prompt),
    )?;
    Ok((app, navigator))
}

/// Like [`app`], already signed in as `identity`.
pub(crate) async fn signed_in_app(
    uri: &str,
    identity: Identity,
) -> Result<(App, Arc<RecordingNavigator>)> {
    let (app, navigator) = app(uri, ScriptedPrompt::default())?;
    assert!(app.gate().establish(&credential(), &identity).await);
    Ok((app, navigator))
}

/// What the fake controllers did, counted per role.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Counts {
    pub(crate) binds: usize,
    pub(crate) loads: usize,
    pub(crate) attaches: usize,
    pub(crate) teardowns: usize,
}

#[derive(Default)]
pub(crate) struct Journal {
    counts: Mutex<HashMap<RoleTag, Counts>>,
}

impl Journal {
    pub(crate) fn counts(&self, role: RoleTag) -> Counts {
        self.counts.lock().get(&role).cloned().unwrap_or_default()
    }

    fn record(&self, role: RoleTag, update: impl FnOnce(&mut Counts)) {
        update(self.counts.lock().entry(role).or_default());
    }
}

/// The single panel every fake controller renders into.
pub(crate) const MAIN: &str = "main";

/// Builds fake controllers. Each renders "<role> view" into [`MAIN`] and
/// registers one listener there. A role listed in `gated` waits for
/// `release` during its load after signalling `loading`.
#[derive(Default)]
pub(crate) struct FakeFactory {
    pub(crate) journal: Arc<Journal>,
    pub(crate) gated: Vec<RoleTag>,
    pub(crate) unbindable: Vec<RoleTag>,
    pub(crate) loading: Arc<Notify>,
    pub(crate) release: Arc<Notify>,
}

impl ControllerFactory for FakeFactory {
    fn create(&self, role: RoleTag) -> Box<dyn Controller> {
        Box::new(FakeController {
            role,
            journal: Arc::clone(&self.journal),
            gated: self.gated.contains(&role),
            unbindable: self.unbindable.contains(&role),
            loading: Arc::clone(&self.loading),
            release: Arc::clone(&self.release),
            main: None,
            listeners: Vec::new(),
        })
    }
}

struct FakeController {
    role: RoleTag,
    journal: Arc<Journal>,
    gated: bool,
    unbindable: bool,
    loading: Arc<Notify>,
    release: Arc<Notify>,
    main: Option<Binding>,
    listeners: Vec<ListenerId>,
}

#[async_trait]
impl Controller for FakeController {
    fn role(&self) -> RoleTag {
        self.role
    }

    fn bind(&mut self, viewport: &Viewport) -> Result<()> {
        self.journal.record(self.role, |counts| counts.binds += 1);
        let panel = if self.unbindable { "missing" } else { MAIN };
        self.main = Some(viewport.bind(panel)?);
        Ok(())
    }

    async fn load(&mut self) -> Result<()> {
        self.journal.record(self.role, |counts| counts.loads += 1);
        if self.gated {
            self.loading.notify_one();
            self.release.notified().await;
        }
        Ok(())
    }

    fn attach(&mut self, viewport: &Viewport) {
        self.journal.record(self.role, |counts| counts.attaches += 1);
        if let Some(ref main) = self.main {
            viewport.render(main, format!("{} view", self.role.as_str().to_lowercase()));
            let label = self.role.as_str();
            self.listeners
                .push(viewport.listen(main, move |event, frame| {
                    if let ViewEvent::Search(ref query) = *event {
                        frame.set(MAIN, format!("{label}: {query}"));
                    }
                }));
        }
    }

    fn teardown(&mut self, viewport: &Viewport) {
        self.journal.record(self.role, |counts| counts.teardowns += 1);
        for id in self.listeners.drain(..) {
            let _ = viewport.unlisten(id);
        }
        if let Some(ref main) = self.main {
            viewport.render(main, String::new());
        }
    }
}
