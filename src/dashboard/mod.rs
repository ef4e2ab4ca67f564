// SPDX-FileCopyrightText: 2024 Clinic Desk contributors
//
// SPDX-License-Identifier: Apache-2.0

use std::{mem, sync::Arc};

use async_trait::async_trait;
use log::{debug, info, warn};
use parking_lot::Mutex;

use crate::{
    error::Result,
    gate::SessionGate,
    http::HttpClient,
    model::RoleTag,
    view::Viewport,
};

mod caseload;
mod directory;
pub(crate) mod table;

pub(crate) use caseload::Caseload;
pub(crate) use directory::Directory;

/// One role's dashboard. The dispatcher drives each controller through
/// `bind`, `load` and `attach` exactly once, and `teardown` at most once.
#[async_trait]
pub(crate) trait Controller: Send + Sync {
    fn role(&self) -> RoleTag;

    /// Resolves the panels this controller renders into.
    fn bind(&mut self, viewport: &Viewport) -> Result<()>;

    /// Fetches the initial data. Must not touch the viewport.
    async fn load(&mut self) -> Result<()>;

    /// Renders the loaded data and registers listeners.
    fn attach(&mut self, viewport: &Viewport);

    /// Removes every listener registered by `attach` and blanks the panels.
    fn teardown(&mut self, viewport: &Viewport);
}

pub(crate) trait ControllerFactory: Send + Sync {
    fn create(&self, role: RoleTag) -> Box<dyn Controller>;
}

/// Builds the controllers backed by the clinic API.
pub(crate) struct RoleControllers {
    api: Arc<HttpClient>,
}

impl RoleControllers {
    pub(crate) fn new(api: Arc<HttpClient>) -> Self {
        Self { api }
    }
}

impl ControllerFactory for RoleControllers {
    fn create(&self, role: RoleTag) -> Box<dyn Controller> {
        match role {
            RoleTag::Admin | RoleTag::Patient => {
                Box::new(Directory::new(role, Arc::clone(&self.api)))
            }
            RoleTag::Doctor => Box::new(Caseload::new(Arc::clone(&self.api))),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Activation {
    Activated,
    AlreadyActive,
    /// A later activation or deactivation started while this one was loading.
    Superseded,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum State {
    Idle,
    Activating(RoleTag),
    Active(RoleTag),
}

enum Slot {
    Idle,
    Activating(RoleTag),
    Active(Box<dyn Controller>),
}

struct Inner {
    epoch: u64,
    slot: Slot,
}

impl Inner {
    /// Starts a new epoch and hands back whatever controller was active.
    fn advance(&mut self, next: Slot) -> (u64, Option<Box<dyn Controller>>) {
        self.epoch += 1;
        let previous = match mem::replace(&mut self.slot, next) {
            Slot::Active(controller) => Some(controller),
            Slot::Idle | Slot::Activating(_) => None,
        };
        (self.epoch, previous)
    }
}

/// Keeps at most one role controller attached to the viewport.
pub(crate) struct DashboardDispatcher {
    gate: Arc<SessionGate>,
    viewport: Arc<Viewport>,
    factory: Box<dyn ControllerFactory>,
    inner: Mutex<Inner>,
}

impl DashboardDispatcher {
    pub(crate) fn new(
        gate: Arc<SessionGate>,
        viewport: Arc<Viewport>,
        factory: Box<dyn ControllerFactory>,
    ) -> Self {
        Self {
            gate,
            viewport,
            factory,
            inner: Mutex::new(Inner {
                epoch: 0,
                slot: Slot::Idle,
            }),
        }
    }

    pub(crate) fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub(crate) fn state(&self) -> State {
        match self.inner.lock().slot {
            Slot::Idle => State::Idle,
            Slot::Activating(role) => State::Activating(role),
            Slot::Active(ref controller) => State::Active(controller.role()),
        }
    }

    pub(crate) async fn activate(&self, role: RoleTag) -> Result<Activation> {
        let (epoch, previous) = {
            let mut inner = self.inner.lock();
            if let Slot::Active(ref controller) = inner.slot {
                if controller.role() == role {
                    debug!("The {} dashboard is already active", role);
                    return Ok(Activation::AlreadyActive);
                }
            }
            inner.advance(Slot::Activating(role))
        };
        if let Some(mut previous) = previous {
            debug!("Tearing down the {} dashboard", previous.role());
            previous.teardown(&self.viewport);
        }

        let mut controller = self.factory.create(role);
        if let Err(e) = controller.bind(&self.viewport) {
            let _ = self.abandon(epoch);
            return Err(e);
        }

        if let Err(e) = controller.load().await {
            if !self.abandon(epoch) {
                warn!("Discarding a load failure from a superseded {} dashboard: {}", role, e);
                return Ok(Activation::Superseded);
            }
            controller.teardown(&self.viewport);
            return Err(e);
        }

        let mut inner = self.inner.lock();
        if inner.epoch != epoch {
            debug!("The {} dashboard was superseded while loading", role);
            return Ok(Activation::Superseded);
        }
        controller.attach(&self.viewport);
        inner.slot = Slot::Active(controller);
        info!("Activated the {} dashboard", role);
        Ok(Activation::Activated)
    }

    /// Activates the dashboard for the signed-in user's primary role, if any.
    pub(crate) async fn dispatch_from_session(&self) -> Result<Option<Activation>> {
        let Some(role) = self.gate.primary_role().await else {
            debug!("No recognized role in the session; staying idle");
            return Ok(None);
        };
        self.activate(role).await.map(Some)
    }

    pub(crate) fn deactivate(&self) {
        let (_, previous) = self.inner.lock().advance(Slot::Idle);
        if let Some(mut previous) = previous {
            debug!("Tearing down the {} dashboard", previous.role());
            previous.teardown(&self.viewport);
        }
        debug!(
            "Dashboard idle with {} listener(s) left",
            self.viewport.listener_count()
        );
    }

    /// Returns to idle if `epoch` is still current. Returns whether it was.
    fn abandon(&self, epoch: u64) -> bool {
        let mut inner = self.inner.lock();
        if inner.epoch == epoch {
            inner.slot = Slot::Idle;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::Notify;

    use crate::{
        error::{self, Error},
        model::Identity,
        storage::{Memory, Storage as _},
        testing::{self, Counts, FakeFactory, Journal, MAIN},
        view::ViewEvent,
    };

    use super::*;

    fn dispatcher(gate: Arc<SessionGate>, factory: FakeFactory) -> DashboardDispatcher {
        DashboardDispatcher::new(
            gate,
            Arc::new(Viewport::with_panels([MAIN])),
            Box::new(factory),
        )
    }

    fn attached_once() -> Counts {
        Counts {
            binds: 1,
            loads: 1,
            attaches: 1,
            teardowns: 0,
        }
    }

    #[tokio::test]
    async fn activating_the_active_role_twice_attaches_once() -> Result<()> {
        let (gate, _) = testing::gate();
        let journal = Arc::new(Journal::default());
        let dispatcher = dispatcher(
            gate,
            FakeFactory {
                journal: Arc::clone(&journal),
                ..FakeFactory::default()
            },
        );

        assert_eq!(dispatcher.activate(RoleTag::Admin).await?, Activation::Activated);
        assert_eq!(
            dispatcher.activate(RoleTag::Admin).await?,
            Activation::AlreadyActive
        );

        assert_eq!(journal.counts(RoleTag::Admin), attached_once());
        assert_eq!(dispatcher.viewport().listener_count(), 1);
        assert_eq!(dispatcher.state(), State::Active(RoleTag::Admin));
        Ok(())
    }

    #[tokio::test]
    async fn switching_roles_tears_down_the_previous_controller() -> Result<()> {
        let (gate, _) = testing::gate();
        let journal = Arc::new(Journal::default());
        let dispatcher = dispatcher(
            gate,
            FakeFactory {
                journal: Arc::clone(&journal),
                ..FakeFactory::default()
            },
        );

        let _ = dispatcher.activate(RoleTag::Admin).await?;
        let _ = dispatcher.activate(RoleTag::Patient).await?;

        assert_eq!(journal.counts(RoleTag::Admin).teardowns, 1);
        assert_eq!(dispatcher.viewport().listener_count(), 1);
        assert_eq!(
            dispatcher.viewport().dispatch(MAIN, &ViewEvent::Search("x".to_owned())),
            1
        );
        assert_eq!(
            dispatcher.viewport().content(MAIN).as_deref(),
            Some("PATIENT: x")
        );
        Ok(())
    }

    #[tokio::test]
    async fn a_superseded_activation_never_attaches() -> Result<()> {
        let (gate, _) = testing::gate();
        let journal = Arc::new(Journal::default());
        let loading = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let dispatcher = dispatcher(
            gate,
            FakeFactory {
                journal: Arc::clone(&journal),
                gated: vec![RoleTag::Doctor],
                loading: Arc::clone(&loading),
                release: Arc::clone(&release),
                ..FakeFactory::default()
            },
        );

        let (doctor, admin) = tokio::join!(dispatcher.activate(RoleTag::Doctor), async {
            loading.notified().await;
            assert_eq!(dispatcher.state(), State::Activating(RoleTag::Doctor));
            let admin = dispatcher.activate(RoleTag::Admin).await;
            release.notify_one();
            admin
        });

        assert_eq!(doctor?, Activation::Superseded);
        assert_eq!(admin?, Activation::Activated);
        assert_eq!(journal.counts(RoleTag::Doctor).attaches, 0);
        assert_eq!(dispatcher.state(), State::Active(RoleTag::Admin));
        assert_eq!(dispatcher.viewport().content(MAIN).as_deref(), Some("admin view"));
        assert_eq!(dispatcher.viewport().listener_count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn deactivating_during_load_supersedes_the_activation() -> Result<()> {
        let (gate, _) = testing::gate();
        let journal = Arc::new(Journal::default());
        let loading = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let dispatcher = dispatcher(
            gate,
            FakeFactory {
                journal: Arc::clone(&journal),
                gated: vec![RoleTag::Patient],
                loading: Arc::clone(&loading),
                release: Arc::clone(&release),
                ..FakeFactory::default()
            },
        );

        let (patient, ()) = tokio::join!(dispatcher.activate(RoleTag::Patient), async {
            loading.notified().await;
            dispatcher.deactivate();
            release.notify_one();
        });

        assert_eq!(patient?, Activation::Superseded);
        assert_eq!(dispatcher.state(), State::Idle);
        assert_eq!(dispatcher.viewport().listener_count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn missing_panel_leaves_the_dispatcher_idle() {
        let (gate, _) = testing::gate();
        let dispatcher = dispatcher(
            gate,
            FakeFactory {
                unbindable: vec![RoleTag::Doctor],
                ..FakeFactory::default()
            },
        );

        let result = dispatcher.activate(RoleTag::Doctor).await;

        assert!(matches!(
            result,
            Err(Error::Dashboard(error::Dashboard::MissingViewBinding(ref panel))) if panel == "missing"
        ));
        assert_eq!(dispatcher.state(), State::Idle);
        assert_eq!(dispatcher.viewport().listener_count(), 0);
    }

    #[tokio::test]
    async fn deactivate_removes_every_listener() -> Result<()> {
        let (gate, _) = testing::gate();
        let dispatcher = dispatcher(gate, FakeFactory::default());
        let _ = dispatcher.activate(RoleTag::Doctor).await?;

        dispatcher.deactivate();

        assert_eq!(dispatcher.state(), State::Idle);
        assert_eq!(dispatcher.viewport().listener_count(), 0);
        assert_eq!(dispatcher.viewport().content(MAIN).as_deref(), Some(""));
        Ok(())
    }

    #[tokio::test]
    async fn session_without_a_known_role_stays_idle() -> Result<()> {
        let (gate, _) = testing::signed_in_gate(Identity::new("nurse", ["ROLE_NURSE"])).await;
        let journal = Arc::new(Journal::default());
        let dispatcher = dispatcher(
            gate,
            FakeFactory {
                journal: Arc::clone(&journal),
                ..FakeFactory::default()
            },
        );

        assert_eq!(dispatcher.dispatch_from_session().await?, None);
        assert_eq!(dispatcher.state(), State::Idle);
        Ok(())
    }

    #[tokio::test]
    async fn malformed_stored_token_stays_idle() -> Result<()> {
        let mut credential = Memory::<String>::new();
        let mut identity = Memory::<Identity>::new();
        credential.update(&"not-a-jwt".to_owned()).await?;
        identity
            .update(&Identity::new("drsmith", ["ROLE_DOCTOR"]))
            .await?;
        let (gate, _) = testing::gate_over(credential, identity);
        let journal = Arc::new(Journal::default());
        let dispatcher = dispatcher(
            gate,
            FakeFactory {
                journal: Arc::clone(&journal),
                ..FakeFactory::default()
            },
        );

        assert_eq!(dispatcher.dispatch_from_session().await?, None);
        assert_eq!(journal.counts(RoleTag::Doctor), Counts::default());
        Ok(())
    }

    #[tokio::test]
    async fn session_role_selects_the_dashboard() -> Result<()> {
        let (gate, _) = testing::signed_in_gate(Identity::new("drsmith", ["ROLE_DOCTOR"])).await;
        let journal = Arc::new(Journal::default());
        let dispatcher = dispatcher(
            gate,
            FakeFactory {
                journal: Arc::clone(&journal),
                ..FakeFactory::default()
            },
        );

        assert_eq!(
            dispatcher.dispatch_from_session().await?,
            Some(Activation::Activated)
        );
        assert_eq!(journal.counts(RoleTag::Doctor), attached_once());
        Ok(())
    }
}
