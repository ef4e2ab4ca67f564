// SPDX-FileCopyrightText: 2024 Clinic Desk contributors
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use inflector::Inflector as _;
use log::trace;
use parking_lot::Mutex;

use crate::{
    error,
    model::clinic::{DayPart, SortOrder},
};

/// Panel identifiers shared by the role controllers.
pub(crate) mod panel {
    pub(crate) const SEARCH_BAR: &str = "searchBar";
    pub(crate) const DOCTOR_LIST: &str = "doctorList";
    pub(crate) const PATIENT_LIST: &str = "patientList";
    pub(crate) const APPOINTMENT_LIST: &str = "appointmentList";

    pub(crate) const ALL: [&str; 4] = [SEARCH_BAR, DOCTOR_LIST, PATIENT_LIST, APPOINTMENT_LIST];
}

pub(crate) type ListenerId = u64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ViewEvent {
    Search(String),
    /// Keep only this specialty, or every specialty with `None`.
    Specialty(Option<String>),
    Hours(Option<DayPart>),
    Order(Option<SortOrder>),
    Reset,
}

/// Proof that a panel existed when a controller bound to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Binding {
    panel: String,
}

impl Binding {
    pub(crate) fn panel(&self) -> &str {
        &self.panel
    }
}

/// The panel contents, as handed to listeners.
#[derive(Default)]
pub(crate) struct Frame {
    panels: BTreeMap<String, String>,
}

impl Frame {
    /// Replaces a panel's content. Unknown panels are ignored.
    pub(crate) fn set(&mut self, panel: &str, content: String) {
        if let Some(slot) = self.panels.get_mut(panel) {
            *slot = content;
        }
    }
}

type Handler = Box<dyn FnMut(&ViewEvent, &mut Frame) + Send>;

struct Listener {
    id: ListenerId,
    panel: String,
    handler: Handler,
}

#[derive(Default)]
struct Inner {
    frame: Frame,
    listeners: Vec<Listener>,
    next_id: ListenerId,
}

/// Named panels that role controllers render into and listen on.
#[derive(Default)]
pub(crate) struct Viewport {
    inner: Mutex<Inner>,
}

impl Viewport {
    pub(crate) fn with_panels<I, S>(panels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let panels = panels
            .into_iter()
            .map(|panel| (panel.into(), String::new()))
            .collect();
        Self {
            inner: Mutex::new(Inner {
                frame: Frame { panels },
                ..Inner::default()
            }),
        }
    }

    /// The layout every dashboard expects.
    pub(crate) fn dashboard() -> Self {
        Self::with_panels(panel::ALL)
    }

    pub(crate) fn bind(&self, panel: &str) -> Result<Binding, error::Dashboard> {
        if self.inner.lock().frame.panels.contains_key(panel) {
            Ok(Binding {
                panel: panel.to_owned(),
            })
        } else {
            Err(error::Dashboard::MissingViewBinding(panel.to_owned()))
        }
    }

    pub(crate) fn render(&self, binding: &Binding, content: String) {
        self.inner.lock().frame.set(&binding.panel, content);
    }

    pub(crate) fn content(&self, panel: &str) -> Option<String> {
        self.inner.lock().frame.panels.get(panel).cloned()
    }

    pub(crate) fn listen<F>(&self, binding: &Binding, handler: F) -> ListenerId
    where
        F: FnMut(&ViewEvent, &mut Frame) + Send + 'static,
    {
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.listeners.push(Listener {
            id,
            panel: binding.panel.clone(),
            handler: Box::new(handler),
        });
        id
    }

    pub(crate) fn unlisten(&self, id: ListenerId) -> bool {
        let mut inner = self.inner.lock();
        let before = inner.listeners.len();
        inner.listeners.retain(|listener| listener.id != id);
        inner.listeners.len() != before
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.inner.lock().listeners.len()
    }

    /// Delivers `event` to every listener on `panel` and returns how many
    /// there were. Handlers must not call back into the viewport.
    pub(crate) fn dispatch(&self, panel: &str, event: &ViewEvent) -> usize {
        let mut guard = self.inner.lock();
        let Inner {
            ref mut frame,
            ref mut listeners,
            ..
        } = *guard;
        let mut delivered = 0_usize;
        for listener in listeners.iter_mut().filter(|listener| listener.panel == panel) {
            (listener.handler)(event, frame);
            delivered += 1;
        }
        trace!("Delivered {:?} to {} listener(s) on #{}", event, delivered, panel);
        delivered
    }

    /// Every panel with content, each under a heading.
    pub(crate) fn snapshot(&self) -> String {
        let inner = self.inner.lock();
        inner
            .frame
            .panels
            .iter()
            .filter(|(_, content)| !content.is_empty())
            .map(|(panel, content)| format!("== {} ==\n{}\n", panel.to_title_case(), content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
