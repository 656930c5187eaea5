use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::TimeZone;
use equipment_client::EquipmentApi;
use equipment_core::{has_violation, project, project_in, ChartSeries, RecordId};
use tracing::debug;

use crate::alert::{AlertSink, ComplianceMonitor};
use crate::config::PanelConfig;
use crate::dispatcher::ActionDispatcher;
use crate::error::PanelError;
use crate::form::{FormMode, FormState};
use crate::store::{DataStore, RecordSnapshot};

/// The equipment panel: record list, open form, compliance alerts and chart.
///
/// All state is owned by the instance and changed only through its methods.
/// Share it across tasks with `Arc`; every method takes `&self`.
///
/// # Examples
///
/// ```ignore
/// let api = Arc::new(HttpEquipmentApi::new("http://localhost:8080"));
/// let panel = EquipmentPanel::new(api, Arc::new(LogAlert), PanelConfig::default());
///
/// panel.mount().await?;
///
/// panel.open_create();
/// panel.edit_form(|f| {
///     f.set_temperature(72.0);
///     f.set_pressure(110.0);
/// })?;
/// panel.submit().await?;
///
/// let chart = panel.chart();
/// ```
pub struct EquipmentPanel {
    store: Arc<DataStore>,
    dispatcher: ActionDispatcher,
    monitor: Arc<ComplianceMonitor>,
    form: Mutex<Option<FormState>>,
    next_form: AtomicU64,
}

impl EquipmentPanel {
    /// Build an unmounted panel. The store starts empty; call [`mount`](Self::mount).
    pub fn new(api: Arc<dyn EquipmentApi>, alerts: Arc<dyn AlertSink>, config: PanelConfig) -> Self {
        let store = Arc::new(DataStore::new());
        let monitor = Arc::new(ComplianceMonitor::new(config.alert_policy, alerts));
        {
            let monitor = Arc::clone(&monitor);
            store.subscribe(move |snapshot| {
                monitor.observe(snapshot);
            });
        }
        let dispatcher = ActionDispatcher::new(api, Arc::clone(&store), config.serialize_mutations);

        Self {
            store,
            dispatcher,
            monitor,
            form: Mutex::new(None),
            next_form: AtomicU64::new(1),
        }
    }

    // ====================================================================
    // Data
    // ====================================================================

    /// Initial load. Same as [`refresh`](Self::refresh).
    pub async fn mount(&self) -> Result<usize, PanelError> {
        debug!("mounting equipment panel");
        self.dispatcher.refresh().await
    }

    pub async fn refresh(&self) -> Result<usize, PanelError> {
        self.dispatcher.refresh().await
    }

    pub fn records(&self) -> RecordSnapshot {
        self.store.snapshot()
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.store
    }

    // ====================================================================
    // Derived views
    // ====================================================================

    /// Threshold check over the current list.
    pub fn is_violating(&self) -> bool {
        has_violation(&self.store.snapshot())
    }

    pub fn alerts_raised(&self) -> usize {
        self.monitor.alerts_raised()
    }

    /// Chart projection with labels in the local time zone.
    pub fn chart(&self) -> ChartSeries {
        project(&self.store.snapshot())
    }

    pub fn chart_in<Tz>(&self, tz: &Tz) -> ChartSeries
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        project_in(&self.store.snapshot(), tz)
    }

    // ====================================================================
    // Form
    // ====================================================================

    /// Open a create form with default fields, replacing any open form.
    pub fn open_create(&self) -> FormState {
        let form = FormState::creating().with_generation(self.next_generation());
        *self.lock_form() = Some(form.clone());
        form
    }

    /// Open an edit form populated from the stored record with `id`.
    pub fn open_edit(&self, id: &RecordId) -> Result<FormState, PanelError> {
        let form = self
            .store
            .find(id)
            .as_ref()
            .and_then(FormState::editing)
            .ok_or_else(|| PanelError::UnknownRecord(id.clone()))?
            .with_generation(self.next_generation());
        *self.lock_form() = Some(form.clone());
        Ok(form)
    }

    /// The open form, if any.
    pub fn form(&self) -> Option<FormState> {
        self.lock_form().clone()
    }

    /// Change fields of the open form.
    pub fn edit_form<F>(&self, edit: F) -> Result<FormState, PanelError>
    where
        F: FnOnce(&mut FormState),
    {
        let mut guard = self.lock_form();
        let form = guard.as_mut().ok_or(PanelError::NoOpenForm)?;
        edit(form);
        Ok(form.clone())
    }

    /// Dismiss the open form without submitting.
    pub fn close_form(&self) {
        *self.lock_form() = None;
    }

    /// Submit the open form: create or update depending on its mode.
    ///
    /// The form closes only after the server confirms. On failure it stays
    /// open and unchanged so the user can retry.
    pub async fn submit(&self) -> Result<(), PanelError> {
        let form = self.form().ok_or(PanelError::NoOpenForm)?;

        match &form.mode {
            FormMode::Creating => self.dispatcher.create(&form.fields).await?,
            FormMode::Editing(id) => self.dispatcher.update(id, &form.fields).await?,
        }

        // A form opened meanwhile is left alone, even for the same record.
        let mut guard = self.lock_form();
        if guard.as_ref().map(FormState::generation) == Some(form.generation()) {
            *guard = None;
        }
        Ok(())
    }

    // ====================================================================
    // Delete
    // ====================================================================

    pub async fn delete(&self, id: &RecordId) -> Result<(), PanelError> {
        self.dispatcher.delete(id).await
    }

    fn next_generation(&self) -> u64 {
        self.next_form.fetch_add(1, Ordering::SeqCst)
    }

    fn lock_form(&self) -> std::sync::MutexGuard<'_, Option<FormState>> {
        self.form.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
