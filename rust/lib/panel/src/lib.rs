//! Equipment panel state and actions.
//!
//! One [`EquipmentPanel`] owns the record list ([`DataStore`]), the open
//! create/edit form, the compliance monitor and the chart projection. All
//! remote calls go through an [`EquipmentApi`](equipment_client::EquipmentApi)
//! and every successful mutation is followed by a full refetch.

pub mod alert;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod form;
pub mod panel;
pub mod store;

#[cfg(test)]
mod testing;

pub use alert::{AlertPolicy, AlertSink, ComplianceMonitor, LogAlert};
pub use config::PanelConfig;
pub use dispatcher::ActionDispatcher;
pub use error::PanelError;
pub use form::{FormMode, FormState};
pub use panel::EquipmentPanel;
pub use store::{ChangeHandler, DataStore, RecordSnapshot, SubscriptionId};
