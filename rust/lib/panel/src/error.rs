use equipment_client::ApiError;
use equipment_core::RecordId;
use thiserror::Error;

/// Errors returned by panel operations.
///
/// None of them leave the panel unusable.
#[derive(Error, Debug)]
pub enum PanelError {
    /// An API call failed. The store and any open form are unchanged.
    #[error("transport: {0}")]
    Transport(#[from] ApiError),

    /// Submit or edit with no form open.
    #[error("no form is open")]
    NoOpenForm,

    /// Edit requested for an id that is not in the store.
    #[error("equipment {0} is not in the current list")]
    UnknownRecord(RecordId),
}
