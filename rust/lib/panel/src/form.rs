//! Create/edit form state.

use equipment_core::{EquipmentFields, EquipmentRecord, RecordId};

/// What a submit will do.
#[derive(Debug, Clone, PartialEq)]
pub enum FormMode {
    Creating,
    Editing(RecordId),
}

/// Editable copy of one record's fields while a form is open.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pub mode: FormMode,
    pub fields: EquipmentFields,
    /// Which opening of the form this is. Set by the panel on open.
    generation: u64,
}

impl FormState {
    /// A create form with zeroed readings stamped now.
    pub fn creating() -> Self {
        Self {
            mode: FormMode::Creating,
            fields: EquipmentFields::blank(),
            generation: 0,
        }
    }

    /// An edit form populated from a stored record. `None` if the record has
    /// no id.
    pub fn editing(record: &EquipmentRecord) -> Option<Self> {
        let id = record.id.clone()?;
        Some(Self {
            mode: FormMode::Editing(id),
            fields: record.fields(),
            generation: 0,
        })
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }

    pub fn is_creating(&self) -> bool {
        self.mode == FormMode::Creating
    }

    pub fn target_id(&self) -> Option<&RecordId> {
        match &self.mode {
            FormMode::Creating => None,
            FormMode::Editing(id) => Some(id),
        }
    }

    pub fn set_temperature(&mut self, value: f64) {
        self.fields.temperature = value;
    }

    pub fn set_pressure(&mut self, value: f64) {
        self.fields.pressure = value;
    }

    pub fn set_timestamp(&mut self, value: impl Into<String>) {
        self.fields.timestamp = value.into();
    }
}
