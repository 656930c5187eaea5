use serde::{Deserialize, Serialize};

use crate::alert::AlertPolicy;

/// Panel behavior switches. Read from the `[panel]` table of the client
/// config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PanelConfig {
    /// When a violating record list raises an alert.
    pub alert_policy: AlertPolicy,

    /// Queue mutations: each mutation and its follow-up refresh run to
    /// completion before the next one starts. Off by default, in which case
    /// concurrent mutations race and the last refresh to finish wins.
    pub serialize_mutations: bool,
}
