// Participant and group records shared by the roster and both engines.

use serde::{Deserialize, Serialize};

/// A single person on the roster.
///
/// Identity is `id`. Names are not unique; two participants may share a
/// name and are still distinct entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub name: String,
}

impl Participant {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Participant {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// One group produced by a partition generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Stable for the lifetime of the generation that created it.
    pub id: String,
    /// Starts as the positional placeholder and may be replaced by a
    /// creative name from the naming service.
    pub name: String,
    /// Members in shuffled order.
    pub members: Vec<Participant>,
}

/// Deterministic label given to the group at `index` (0-based) before any
/// renaming.
pub fn placeholder_name(index: usize) -> String {
    format!("Group {}", index + 1)
}
