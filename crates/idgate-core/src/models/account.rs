//! Account handle returned by identity stores.

use serde::{Deserialize, Serialize};

/// A stored account as seen by the gate.
///
/// Stores hand this back from `create_user`/`find_by_email`; the gate
/// passes it to every follow-up call for the same attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    pub email: String,
    /// Raw password (stores hash it before keeping it).
    pub password: String,
}
