use serde_derive::{Deserialize, Serialize};

/// A decoded short message retained for operator inspection.
#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq)]
pub struct Message {
    pub message: String,
    pub sender: String,
    pub recipient: String,
    pub timestamp: String,
}
