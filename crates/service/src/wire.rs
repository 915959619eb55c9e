use axite_common::Loot;
use axite_kernel::{MineError, MineOutcome};
use serde::{Deserialize, Serialize};

/// Response shape of the mining call, camelCased as the original wire
/// format was.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiningResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loot: Option<Loot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_durability: Option<u16>,
}

impl MiningResponse {
    pub(crate) fn from_outcome(outcome: MineOutcome) -> Self {
        match outcome {
            MineOutcome::Depleted { loot } => Self {
                success: true,
                message: "Handshake Complete: Asset Secured.".into(),
                loot: Some(loot),
                new_durability: None,
            },
            MineOutcome::Progress { remaining } => Self {
                success: true,
                message: format!("Neural Link Stable. Durability: {remaining}"),
                loot: None,
                new_durability: Some(remaining),
            },
        }
    }

    pub(crate) fn from_error(error: MineError) -> Self {
        match error {
            MineError::Depleted => Self {
                success: false,
                message: "Sector depleted.".into(),
                loot: None,
                new_durability: None,
            },
        }
    }
}
