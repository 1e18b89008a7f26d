//! Device record — the device subtree as reported into the store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::id::RelayId;
use crate::relay::Relay;
use crate::time::UnixSeconds;

/// One record per physical controller.
///
/// The liveness fields (`online`, `last_update`) are written only by the
/// device itself; `relays` is written by both the device and clients. A store
/// notification for the device subtree carries this whole record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    #[serde(default)]
    pub online: bool,
    #[serde(default)]
    pub last_update: Option<UnixSeconds>,
    #[serde(default)]
    pub relays: BTreeMap<RelayId, Relay>,
}
