//! Per-compile datapoint resolution.
//! One concurrent metadata fetch per referenced device, with per-device
//! failure isolation. The table lives for a single compile pass and is
//! dropped with it.

use crate::error::{Result, SceneError};
use crate::service::SceneService;
use futures_util::future::join_all;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Vendor-owned datapoint metadata, read-only during a compile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatapointMetadata {
    pub dp_id: i64,
    pub name: String,
    pub value_type: String,
    pub schema: Value,
}

/// Datapoint metadata for every device a compile references.
///
/// A device maps to `Some` with its fetched datapoints or to `None` when
/// its fetch failed; the failure is surfaced by [`find`](Self::find), not
/// swallowed here.
pub struct DatapointTable {
    entries: HashMap<String, Option<Vec<DatapointMetadata>>>,
}

impl DatapointTable {
    pub(crate) fn empty() -> Self {
        DatapointTable {
            entries: HashMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, device_id: String, datapoints: Option<Vec<DatapointMetadata>>) {
        self.entries.insert(device_id, datapoints);
    }

    /// Fetch datapoint metadata for every device id, exactly one fetch per
    /// device.
    ///
    /// Fetches run concurrently and are all joined before this returns. A
    /// failed fetch is recorded against its device without aborting the
    /// others.
    pub async fn resolve(service: &Arc<dyn SceneService>, device_ids: &BTreeSet<String>) -> Self {
        let handles: Vec<_> = device_ids
            .iter()
            .map(|device_id| {
                let service = Arc::clone(service);
                let device_id = device_id.clone();
                tokio::spawn(async move { service.condition_datapoints(&device_id).await })
            })
            .collect();

        let mut table = DatapointTable::empty();
        for (device_id, joined) in device_ids.iter().zip(join_all(handles).await) {
            let entry = match joined {
                Ok(Ok(datapoints)) => {
                    debug!(
                        "Resolved {} datapoints for device {}",
                        datapoints.len(),
                        device_id
                    );
                    Some(datapoints)
                }
                Ok(Err(err)) => {
                    warn!("Datapoint fetch failed for device {}: {}", device_id, err);
                    None
                }
                Err(err) => {
                    warn!(
                        "Datapoint fetch task for device {} did not finish: {}",
                        device_id, err
                    );
                    None
                }
            };
            table.insert(device_id.clone(), entry);
        }
        table
    }

    /// Look up one datapoint of one device.
    ///
    /// A device whose fetch failed, or that was never requested, reports
    /// [`SceneError::DatapointFetchFailed`]; a fetched device without the
    /// datapoint reports [`SceneError::DatapointNotResolved`]. There is no
    /// silent placeholder.
    pub fn find(&self, device_id: &str, dp_id: i64) -> Result<&DatapointMetadata> {
        match self.entries.get(device_id) {
            Some(Some(datapoints)) => datapoints
                .iter()
                .find(|metadata| metadata.dp_id == dp_id)
                .ok_or_else(|| SceneError::DatapointNotResolved {
                    device: device_id.to_string(),
                    dp: dp_id,
                }),
            _ => Err(SceneError::DatapointFetchFailed(device_id.to_string())),
        }
    }

    /// Number of devices the table holds an entry for, failed included.
    pub fn device_count(&self) -> usize {
        self.entries.len()
    }
}
