// ── Snapshot application ──
//
// One reconciliation pass: refresh the ignore list from a fresh device
// snapshot, project the visible set and publish it.

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use super::DeviceStore;
use crate::model::UsbDevice;
use crate::view::DeviceView;

impl DeviceStore {
    /// Reconcile and publish. `live` must already be in bus order.
    pub(crate) async fn apply_snapshot(&self, live: &[UsbDevice]) -> Arc<DeviceView> {
        let view = {
            let mut ignored = self.lock_ignored().await;
            ignored.reconcile(live);
            DeviceView::project(live, &ignored)
        };
        self.publish(view)
    }

    /// Publish a view without live devices after a failed query. The
    /// ignore list keeps its enrichment from the last good snapshot.
    pub(crate) async fn apply_unavailable(&self) -> Arc<DeviceView> {
        let view = DeviceView::project(&[], &*self.lock_ignored().await);
        self.publish(view)
    }

    fn publish(&self, view: DeviceView) -> Arc<DeviceView> {
        let view = Arc::new(DeviceView {
            refreshed_at: Some(Utc::now()),
            ..view
        });

        debug!(
            connected = view.connected.len(),
            persisted = view.persisted.len(),
            ignored = view.ignored_connected.len() + view.ignored_disconnected.len(),
            unclassified = view.unclassified.len(),
            "published device view"
        );
        self.view.send_replace(Arc::clone(&view));
        view
    }
}
