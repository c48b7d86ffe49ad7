// ── Device store ──
//
// Holds the ignore list and the latest published `DeviceView`. The view is
// pushed through a watch channel so any number of presentation layers can
// follow it; the ignore list sits behind an async mutex.

mod refresh;

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard, watch};

use crate::ignore::IgnoreList;
use crate::view::DeviceView;

pub struct DeviceStore {
    ignored: Mutex<IgnoreList>,
    view: watch::Sender<Arc<DeviceView>>,
}

impl DeviceStore {
    pub fn new(ignored: IgnoreList) -> Self {
        let (view, _) = watch::channel(Arc::new(DeviceView::default()));
        Self {
            ignored: Mutex::new(ignored),
            view,
        }
    }

    /// The most recently published view (empty before the first refresh).
    pub fn view_snapshot(&self) -> Arc<DeviceView> {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<DeviceView>> {
        self.view.subscribe()
    }

    /// Copy of the current ignore list.
    pub async fn ignored_snapshot(&self) -> IgnoreList {
        self.ignored.lock().await.clone()
    }

    pub(crate) async fn lock_ignored(&self) -> MutexGuard<'_, IgnoreList> {
        self.ignored.lock().await
    }
}
