// ── Post-command verification ──
//
// The daemon's exit status is not trusted on its own: a bind or unbind
// only counts once a fresh snapshot shows the expected Shared flag on the
// same bus id.

use crate::daemon::DaemonAction;
use crate::error::CoreError;
use crate::model::UsbDevice;

/// Find `bus_id` in a fresh snapshot and check its Shared flag against the
/// post-condition of `action`.
pub(crate) fn check_post_condition(
    fresh: &[UsbDevice],
    action: DaemonAction,
    bus_id: &str,
) -> Result<UsbDevice, CoreError> {
    let failed = |reason: &str| CoreError::CommandFailed {
        action: action.to_string(),
        bus_id: bus_id.to_owned(),
        reason: reason.to_owned(),
    };

    let device = fresh
        .iter()
        .find(|device| device.bus_id() == Some(bus_id))
        .ok_or_else(|| failed("device no longer reported by usbipd"))?;

    if device.is_shared() == action.expects_shared() {
        Ok(device.clone())
    } else if action.expects_shared() {
        Err(failed("device is still not shared"))
    } else {
        Err(failed("device is still shared"))
    }
}
