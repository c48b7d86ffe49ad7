// Raw `usbipd state` response types.
//
// Field names follow the daemon's PascalCase JSON exactly. Values are kept
// as the daemon printed them (including blank strings); interpretation is
// the job of `usbshare-core`.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Top-level document printed by `usbipd state`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StateResponse {
    pub devices: Vec<RawDevice>,
}

/// One entry of `Devices[]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawDevice {
    #[serde(default)]
    pub bus_id: Option<String>,
    #[serde(default, rename = "ClientIPAddress")]
    pub client_ip_address: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub instance_id: Option<String>,
    #[serde(default)]
    pub is_forced: bool,
    #[serde(default)]
    pub persisted_guid: Option<String>,
    #[serde(default)]
    pub stub_instance_id: Option<String>,
}

/// Decode the stdout of `usbipd state`.
///
/// Blank output is reported as a deserialization failure rather than an
/// empty device list, so callers can tell "no answer" from "no devices".
pub fn parse_state(body: &str) -> Result<StateResponse, Error> {
    if body.trim().is_empty() {
        return Err(Error::Deserialization {
            message: "empty response".into(),
            body: String::new(),
        });
    }
    serde_json::from_str(body).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: body.to_owned(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const SAMPLE: &str = r#"{
        "Devices": [
            {
                "BusId": "1-4",
                "ClientIPAddress": null,
                "Description": "USB Serial Converter",
                "InstanceId": "USB\\VID_0403&PID_6001\\A901O7VP",
                "IsForced": false,
                "PersistedGuid": "6a4b0f2e-5c1d-4f7a-9d0e-1b2c3d4e5f60",
                "StubInstanceId": null
            },
            {
                "BusId": null,
                "ClientIPAddress": null,
                "Description": "Intel(R) Wireless Bluetooth(R)",
                "InstanceId": "USB\\VID_8087&PID_0025\\7&2E104BF0&0&2",
                "IsForced": true,
                "PersistedGuid": "0c1d2e3f-4a5b-6c7d-8e9f-a0b1c2d3e4f5",
                "StubInstanceId": "USB\\Vid_80EE&Pid_CAFE\\7&2E104BF0&0&2"
            }
        ]
    }"#;

    #[test]
    fn parses_full_state_document() {
        let state = parse_state(SAMPLE).unwrap();
        assert_eq!(state.devices.len(), 2);

        let serial = &state.devices[0];
        assert_eq!(serial.bus_id.as_deref(), Some("1-4"));
        assert_eq!(serial.client_ip_address, None);
        assert_eq!(
            serial.instance_id.as_deref(),
            Some("USB\\VID_0403&PID_6001\\A901O7VP")
        );
        assert!(!serial.is_forced);

        let bluetooth = &state.devices[1];
        assert_eq!(bluetooth.bus_id, None);
        assert!(bluetooth.is_forced);
        assert!(bluetooth.stub_instance_id.is_some());
    }

    #[test]
    fn missing_optional_fields_default() {
        let state = parse_state(r#"{"Devices":[{"BusId":"2-1"}]}"#).unwrap();
        assert_eq!(
            state.devices,
            vec![RawDevice {
                bus_id: Some("2-1".into()),
                ..RawDevice::default()
            }]
        );
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let state =
            parse_state(r#"{"Devices":[],"Version":"4.3.0","Extra":{"nested":true}}"#).unwrap();
        assert!(state.devices.is_empty());
    }

    #[test]
    fn missing_devices_key_is_malformed() {
        let err = parse_state(r#"{"Something":[]}"#).unwrap_err();
        assert!(matches!(err, Error::Deserialization { .. }));
    }

    #[test]
    fn blank_output_is_malformed() {
        let err = parse_state("  \r\n").unwrap_err();
        assert!(matches!(err, Error::Deserialization { .. }));
    }

    #[test]
    fn garbage_keeps_body_for_debugging() {
        let Err(Error::Deserialization { body, .. }) = parse_state("usbipd: error") else {
            panic!("expected a deserialization error");
        };
        assert_eq!(body, "usbipd: error");
    }
}
