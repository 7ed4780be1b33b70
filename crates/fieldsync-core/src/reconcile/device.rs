// ── Device and channel reconciliation ──

use tracing::{debug, warn};

use super::Reconciler;
use super::control::reconcile_controls;
use crate::error::CoreError;
use crate::model::{ChannelId, ChannelRecord, DeviceRecord, FirmwareReport, StateChange};
use crate::repository::{
    CreateChannelRequest, CreateDeviceRequest, DeviceDetails, UpdateChannelRequest,
    UpdateDeviceRequest,
};

impl Reconciler {
    /// Upsert the device, converge its controls, then mirror its
    /// connection state.
    pub(super) fn device_observed(&self, record: &DeviceRecord) -> Result<(), CoreError> {
        let repo = self.devices.devices.as_ref();

        let device = if let Some(existing) = repo.get_by_id(record.id)? {
            let device = repo.update(
                &existing,
                UpdateDeviceRequest::Observe(DeviceDetails {
                    identifier: record.identifier.clone(),
                    name: record.name.clone(),
                    enabled: record.enabled,
                    hardware: record.hardware.clone(),
                    firmware: record.firmware.clone(),
                }),
            )?;
            debug!(device = %device.id, identifier = %device.identifier, "device updated");
            device
        } else {
            let device = repo.create(CreateDeviceRequest {
                id: record.id,
                connector: self.connector,
                identifier: record.identifier.clone(),
                name: record.name.clone(),
                enabled: record.enabled,
                hardware: record.hardware.clone(),
                firmware: record.firmware.clone(),
            })?;
            debug!(device = %device.id, identifier = %device.identifier, "device created");
            device
        };

        reconcile_controls(self.devices.controls.as_ref(), device.id, &record.controls)?;
        self.write_device_state(&device, record.state)
    }

    /// Apply partial firmware facts to a known device.
    pub(super) fn firmware_reported(&self, report: &FirmwareReport) -> Result<(), CoreError> {
        let repo = self.devices.devices.as_ref();

        let Some(device) = repo.get_by_id(report.device)? else {
            warn!(device = %report.device, "firmware reported for unknown device, dropped");
            return Ok(());
        };

        repo.update(
            &device,
            UpdateDeviceRequest::Firmware {
                manufacturer: report.manufacturer.clone(),
                version: report.version.clone(),
            },
        )?;
        debug!(device = %device.id, "device firmware updated");
        Ok(())
    }

    pub(super) fn device_state_changed(&self, change: &StateChange) -> Result<(), CoreError> {
        let Some(device) = self.devices.devices.get_by_id(change.device)? else {
            debug!(device = %change.device, state = %change.state, "state change for unknown device ignored");
            return Ok(());
        };
        self.write_device_state(&device, change.state)
    }

    /// Upsert the channel under its device, then converge its controls.
    pub(super) fn channel_observed(&self, record: &ChannelRecord) -> Result<(), CoreError> {
        let repo = self.channels.channels.as_ref();

        let channel = if let Some(existing) = repo.get_by_id(record.id)? {
            if existing.device != record.device {
                warn!(
                    channel = %existing.id,
                    device = %existing.device,
                    observed_device = %record.device,
                    "channel reported under another device, keeping original parent"
                );
            }
            let channel = repo.update(
                &existing,
                UpdateChannelRequest {
                    identifier: record.identifier.clone(),
                    name: record.name.clone(),
                },
            )?;
            debug!(channel = %channel.id, identifier = %channel.identifier, "channel updated");
            channel
        } else {
            let channel = repo.create(CreateChannelRequest {
                id: record.id,
                device: record.device,
                identifier: record.identifier.clone(),
                name: record.name.clone(),
            })?;
            debug!(
                channel = %channel.id,
                device = %channel.device,
                identifier = %channel.identifier,
                "channel created"
            );
            channel
        };

        reconcile_controls(self.channels.controls.as_ref(), channel.id, &record.controls)
    }

    pub(super) fn channel_removed(&self, id: ChannelId) -> Result<(), CoreError> {
        let repo = self.channels.channels.as_ref();

        match repo.get_by_id(id)? {
            Some(channel) => {
                repo.delete(&channel)?;
                debug!(channel = %id, "channel deleted");
            }
            None => debug!(channel = %id, "channel already absent"),
        }
        Ok(())
    }
}
