//! External collaborator seams: device registry and reading store
//!
//! The pipeline talks to persistence only through these traits. A commit
//! is atomic from the pipeline's point of view: `persist` either stores
//! the whole reading or nothing of it. The in-memory implementations back
//! tests and the simulation demo; a production deployment plugs in its
//! database behind the same traits.

use crate::error::{EcgError, EcgResult};
use crate::reading::Reading;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// A registered wearable device
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    /// Registry row id
    pub id: i64,
    /// Hardware MAC address, unique per device
    pub mac_address: String,
    /// Assigned identifier string handed back to the device
    pub device_id: String,
    /// First registration instant
    pub created_at: DateTime<Utc>,
}

/// Lookup and registration of devices
pub trait DeviceRegistry: Send + Sync {
    /// Find a device by its assigned identifier string
    fn lookup(&self, device_id: &str) -> Option<Device>;

    /// Register a device by MAC address, or return the existing record
    ///
    /// Registration is idempotent: a MAC that is already known gets its
    /// previously assigned identifier back.
    fn register(&self, mac_address: &str) -> EcgResult<Device>;
}

/// Atomic persistence of readings
pub trait ReadingStore: Send + Sync {
    /// Commit one reading; on error nothing of it is visible afterwards
    fn persist(&self, reading: Reading) -> EcgResult<()>;

    /// Most recent readings for a device, newest first
    fn recent(&self, device_id: i64, limit: usize) -> Vec<Reading>;
}

/// In-memory device registry
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    devices: Mutex<Vec<Device>>,
}

impl MemoryRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered devices
    pub fn len(&self) -> usize {
        self.devices.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether no device has registered yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DeviceRegistry for MemoryRegistry {
    fn lookup(&self, device_id: &str) -> Option<Device> {
        let devices = self.devices.lock().unwrap_or_else(|e| e.into_inner());
        devices.iter().find(|d| d.device_id == device_id).cloned()
    }

    fn register(&self, mac_address: &str) -> EcgResult<Device> {
        if mac_address.is_empty() {
            return Err(EcgError::validation("'mac_address' is required"));
        }
        let mut devices = self.devices.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = devices.iter().find(|d| d.mac_address == mac_address) {
            return Ok(existing.clone());
        }
        let next = devices.len() as i64 + 1;
        let device = Device {
            id: next,
            mac_address: mac_address.to_string(),
            device_id: format!("ECG_DEV_{:03}", next),
            created_at: Utc::now(),
        };
        devices.push(device.clone());
        Ok(device)
    }
}

/// In-memory reading store with injectable commit failure
///
/// The failure switch exists so the pipeline's rollback contract is
/// testable: a failed commit must leave no reading visible.
#[derive(Debug, Default)]
pub struct MemoryStore {
    readings: Mutex<Vec<Reading>>,
    fail_next: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `persist` call fail with a persistence error
    pub fn fail_next_persist(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Total number of committed readings
    pub fn len(&self) -> usize {
        self.readings.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether nothing has been committed yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ReadingStore for MemoryStore {
    fn persist(&self, reading: Reading) -> EcgResult<()> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(EcgError::Persistence {
                reason: "injected commit failure".to_string(),
            });
        }
        let mut readings = self.readings.lock().unwrap_or_else(|e| e.into_inner());
        readings.push(reading);
        Ok(())
    }

    fn recent(&self, device_id: i64, limit: usize) -> Vec<Reading> {
        let readings = self.readings.lock().unwrap_or_else(|e| e.into_inner());
        readings
            .iter()
            .rev()
            .filter(|r| r.device_id == device_id)
            .take(limit)
            .cloned()
            .collect()
    }
}
