//! Equipment model.
//!
//! Equipment units are the machines jobs run on. Their operational status
//! comes from the maintenance subsystem and decides eligibility.

use serde::{Deserialize, Serialize};

/// A piece of production equipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    /// Unique equipment identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Current operational status.
    pub status: EquipmentStatus,
}

/// Operational status reported by the equipment feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentStatus {
    #[default]
    Idle,
    Running,
    Setup,
    Maintenance,
    Breakdown,
    Offline,
    Calibration,
    Testing,
}

impl EquipmentStatus {
    /// Whether new work may be allocated to equipment in this status.
    pub fn is_allocatable(self) -> bool {
        !matches!(
            self,
            EquipmentStatus::Maintenance | EquipmentStatus::Breakdown | EquipmentStatus::Offline
        )
    }
}

impl Equipment {
    /// Creates idle equipment.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            status: EquipmentStatus::Idle,
        }
    }

    /// Sets the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the status.
    pub fn with_status(mut self, status: EquipmentStatus) -> Self {
        self.status = status;
        self
    }

    /// Whether jobs can be allocated to this equipment.
    #[inline]
    pub fn is_allocatable(&self) -> bool {
        self.status.is_allocatable()
    }

    /// Whether the equipment is connected at all.
    #[inline]
    pub fn is_online(&self) -> bool {
        self.status != EquipmentStatus::Offline
    }
}
