//! Scheduling constraints.
//!
//! Constraints travel with the request and are attached to the produced
//! schedule for downstream inspection. Equipment compatibility and
//! time-overlap are enforced by every strategy; the remaining types are
//! informational to the core and interpreted by consumers.

use serde::{Deserialize, Serialize};

/// A scheduling constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingConstraint {
    /// What the constraint restricts.
    pub constraint_type: ConstraintType,
    /// Equipment scope, if any.
    pub equipment_id: Option<String>,
    /// Material scope, if any.
    pub material_id: Option<String>,
    /// Relative weight (higher = more important).
    pub priority: f64,
}

/// Classification of scheduling constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintType {
    EquipmentAvailability,
    MaterialAvailability,
    CrewAvailability,
    Deadline,
    SetupTime,
    QualityGate,
    Dependency,
}

impl ConstraintType {
    /// Whether the scheduler itself guarantees this constraint.
    pub fn is_enforced(self) -> bool {
        matches!(self, ConstraintType::EquipmentAvailability)
    }
}

impl SchedulingConstraint {
    /// Creates an unscoped constraint with weight 1.
    pub fn new(constraint_type: ConstraintType) -> Self {
        Self {
            constraint_type,
            equipment_id: None,
            material_id: None,
            priority: 1.0,
        }
    }

    /// Equipment availability constraint scoped to one unit.
    pub fn equipment_availability(equipment_id: impl Into<String>) -> Self {
        Self::new(ConstraintType::EquipmentAvailability).with_equipment(equipment_id)
    }

    /// Material availability constraint scoped to one material.
    pub fn material_availability(material_id: impl Into<String>) -> Self {
        Self::new(ConstraintType::MaterialAvailability).with_material(material_id)
    }

    /// Deadline constraint.
    pub fn deadline() -> Self {
        Self::new(ConstraintType::Deadline)
    }

    /// Sets the equipment scope.
    pub fn with_equipment(mut self, equipment_id: impl Into<String>) -> Self {
        self.equipment_id = Some(equipment_id.into());
        self
    }

    /// Sets the material scope.
    pub fn with_material(mut self, material_id: impl Into<String>) -> Self {
        self.material_id = Some(material_id.into());
        self
    }

    /// Sets the weight.
    pub fn with_priority(mut self, priority: f64) -> Self {
        self.priority = priority;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_factories() {
        let c = SchedulingConstraint::equipment_availability("M1").with_priority(5.0);
        assert_eq!(c.constraint_type, ConstraintType::EquipmentAvailability);
        assert_eq!(c.equipment_id.as_deref(), Some("M1"));
        assert!(c.material_id.is_none());
        assert!((c.priority - 5.0).abs() < 1e-12);

        let m = SchedulingConstraint::material_availability("steel");
        assert_eq!(m.constraint_type, ConstraintType::MaterialAvailability);
        assert_eq!(m.material_id.as_deref(), Some("steel"));

        let d = SchedulingConstraint::deadline();
        assert_eq!(d.constraint_type, ConstraintType::Deadline);
    }

    #[test]
    fn test_enforced_types() {
        assert!(ConstraintType::EquipmentAvailability.is_enforced());
        assert!(!ConstraintType::QualityGate.is_enforced());
        assert!(!ConstraintType::CrewAvailability.is_enforced());
    }
}
