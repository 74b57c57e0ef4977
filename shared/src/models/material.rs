//! Material classification models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Top level classification, e.g. "aluminium" or "steel"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialGroup {
    pub id: Uuid,
    pub name: String,
}

impl MaterialGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// Leaf classification. Every material belongs to exactly one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub id: Uuid,
    pub name: String,
    pub material_group_id: Uuid,
}

impl Material {
    pub fn new(name: impl Into<String>, group: &MaterialGroup) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            material_group_id: group.id,
        }
    }
}

/// Restricts an aggregation to a single material or to every material of a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum EntityFilter {
    Material(Uuid),
    MaterialGroup(Uuid),
}

impl EntityFilter {
    /// Whether a transaction on `material_id` (belonging to `material_group_id`) matches
    pub fn matches(&self, material_id: Uuid, material_group_id: Uuid) -> bool {
        match self {
            EntityFilter::Material(id) => *id == material_id,
            EntityFilter::MaterialGroup(id) => *id == material_group_id,
        }
    }

    pub fn material_id(&self) -> Option<Uuid> {
        match self {
            EntityFilter::Material(id) => Some(*id),
            EntityFilter::MaterialGroup(_) => None,
        }
    }

    pub fn material_group_id(&self) -> Option<Uuid> {
        match self {
            EntityFilter::Material(_) => None,
            EntityFilter::MaterialGroup(id) => Some(*id),
        }
    }
}

impl From<&Material> for EntityFilter {
    fn from(material: &Material) -> Self {
        EntityFilter::Material(material.id)
    }
}

impl From<&MaterialGroup> for EntityFilter {
    fn from(group: &MaterialGroup) -> Self {
        EntityFilter::MaterialGroup(group.id)
    }
}
