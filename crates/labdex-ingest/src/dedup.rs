// Machine Deduplication
//
// Machines are discovered incidentally: each module payload embeds references
// to its related machines, and the same machine shows up under many modules.
// `MachineDedup` collapses those sightings with a structural canonical key so
// the expensive profile fetch happens exactly once per distinct machine.

use std::collections::HashSet;

use crate::models::MachineRefDto;

/// Canonical equality key for a machine reference.
///
/// Two references denote the same machine iff every field of this tuple
/// matches. Equality is structural; it deliberately includes the cosmetic
/// fields so that a changed upstream record is treated as a fresh sighting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MachineKey {
    pub id: i64,
    pub name: String,
    pub os: Option<String>,
    pub difficulty: Option<String>,
    pub avatar: Option<String>,
}

impl MachineKey {
    pub fn of(reference: &MachineRefDto) -> Self {
        MachineKey {
            id: reference.id,
            name: reference.name.clone(),
            os: reference.os.clone(),
            difficulty: reference.difficulty.clone(),
            avatar: reference.avatar.clone(),
        }
    }
}

/// Collects machine references in first-sighting order, dropping duplicates.
#[derive(Debug, Default)]
pub struct MachineDedup {
    seen: HashSet<MachineKey>,
    order: Vec<MachineRefDto>,
}

impl MachineDedup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sighting. Returns true when the machine has not been
    /// observed before in this run.
    pub fn observe(&mut self, reference: &MachineRefDto) -> bool {
        if self.seen.insert(MachineKey::of(reference)) {
            self.order.push(reference.clone());
            true
        } else {
            false
        }
    }

    /// Distinct machines in the order they were first observed.
    pub fn machines(&self) -> &[MachineRefDto] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
