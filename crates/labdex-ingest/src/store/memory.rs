// In-memory Catalog Store
//
// Implements the same `CatalogStore` contract over plain collections. Backs
// `--dry-run` invocations and the pipeline tests, where table contents can be
// compared structurally between runs.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::models::{Exam, Machine, Module, Unit, Vulnerability};
use crate::store::CatalogStore;
use crate::Result;

/// Structural copy of everything the store holds.
///
/// Ordered collections so two snapshots compare deterministically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub modules: BTreeMap<i64, Module>,
    pub units: BTreeMap<(i64, i64), Unit>,
    pub machines: BTreeMap<i64, Machine>,
    pub exams: BTreeMap<i64, Exam>,
    pub vulnerabilities: BTreeMap<i64, Vulnerability>,
    pub machine_modules: BTreeSet<(i64, i64)>,
    pub module_exams: BTreeSet<(i64, i64)>,
    pub machine_vulnerabilities: BTreeSet<(i64, i64)>,
    pub machine_languages: BTreeSet<(i64, String)>,
    pub machine_areas_of_interest: BTreeSet<(i64, String)>,
}

/// In-memory store for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<Snapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> Snapshot {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Snapshot> {
        // Recover the data on poisoning; writes are single-value inserts.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn upsert_module(&self, module: &Module) -> Result<()> {
        self.lock().modules.insert(module.id, module.clone());
        Ok(())
    }

    async fn upsert_unit(&self, unit: &Unit) -> Result<()> {
        self.lock()
            .units
            .insert((unit.module_id, unit.id), unit.clone());
        Ok(())
    }

    async fn upsert_machine(&self, machine: &Machine) -> Result<()> {
        self.lock().machines.insert(machine.id, machine.clone());
        Ok(())
    }

    async fn upsert_exam(&self, exam: &Exam) -> Result<()> {
        self.lock().exams.insert(exam.id, exam.clone());
        Ok(())
    }

    async fn upsert_vulnerability(&self, vulnerability: &Vulnerability) -> Result<()> {
        self.lock()
            .vulnerabilities
            .insert(vulnerability.id, vulnerability.clone());
        Ok(())
    }

    async fn link_machine_module(&self, machine_id: i64, module_id: i64) -> Result<()> {
        self.lock().machine_modules.insert((machine_id, module_id));
        Ok(())
    }

    async fn link_module_exam(&self, module_id: i64, exam_id: i64) -> Result<()> {
        self.lock().module_exams.insert((module_id, exam_id));
        Ok(())
    }

    async fn link_machine_vulnerability(
        &self,
        machine_id: i64,
        vulnerability_id: i64,
    ) -> Result<()> {
        self.lock()
            .machine_vulnerabilities
            .insert((machine_id, vulnerability_id));
        Ok(())
    }

    async fn link_machine_language(&self, machine_id: i64, language: &str) -> Result<()> {
        self.lock()
            .machine_languages
            .insert((machine_id, language.to_string()));
        Ok(())
    }

    async fn link_machine_area(&self, machine_id: i64, area: &str) -> Result<()> {
        self.lock()
            .machine_areas_of_interest
            .insert((machine_id, area.to_string()));
        Ok(())
    }

    async fn all_machine_ids(&self) -> Result<Vec<i64>> {
        Ok(self.lock().machines.keys().copied().collect())
    }

    async fn all_exam_ids(&self) -> Result<Vec<i64>> {
        Ok(self.lock().exams.keys().copied().collect())
    }
}

// ============================================================================
// Tests
// ============================================================================
