//! Shared test support: scripted upstream providers and fixture builders.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use labdex_ingest::client::{CatalogProvider, LabProvider};
use labdex_ingest::config::SyncConfig;
use labdex_ingest::models::{
    ExamDto, MachineProfileDto, MachineRefDto, ModuleDto, ModuleRefDto, TagDto, UnitDto,
};
use labdex_ingest::{Result, SyncError};

/// Scripted catalog provider.
///
/// Modules listed in `failing_modules` return a malformed-payload error;
/// missing ids return the NotFound outcome.
#[derive(Default)]
pub struct FakeCatalog {
    pub modules: HashMap<i64, ModuleDto>,
    pub failing_modules: Vec<i64>,
    pub exams: Vec<ExamDto>,
    pub exam_modules: HashMap<i64, Vec<i64>>,
}

#[async_trait]
impl CatalogProvider for FakeCatalog {
    async fn fetch_module(&self, id: i64) -> Result<Option<ModuleDto>> {
        if self.failing_modules.contains(&id) {
            return Err(SyncError::Payload(format!("module {}: scripted failure", id)));
        }
        Ok(self.modules.get(&id).cloned())
    }

    async fn fetch_exams(&self) -> Result<Vec<ExamDto>> {
        Ok(self.exams.clone())
    }

    async fn fetch_exam_modules(&self, exam_id: i64) -> Result<Vec<ModuleRefDto>> {
        Ok(self
            .exam_modules
            .get(&exam_id)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|id| ModuleRefDto { id })
            .collect())
    }
}

/// Scripted lab provider. Counts profile fetches so tests can assert the
/// deduplicator collapsed repeated sightings.
#[derive(Default)]
pub struct FakeLab {
    pub profiles: HashMap<String, MachineProfileDto>,
    pub tags: HashMap<i64, Vec<TagDto>>,
    pub profile_fetches: AtomicUsize,
}

#[async_trait]
impl LabProvider for FakeLab {
    async fn fetch_machine_profile(&self, name: &str) -> Result<Option<MachineProfileDto>> {
        self.profile_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.profiles.get(name).cloned())
    }

    async fn fetch_machine_tags(&self, machine_id: i64) -> Result<Vec<TagDto>> {
        Ok(self.tags.get(&machine_id).cloned().unwrap_or_default())
    }
}

impl FakeLab {
    pub fn profile_fetch_count(&self) -> usize {
        self.profile_fetches.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Fixture builders
// ============================================================================

pub fn sync_config(ceiling: i64) -> SyncConfig {
    SyncConfig {
        scan_ceiling: ceiling,
        request_delay_ms: 0,
        machine_url_base: "https://labs.example.com/machines".to_string(),
    }
}

pub fn module(id: i64, name: &str, machines: Vec<MachineRefDto>) -> ModuleDto {
    ModuleDto {
        id,
        name: name.to_string(),
        description: Some(format!("{} walkthrough", name)),
        difficulty: Some("Medium".to_string()),
        url: Some(format!("https://academy.example.com/module/details/{}", id)),
        avatar: None,
        units: vec![
            UnitDto {
                id: id * 100 + 1,
                position: 1,
                name: "Introduction".to_string(),
                kind: Some("article".to_string()),
            },
            UnitDto {
                id: id * 100 + 2,
                position: 2,
                name: "Hands-on".to_string(),
                kind: Some("interactive".to_string()),
            },
        ],
        related_machines: machines,
    }
}

pub fn machine_ref(id: i64, name: &str) -> MachineRefDto {
    MachineRefDto {
        id,
        name: name.to_string(),
        os: Some("Linux".to_string()),
        difficulty: Some("Easy".to_string()),
        avatar: None,
    }
}

pub fn profile(id: i64, name: &str) -> MachineProfileDto {
    MachineProfileDto {
        id,
        name: name.to_string(),
        synopsis: Some(format!("{} is a beginner box.", name)),
        os: Some("Linux".to_string()),
        difficulty: Some("Easy".to_string()),
        avatar: None,
    }
}

pub fn tag(id: i64, name: &str, category: &str) -> TagDto {
    TagDto {
        id,
        name: name.to_string(),
        category: category.to_string(),
    }
}

pub fn exam(id: i64, name: &str) -> ExamDto {
    ExamDto {
        id,
        name: name.to_string(),
        logo: None,
    }
}
