// Upstream HTTP Clients
//
// Two authenticated REST providers feed the pipeline: the catalog provider
// (modules and exams, session-cookie auth) and the lab provider (machine
// profiles and tags, bearer-token auth). Each operation is a single
// request/response; there is no retry or backoff, the orchestrator decides
// what a failed call means.

pub mod catalog;
pub mod lab;

pub use catalog::CatalogClient;
pub use lab::LabClient;

use async_trait::async_trait;

use crate::models::{ExamDto, MachineProfileDto, ModuleDto, ModuleRefDto, TagDto};
use crate::Result;

/// Read operations against the catalog provider.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Fetch one module by id. `Ok(None)` means the id does not exist
    /// upstream, which is an expected outcome during a sequential scan.
    async fn fetch_module(&self, id: i64) -> Result<Option<ModuleDto>>;

    /// Fetch the full exam list in one call.
    async fn fetch_exams(&self) -> Result<Vec<ExamDto>>;

    /// Fetch the modules required by an exam.
    async fn fetch_exam_modules(&self, exam_id: i64) -> Result<Vec<ModuleRefDto>>;
}

/// Read operations against the lab provider.
#[async_trait]
pub trait LabProvider: Send + Sync {
    /// Fetch a machine's full profile by name. `Ok(None)` when unknown.
    async fn fetch_machine_profile(&self, name: &str) -> Result<Option<MachineProfileDto>>;

    /// Fetch the tags attached to a machine.
    async fn fetch_machine_tags(&self, machine_id: i64) -> Result<Vec<TagDto>>;
}
