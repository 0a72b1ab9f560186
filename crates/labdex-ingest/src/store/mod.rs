// Relational Sink
//
// All persistent writes go through the `CatalogStore` trait: one upsert per
// primary entity type and one insert-or-ignore per edge type, plus the two
// read helpers later pipeline stages iterate over. Records are keyed by the
// upstream provider's own integer ids; the sink never mints identifiers.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgCatalogStore;

use async_trait::async_trait;

use crate::models::{Exam, Machine, Module, Unit, Vulnerability};
use crate::Result;

/// Idempotent write operations against the catalog schema.
///
/// Upserts overwrite every mutable column on conflict; edge inserts are
/// no-ops on conflict. Referential ordering between records and edges is the
/// caller's responsibility (stage ordering), not the store's.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn upsert_module(&self, module: &Module) -> Result<()>;

    async fn upsert_unit(&self, unit: &Unit) -> Result<()>;

    async fn upsert_machine(&self, machine: &Machine) -> Result<()>;

    async fn upsert_exam(&self, exam: &Exam) -> Result<()>;

    async fn upsert_vulnerability(&self, vulnerability: &Vulnerability) -> Result<()>;

    async fn link_machine_module(&self, machine_id: i64, module_id: i64) -> Result<()>;

    async fn link_module_exam(&self, module_id: i64, exam_id: i64) -> Result<()>;

    async fn link_machine_vulnerability(
        &self,
        machine_id: i64,
        vulnerability_id: i64,
    ) -> Result<()>;

    async fn link_machine_language(&self, machine_id: i64, language: &str) -> Result<()>;

    async fn link_machine_area(&self, machine_id: i64, area: &str) -> Result<()>;

    /// All machine ids currently stored, in ascending order.
    async fn all_machine_ids(&self) -> Result<Vec<i64>>;

    /// All exam ids currently stored, in ascending order.
    async fn all_exam_ids(&self) -> Result<Vec<i64>>;
}
