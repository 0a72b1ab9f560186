// Sync Pipeline Orchestration
//
// Five strictly sequential stages:
//
// 1. Scan module ids 1..=ceiling; upsert modules and units, collect machine
//    references, then fetch and upsert each distinct machine once.
// 2. Fetch the exam list in one call and upsert each exam.
// 3. Insert the machine<->module pairs accumulated in stage 1.
// 4. For every machine in the store, fetch tags; upsert vulnerabilities, then
//    link vulnerabilities, languages, and areas of interest.
// 5. For every exam in the store, fetch its required modules and link them.
//
// One upstream request is in flight at a time, with a fixed pause after each
// call in the scanning stages; anything faster trips the providers' rate
// limits. A failed item is logged and counted, never propagated: the run
// always reaches stage 5 once setup has succeeded.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::client::{CatalogProvider, LabProvider};
use crate::config::SyncConfig;
use crate::dedup::MachineDedup;
use crate::models::{Exam, Machine, Module, ModuleDto, TagCategory, TagDto, Unit, Vulnerability};
use crate::store::CatalogStore;

/// Counters accumulated over one run, reported in the final summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub modules: usize,
    pub units: usize,
    pub machines: usize,
    pub exams: usize,
    pub vulnerabilities: usize,
    pub errors: usize,
    pub duration: Duration,
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} modules, {} units, {} machines, {} exams, {} vulnerabilities, {} errors in {:.2?}",
            self.modules,
            self.units,
            self.machines,
            self.exams,
            self.vulnerabilities,
            self.errors,
            self.duration
        )
    }
}

/// Drives the five ingestion stages against a pair of providers and a store.
///
/// Borrows its collaborators: the caller keeps ownership and can inspect the
/// store after the run.
pub struct SyncPipeline<'a, C, L, S> {
    catalog: &'a C,
    lab: &'a L,
    store: &'a S,
    config: SyncConfig,
}

impl<'a, C, L, S> SyncPipeline<'a, C, L, S>
where
    C: CatalogProvider,
    L: LabProvider,
    S: CatalogStore,
{
    pub fn new(catalog: &'a C, lab: &'a L, store: &'a S, config: SyncConfig) -> Self {
        Self {
            catalog,
            lab,
            store,
            config,
        }
    }

    /// Run all five stages to completion.
    ///
    /// Per-item failures are isolated into `RunStats::errors`; this method
    /// itself cannot fail once called. Setup failures (config, database,
    /// client construction) belong to the caller, before the run starts.
    pub async fn run(&self) -> RunStats {
        let started = Instant::now();
        let mut stats = RunStats::default();

        // Cross-stage accumulators, owned by the run.
        let mut dedup = MachineDedup::new();
        let mut machine_modules: Vec<(i64, i64)> = Vec::new();

        info!(
            ceiling = self.config.scan_ceiling,
            "Stage 1/5: scanning modules and machines"
        );
        self.scan_modules(&mut stats, &mut dedup, &mut machine_modules)
            .await;
        self.ingest_machines(&dedup, &mut stats).await;

        info!("Stage 2/5: ingesting exams");
        self.ingest_exams(&mut stats).await;

        info!(
            pairs = machine_modules.len(),
            "Stage 3/5: linking machines to modules"
        );
        self.link_machine_modules(&machine_modules, &mut stats).await;

        info!("Stage 4/5: refreshing machine tags");
        self.ingest_machine_tags(&mut stats).await;

        info!("Stage 5/5: linking exam modules");
        self.link_exam_modules(&mut stats).await;

        stats.duration = started.elapsed();
        info!(%stats, "Catalog sync finished");

        stats
    }

    /// Stage 1a: probe every module id up to the configured ceiling.
    async fn scan_modules(
        &self,
        stats: &mut RunStats,
        dedup: &mut MachineDedup,
        machine_modules: &mut Vec<(i64, i64)>,
    ) {
        for id in 1..=self.config.scan_ceiling {
            match self.catalog.fetch_module(id).await {
                Ok(Some(dto)) => {
                    self.ingest_module(&dto, stats, dedup, machine_modules).await;
                },
                Ok(None) => {
                    debug!(module_id = id, "Module not present upstream");
                },
                Err(e) => {
                    warn!(module_id = id, error = %e, "Failed to fetch module");
                    stats.errors += 1;
                },
            }

            self.pace().await;
        }

        info!(
            modules = stats.modules,
            distinct_machines = dedup.len(),
            "Module scan complete"
        );
    }

    /// Store one module and its units, and collect its machine references.
    async fn ingest_module(
        &self,
        dto: &ModuleDto,
        stats: &mut RunStats,
        dedup: &mut MachineDedup,
        machine_modules: &mut Vec<(i64, i64)>,
    ) {
        let module = Module::from_dto(dto);

        if let Err(e) = self.store.upsert_module(&module).await {
            warn!(module_id = module.id, error = %e, "Failed to store module");
            stats.errors += 1;
            return;
        }
        stats.modules += 1;

        for unit_dto in &dto.units {
            let unit = Unit::from_dto(module.id, unit_dto);
            match self.store.upsert_unit(&unit).await {
                Ok(()) => stats.units += 1,
                Err(e) => {
                    warn!(unit_id = unit.id, module_id = module.id, error = %e, "Failed to store unit");
                    stats.errors += 1;
                },
            }
        }

        for reference in &dto.related_machines {
            machine_modules.push((reference.id, module.id));
            if dedup.observe(reference) {
                debug!(machine = %reference.name, "Discovered machine reference");
            }
        }
    }

    /// Stage 1b: fetch each distinct machine's profile exactly once.
    async fn ingest_machines(&self, dedup: &MachineDedup, stats: &mut RunStats) {
        info!(count = dedup.len(), "Fetching machine profiles");

        for reference in dedup.machines() {
            match self.lab.fetch_machine_profile(&reference.name).await {
                Ok(Some(profile)) => {
                    let machine = Machine::from_profile(&profile, &self.config.machine_url_base);
                    match self.store.upsert_machine(&machine).await {
                        Ok(()) => stats.machines += 1,
                        Err(e) => {
                            warn!(machine_id = machine.id, error = %e, "Failed to store machine");
                            stats.errors += 1;
                        },
                    }
                },
                Ok(None) => {
                    warn!(machine = %reference.name, "Machine profile not available");
                    stats.errors += 1;
                },
                Err(e) => {
                    warn!(machine = %reference.name, error = %e, "Failed to fetch machine profile");
                    stats.errors += 1;
                },
            }

            self.pace().await;
        }
    }

    /// Stage 2: single bulk fetch of the exam list, no per-item pacing.
    async fn ingest_exams(&self, stats: &mut RunStats) {
        let exams = match self.catalog.fetch_exams().await {
            Ok(exams) => exams,
            Err(e) => {
                warn!(error = %e, "Failed to fetch exam list");
                stats.errors += 1;
                return;
            },
        };

        for dto in &exams {
            let exam = Exam::from_dto(dto);
            match self.store.upsert_exam(&exam).await {
                Ok(()) => stats.exams += 1,
                Err(e) => {
                    warn!(exam_id = exam.id, error = %e, "Failed to store exam");
                    stats.errors += 1;
                },
            }
        }
    }

    /// Stage 3: flush the machine<->module pairs collected during the scan.
    /// Local memory plus the store only, so no pacing here either.
    async fn link_machine_modules(&self, machine_modules: &[(i64, i64)], stats: &mut RunStats) {
        for &(machine_id, module_id) in machine_modules {
            if let Err(e) = self.store.link_machine_module(machine_id, module_id).await {
                warn!(machine_id, module_id, error = %e, "Failed to link machine to module");
                stats.errors += 1;
            }
        }
    }

    /// Stage 4: refresh tags for every machine currently stored, including
    /// machines ingested by earlier runs.
    async fn ingest_machine_tags(&self, stats: &mut RunStats) {
        let machine_ids = match self.store.all_machine_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(error = %e, "Failed to list stored machines");
                stats.errors += 1;
                return;
            },
        };

        info!(count = machine_ids.len(), "Refreshing tags for stored machines");

        // Vulnerability id -> name across the whole run.
        let mut vulnerability_catalog: HashMap<i64, String> = HashMap::new();

        for machine_id in machine_ids {
            match self.lab.fetch_machine_tags(machine_id).await {
                Ok(tags) => {
                    self.apply_tags(machine_id, &tags, &mut vulnerability_catalog, stats)
                        .await;
                },
                Err(e) => {
                    warn!(machine_id, error = %e, "Failed to fetch machine tags");
                    stats.errors += 1;
                },
            }

            self.pace().await;
        }

        stats.vulnerabilities = vulnerability_catalog.len();
    }

    /// Partition one machine's tags and write them. Vulnerability records are
    /// upserted before their edges.
    async fn apply_tags(
        &self,
        machine_id: i64,
        tags: &[TagDto],
        vulnerability_catalog: &mut HashMap<i64, String>,
        stats: &mut RunStats,
    ) {
        for tag in tags {
            match tag.category() {
                TagCategory::Vulnerability => {
                    vulnerability_catalog.insert(tag.id, tag.name.clone());

                    let vulnerability = Vulnerability {
                        id: tag.id,
                        name: tag.name.clone(),
                    };
                    if let Err(e) = self.store.upsert_vulnerability(&vulnerability).await {
                        warn!(vulnerability_id = tag.id, error = %e, "Failed to store vulnerability");
                        stats.errors += 1;
                        continue;
                    }

                    if let Err(e) = self
                        .store
                        .link_machine_vulnerability(machine_id, tag.id)
                        .await
                    {
                        warn!(machine_id, vulnerability_id = tag.id, error = %e, "Failed to link vulnerability");
                        stats.errors += 1;
                    }
                },
                TagCategory::Language => {
                    if let Err(e) = self.store.link_machine_language(machine_id, &tag.name).await {
                        warn!(machine_id, language = %tag.name, error = %e, "Failed to link language");
                        stats.errors += 1;
                    }
                },
                TagCategory::AreaOfInterest => {
                    if let Err(e) = self.store.link_machine_area(machine_id, &tag.name).await {
                        warn!(machine_id, area = %tag.name, error = %e, "Failed to link area of interest");
                        stats.errors += 1;
                    }
                },
                TagCategory::Unknown => {
                    debug!(machine_id, category = %tag.category, "Ignoring unknown tag category");
                },
            }
        }
    }

    /// Stage 5: link required modules for every exam currently stored.
    async fn link_exam_modules(&self, stats: &mut RunStats) {
        let exam_ids = match self.store.all_exam_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(error = %e, "Failed to list stored exams");
                stats.errors += 1;
                return;
            },
        };

        for exam_id in exam_ids {
            match self.catalog.fetch_exam_modules(exam_id).await {
                Ok(module_refs) => {
                    for module_ref in &module_refs {
                        if let Err(e) = self.store.link_module_exam(module_ref.id, exam_id).await {
                            warn!(module_id = module_ref.id, exam_id, error = %e, "Failed to link exam module");
                            stats.errors += 1;
                        }
                    }
                },
                Err(e) => {
                    warn!(exam_id, error = %e, "Failed to fetch exam modules");
                    stats.errors += 1;
                },
            }

            self.pace().await;
        }
    }

    /// Fixed pause after each upstream call in a scanning loop.
    async fn pace(&self) {
        if self.config.request_delay_ms > 0 {
            tokio::time::sleep(self.config.request_delay()).await;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
