//! Pipeline behavior tests
//!
//! Drive the real five-stage pipeline against scripted providers and the
//! in-memory store, covering the properties the schema consumers rely on:
//! idempotent re-runs, machine deduplication, referential ordering of
//! vulnerability edges, normalization fallbacks, and per-item failure
//! isolation.

mod helpers;

use helpers::{exam, machine_ref, module, profile, sync_config, tag, FakeCatalog, FakeLab};
use labdex_ingest::models::{Difficulty, Machine, Os};
use labdex_ingest::pipeline::SyncPipeline;
use labdex_ingest::store::{CatalogStore, MemoryStore};

/// Ceiling 3, module 2 missing, modules 1 and 3 both reference machine
/// "alpha": one machine row, one profile fetch, two edges.
#[tokio::test]
async fn test_shared_machine_is_fetched_once() {
    let mut catalog = FakeCatalog::default();
    catalog
        .modules
        .insert(1, module(1, "Enumeration", vec![machine_ref(10, "alpha")]));
    catalog
        .modules
        .insert(3, module(3, "Privilege Escalation", vec![machine_ref(10, "alpha")]));

    let mut lab = FakeLab::default();
    lab.profiles.insert("alpha".to_string(), profile(10, "alpha"));

    let store = MemoryStore::new();
    let stats = SyncPipeline::new(&catalog, &lab, &store, sync_config(3))
        .run()
        .await;

    let snapshot = store.snapshot();
    assert_eq!(
        snapshot.modules.keys().copied().collect::<Vec<_>>(),
        vec![1, 3]
    );
    assert_eq!(snapshot.machines.len(), 1);
    assert!(snapshot.machines.contains_key(&10));
    assert_eq!(
        snapshot.machine_modules.iter().copied().collect::<Vec<_>>(),
        vec![(10, 1), (10, 3)]
    );

    // The dedup set collapsed both sightings into a single profile fetch.
    assert_eq!(lab.profile_fetch_count(), 1);

    // A missing module id is NotFound, not an error.
    assert_eq!(stats.errors, 0);
    assert_eq!(stats.modules, 2);
    assert_eq!(stats.machines, 1);
}

/// Running twice against unchanged upstream data leaves identical contents.
#[tokio::test]
async fn test_rerun_is_idempotent() {
    let mut catalog = FakeCatalog::default();
    catalog
        .modules
        .insert(1, module(1, "Web Attacks", vec![machine_ref(10, "alpha")]));
    catalog
        .modules
        .insert(2, module(2, "Active Directory", vec![machine_ref(20, "bravo")]));
    catalog.exams = vec![exam(1, "Junior Pentester")];
    catalog.exam_modules.insert(1, vec![1, 2]);

    let mut lab = FakeLab::default();
    lab.profiles.insert("alpha".to_string(), profile(10, "alpha"));
    lab.profiles.insert("bravo".to_string(), profile(20, "bravo"));
    lab.tags.insert(
        10,
        vec![
            tag(100, "SQL Injection", "Vulnerability"),
            tag(200, "PHP", "Language"),
            tag(300, "Web Application", "Area of Interest"),
        ],
    );

    let store = MemoryStore::new();
    let pipeline = SyncPipeline::new(&catalog, &lab, &store, sync_config(2));

    let first_stats = pipeline.run().await;
    let first = store.snapshot();

    let second_stats = pipeline.run().await;
    let second = store.snapshot();

    assert_eq!(first, second);
    assert_eq!(first_stats.errors, 0);
    assert_eq!(second_stats.errors, 0);

    // No duplicate rows or edges accumulated.
    assert_eq!(second.modules.len(), 2);
    assert_eq!(second.machines.len(), 2);
    assert_eq!(second.machine_modules.len(), 2);
    assert_eq!(second.module_exams.len(), 2);
    assert_eq!(second.machine_vulnerabilities.len(), 1);
}

/// Every vulnerability edge points at a vulnerability that was stored as a
/// primary record.
#[tokio::test]
async fn test_vulnerability_edges_have_records() {
    let mut catalog = FakeCatalog::default();
    catalog
        .modules
        .insert(1, module(1, "Binary Exploitation", vec![machine_ref(10, "alpha")]));

    let mut lab = FakeLab::default();
    lab.profiles.insert("alpha".to_string(), profile(10, "alpha"));
    lab.tags.insert(
        10,
        vec![
            tag(100, "Buffer Overflow", "Vulnerability"),
            tag(101, "Format String", "Vulnerability"),
            tag(200, "C", "Language"),
            tag(999, "Retired", "Season"),
        ],
    );

    let store = MemoryStore::new();
    SyncPipeline::new(&catalog, &lab, &store, sync_config(1))
        .run()
        .await;

    let snapshot = store.snapshot();
    assert_eq!(snapshot.machine_vulnerabilities.len(), 2);
    for (_, vulnerability_id) in &snapshot.machine_vulnerabilities {
        assert!(
            snapshot.vulnerabilities.contains_key(vulnerability_id),
            "edge references vulnerability {} with no primary record",
            vulnerability_id
        );
    }

    // The unknown tag category was ignored entirely.
    assert_eq!(snapshot.machine_languages.len(), 1);
    assert_eq!(snapshot.machine_areas_of_interest.len(), 0);
}

/// Unrecognized upstream labels land on the fallback enum values.
#[tokio::test]
async fn test_normalization_fallbacks_flow_through() {
    let mut catalog = FakeCatalog::default();
    let mut dto = module(1, "Intro", vec![machine_ref(10, "relic")]);
    dto.difficulty = Some("Beginner".to_string());
    catalog.modules.insert(1, dto);

    let mut lab = FakeLab::default();
    let mut machine_profile = profile(10, "relic");
    machine_profile.os = Some("BeOS".to_string());
    machine_profile.difficulty = Some("Impossible".to_string());
    lab.profiles.insert("relic".to_string(), machine_profile);

    let store = MemoryStore::new();
    SyncPipeline::new(&catalog, &lab, &store, sync_config(1))
        .run()
        .await;

    let snapshot = store.snapshot();
    assert_eq!(snapshot.modules[&1].difficulty, Difficulty::Easy);
    assert_eq!(snapshot.machines[&10].os, Os::Other);
    assert_eq!(snapshot.machines[&10].difficulty, Difficulty::Easy);
    assert_eq!(
        snapshot.machines[&10].url,
        "https://labs.example.com/machines/relic"
    );
}

/// A malformed module payload costs one error and nothing else: the other
/// nine modules are stored and the run completes.
#[tokio::test]
async fn test_single_failure_is_isolated() {
    let mut catalog = FakeCatalog::default();
    for id in 1..=10 {
        if id != 7 {
            catalog.modules.insert(id, module(id, &format!("Module {}", id), vec![]));
        }
    }
    catalog.failing_modules = vec![7];

    let lab = FakeLab::default();
    let store = MemoryStore::new();
    let stats = SyncPipeline::new(&catalog, &lab, &store, sync_config(10))
        .run()
        .await;

    assert_eq!(stats.errors, 1);
    assert_eq!(stats.modules, 9);

    let snapshot = store.snapshot();
    assert_eq!(snapshot.modules.len(), 9);
    assert!(!snapshot.modules.contains_key(&7));
}

/// Stage 4 refreshes tags for machines already in the sink, not just the
/// ones discovered by this run's scan.
#[tokio::test]
async fn test_tags_cover_previously_stored_machines() {
    let store = MemoryStore::new();
    store
        .upsert_machine(&Machine {
            id: 99,
            name: "legacy".to_string(),
            synopsis: None,
            difficulty: Difficulty::Hard,
            os: Os::Windows,
            url: "https://labs.example.com/machines/legacy".to_string(),
            avatar: None,
        })
        .await
        .unwrap();

    let catalog = FakeCatalog::default();
    let mut lab = FakeLab::default();
    lab.tags
        .insert(99, vec![tag(500, "Kerberoasting", "Vulnerability")]);

    let stats = SyncPipeline::new(&catalog, &lab, &store, sync_config(1))
        .run()
        .await;

    let snapshot = store.snapshot();
    assert!(snapshot.machine_vulnerabilities.contains(&(99, 500)));
    assert!(snapshot.vulnerabilities.contains_key(&500));
    assert_eq!(stats.vulnerabilities, 1);
}

/// Exam ingestion and module linking across stages 2 and 5.
#[tokio::test]
async fn test_exam_modules_linked() {
    let mut catalog = FakeCatalog::default();
    catalog.modules.insert(1, module(1, "Fundamentals", vec![]));
    catalog.modules.insert(2, module(2, "Pivoting", vec![]));
    catalog.exams = vec![exam(1, "Junior Pentester"), exam(2, "Senior Pentester")];
    catalog.exam_modules.insert(1, vec![1]);
    catalog.exam_modules.insert(2, vec![1, 2]);

    let lab = FakeLab::default();
    let store = MemoryStore::new();
    let stats = SyncPipeline::new(&catalog, &lab, &store, sync_config(2))
        .run()
        .await;

    assert_eq!(stats.exams, 2);

    let snapshot = store.snapshot();
    assert_eq!(
        snapshot.module_exams.iter().copied().collect::<Vec<_>>(),
        vec![(1, 1), (1, 2), (2, 2)]
    );
}
