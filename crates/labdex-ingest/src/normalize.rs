// Upstream Label Normalization
//
// The providers return free-form strings for difficulty, operating system,
// and unit type. These functions are total: every input maps onto the closed
// enums, with a fixed fallback when no keyword matches, so the stored domains
// never grow beyond the values the schema declares.

use crate::models::{Difficulty, DifficultyScale, Os, UnitKind};

/// Map a raw difficulty label onto the closed difficulty enum.
///
/// Matching is case-insensitive substring search. `Insane` is only
/// recognized on the machine scale; unmatched input falls back to `Easy`.
pub fn normalize_difficulty(raw: &str, scale: DifficultyScale) -> Difficulty {
    let lower = raw.to_lowercase();

    if scale == DifficultyScale::Machine && lower.contains("insane") {
        return Difficulty::Insane;
    }

    if lower.contains("medium") {
        Difficulty::Medium
    } else if lower.contains("hard") {
        Difficulty::Hard
    } else {
        Difficulty::Easy
    }
}

/// Map a raw operating-system label onto the closed OS enum.
///
/// Unmatched input falls back to `Other`.
pub fn normalize_os(raw: &str) -> Os {
    let lower = raw.to_lowercase();

    if lower.contains("windows") {
        Os::Windows
    } else if lower.contains("linux") {
        Os::Linux
    } else if lower.contains("android") {
        Os::Android
    } else if lower.contains("solaris") {
        Os::Solaris
    } else if lower.contains("openbsd") {
        Os::OpenBsd
    } else if lower.contains("freebsd") {
        Os::FreeBsd
    } else {
        Os::Other
    }
}

/// Map a raw unit-type label onto the closed unit-kind enum.
///
/// Unmatched input falls back to `Article`.
pub fn normalize_unit_kind(raw: &str) -> UnitKind {
    if raw.to_lowercase().contains("interactive") {
        UnitKind::Interactive
    } else {
        UnitKind::Article
    }
}

// ============================================================================
// Tests
// ============================================================================
