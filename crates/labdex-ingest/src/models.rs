// Catalog Data Models
//
// Two layers: DTOs mirroring the upstream JSON payloads, and the normalized
// domain entities the sink persists. Conversion from DTO to entity is where
// free-form upstream strings are mapped onto the closed enums.

use serde::{Deserialize, Serialize};

use crate::normalize;

// ============================================================================
// Closed Enumerations
// ============================================================================

/// Difficulty rating. Modules use Easy..Hard; machines additionally use Insane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Insane,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Insane => "Insane",
        }
    }
}

/// Which difficulty scale applies: Insane is only valid for machines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DifficultyScale {
    Module,
    Machine,
}

/// Operating system of a practice machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Os {
    Windows,
    Linux,
    Android,
    Solaris,
    OpenBsd,
    FreeBsd,
    Other,
}

impl Os {
    pub fn as_str(&self) -> &'static str {
        match self {
            Os::Windows => "Windows",
            Os::Linux => "Linux",
            Os::Android => "Android",
            Os::Solaris => "Solaris",
            Os::OpenBsd => "OpenBSD",
            Os::FreeBsd => "FreeBSD",
            Os::Other => "Other",
        }
    }
}

/// Kind of module unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitKind {
    Article,
    Interactive,
}

impl UnitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitKind::Article => "Article",
            UnitKind::Interactive => "Interactive",
        }
    }
}

/// Category of a machine tag as labelled by the lab provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagCategory {
    Vulnerability,
    AreaOfInterest,
    Language,
    Unknown,
}

impl TagCategory {
    pub fn from_label(label: &str) -> Self {
        match label {
            "Vulnerability" => TagCategory::Vulnerability,
            "Area of Interest" => TagCategory::AreaOfInterest,
            "Language" => TagCategory::Language,
            _ => TagCategory::Unknown,
        }
    }
}

// ============================================================================
// Upstream DTOs
// ============================================================================

/// Standard response envelope used by both providers
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// A learning module as returned by the catalog provider
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleDto {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub units: Vec<UnitDto>,
    /// Machines referenced by this module; the only way machines are discovered.
    #[serde(default)]
    pub related_machines: Vec<MachineRefDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnitDto {
    pub id: i64,
    #[serde(default)]
    pub position: i32,
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// Abbreviated machine reference embedded in module payloads
#[derive(Debug, Clone, Deserialize)]
pub struct MachineRefDto {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub os: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Full machine profile from the lab provider
#[derive(Debug, Clone, Deserialize)]
pub struct MachineProfileDto {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub os: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExamDto {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
}

/// Bare module reference in an exam's required-modules list
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleRefDto {
    pub id: i64,
}

/// A machine tag; `category` distinguishes vulnerabilities from free-text labels
#[derive(Debug, Clone, Deserialize)]
pub struct TagDto {
    pub id: i64,
    pub name: String,
    pub category: String,
}

impl TagDto {
    pub fn category(&self) -> TagCategory {
        TagCategory::from_label(&self.category)
    }
}

// ============================================================================
// Domain Entities
// ============================================================================

/// A learning module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub difficulty: Difficulty,
    pub url: String,
    pub avatar: Option<String>,
}

impl Module {
    pub fn from_dto(dto: &ModuleDto) -> Self {
        Module {
            id: dto.id,
            name: dto.name.clone(),
            description: dto.description.clone(),
            difficulty: normalize::normalize_difficulty(
                dto.difficulty.as_deref().unwrap_or(""),
                DifficultyScale::Module,
            ),
            url: dto.url.clone().unwrap_or_default(),
            avatar: dto.avatar.clone(),
        }
    }
}

/// A unit within a module; (id, module_id) is the identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: i64,
    pub module_id: i64,
    pub position: i32,
    pub name: String,
    pub kind: UnitKind,
}

impl Unit {
    pub fn from_dto(module_id: i64, dto: &UnitDto) -> Self {
        Unit {
            id: dto.id,
            module_id,
            position: dto.position,
            name: dto.name.clone(),
            kind: normalize::normalize_unit_kind(dto.kind.as_deref().unwrap_or("")),
        }
    }
}

/// A practice machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    pub id: i64,
    pub name: String,
    pub synopsis: Option<String>,
    pub difficulty: Difficulty,
    pub os: Os,
    pub url: String,
    pub avatar: Option<String>,
}

impl Machine {
    pub fn from_profile(profile: &MachineProfileDto, url_base: &str) -> Self {
        Machine {
            id: profile.id,
            name: profile.name.clone(),
            synopsis: profile.synopsis.clone(),
            difficulty: normalize::normalize_difficulty(
                profile.difficulty.as_deref().unwrap_or(""),
                DifficultyScale::Machine,
            ),
            os: normalize::normalize_os(profile.os.as_deref().unwrap_or("")),
            url: Self::page_url(url_base, &profile.name),
            avatar: profile.avatar.clone(),
        }
    }

    /// Canonical machine page URL, derived deterministically from the name.
    pub fn page_url(base: &str, name: &str) -> String {
        format!("{}/{}", base.trim_end_matches('/'), name.to_lowercase())
    }
}

/// A certification exam
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exam {
    pub id: i64,
    pub name: String,
    pub logo: Option<String>,
}

impl Exam {
    pub fn from_dto(dto: &ExamDto) -> Self {
        Exam {
            id: dto.id,
            name: dto.name.clone(),
            logo: dto.logo.clone(),
        }
    }
}

/// A vulnerability taxonomy label, not owned by any machine or module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vulnerability {
    pub id: i64,
    pub name: String,
}

// ============================================================================
// Tests
// ============================================================================
