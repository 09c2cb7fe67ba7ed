//! Administrative hierarchy types for PIP lookup.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Thai administrative tiers, broadest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub enum AdminLevel {
    /// Province / changwat (ADM1)
    #[serde(rename = "ADM1")]
    Province,
    /// District / amphoe (ADM2)
    #[serde(rename = "ADM2")]
    Amphoe,
    /// Sub-district / tambon (ADM3)
    #[serde(rename = "ADM3")]
    Tambon,
}

impl AdminLevel {
    /// Get all admin levels in hierarchical order (province first)
    pub fn all() -> &'static [AdminLevel] {
        &[AdminLevel::Province, AdminLevel::Amphoe, AdminLevel::Tambon]
    }

    /// Levels from the province down to and including `self`
    pub fn chain(&self) -> &'static [AdminLevel] {
        match self {
            AdminLevel::Province => &Self::all()[..1],
            AdminLevel::Amphoe => &Self::all()[..2],
            AdminLevel::Tambon => Self::all(),
        }
    }

    /// The level whose pcode selects this level's dataset
    pub fn parent(&self) -> Option<AdminLevel> {
        match self {
            AdminLevel::Province => None,
            AdminLevel::Amphoe => Some(AdminLevel::Province),
            AdminLevel::Tambon => Some(AdminLevel::Amphoe),
        }
    }

    /// Numeric tier used in property keys (`ADM<n>_EN`)
    pub fn number(&self) -> u8 {
        match self {
            AdminLevel::Province => 1,
            AdminLevel::Amphoe => 2,
            AdminLevel::Tambon => 3,
        }
    }

    /// Tag stored in `admLevel`
    pub fn tag(&self) -> &'static str {
        match self {
            AdminLevel::Province => "ADM1",
            AdminLevel::Amphoe => "ADM2",
            AdminLevel::Tambon => "ADM3",
        }
    }

    /// Get the field name for this level, also the accuracy config key
    pub fn field_name(&self) -> &'static str {
        match self {
            AdminLevel::Province => "province",
            AdminLevel::Amphoe => "amphoe",
            AdminLevel::Tambon => "tambon",
        }
    }

    /// Parse a field name (`"province"`, `"amphoe"`, `"tambon"`)
    pub fn from_field_name(name: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|level| level.field_name() == name)
    }

    pub(crate) fn name_en_key(&self) -> String {
        format!("ADM{}_EN", self.number())
    }

    pub(crate) fn name_th_key(&self) -> String {
        format!("ADM{}_TH", self.number())
    }

    pub(crate) fn pcode_key(&self) -> String {
        format!("ADM{}_PCODE", self.number())
    }
}

impl fmt::Display for AdminLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// A region read verbatim from a dataset feature's properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUnit {
    #[serde(rename = "nameEN")]
    pub name_en: String,

    #[serde(rename = "nameTH")]
    pub name_th: String,

    /// Region code, also the key for the child level's dataset
    pub pcode: String,

    #[serde(rename = "admLevel")]
    pub adm_level: AdminLevel,
}

/// Result of a province lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvinceLookup {
    pub province: Option<AdminUnit>,
}

/// Result of an amphoe lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmphoeLookup {
    pub province: Option<AdminUnit>,
    pub amphoe: Option<AdminUnit>,
}

/// Result of a tambon lookup.
///
/// Deeper levels are `None` whenever a broader one is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TambonLookup {
    pub province: Option<AdminUnit>,
    pub amphoe: Option<AdminUnit>,
    pub tambon: Option<AdminUnit>,
}

/// Depth-tagged lookup result, for callers choosing the depth at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AdminLookup {
    Province(ProvinceLookup),
    Amphoe(AmphoeLookup),
    Tambon(TambonLookup),
}

impl AdminLookup {
    /// Get the unit resolved at a given level, if that level was requested and matched
    pub fn get(&self, level: AdminLevel) -> Option<&AdminUnit> {
        match (self, level) {
            (AdminLookup::Province(r), AdminLevel::Province) => r.province.as_ref(),
            (AdminLookup::Amphoe(r), AdminLevel::Province) => r.province.as_ref(),
            (AdminLookup::Amphoe(r), AdminLevel::Amphoe) => r.amphoe.as_ref(),
            (AdminLookup::Tambon(r), AdminLevel::Province) => r.province.as_ref(),
            (AdminLookup::Tambon(r), AdminLevel::Amphoe) => r.amphoe.as_ref(),
            (AdminLookup::Tambon(r), AdminLevel::Tambon) => r.tambon.as_ref(),
            _ => None,
        }
    }
}
