//! Family Types - Level 1 Foundation Types
//!
//! This crate contains the pure data structures shared by every other part of
//! the family forest workspace: the member record as delivered by the external
//! document store, its identifier, and the registry status.
//!
//! ## Architecture Level: LEVEL 1 (Foundation)
//!
//! Nothing in this crate knows about trees, layout or rendering. Records are
//! immutable snapshots; the resolver and the layout engine only ever read them.
//!
//! ## Wire format
//!
//! Records use the store's camelCase field names (`lastName`, `parentId`, ...).
//! The store is not strict about empty values, so empty-string references are
//! read as "no reference", and the legacy registry values `magomago` / `tengoku`
//! are accepted as aliases of `living` / `deceased`.

use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Borrow;
use std::fmt;

// ============================================================================
// IDENTIFIERS
// ============================================================================

/// Opaque, stable identifier of a member record (the store's document id)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    /// Create an id from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MemberId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for MemberId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for MemberId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Branch grouping identifier. Records without a branch belong to the founder's branch.
pub type BranchId = u32;

/// Branch used for records that carry no `branchId`
pub const FOUNDER_BRANCH: BranchId = 0;

/// Generation number of the founder
pub const FOUNDER_GENERATION: u32 = 1;

// ============================================================================
// REGISTRY STATUS
// ============================================================================

/// Registry status of a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Registry {
    /// Living member
    #[default]
    #[serde(alias = "magomago")]
    Living,
    /// Deceased member
    #[serde(alias = "tengoku")]
    Deceased,
}

impl Registry {
    /// Get the canonical wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Registry::Living => "living",
            Registry::Deceased => "deceased",
        }
    }
}

impl fmt::Display for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// MEMBER RECORD
// ============================================================================

/// A single member record as fetched from the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Unique id, stable for the record's lifetime
    pub id: MemberId,

    /// Family name
    #[serde(default)]
    pub last_name: String,

    /// Given name
    #[serde(default)]
    pub first_name: String,

    /// Living / deceased
    #[serde(default)]
    pub registry: Registry,

    /// Generation number, 1 = founder
    pub generation: u32,

    /// Branch grouping; `None` means the founder's branch
    #[serde(default)]
    pub branch_id: Option<BranchId>,

    /// Recorded blood parent
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub parent_id: Option<MemberId>,

    /// Recorded spouse. Not guaranteed to be reciprocated.
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub spouse_id: Option<MemberId>,

    /// Birth date, ISO `YYYY-MM-DD`; only compared, never validated
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub birth_date: Option<String>,

    /// Date of death for deceased members
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub passed_at: Option<String>,

    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub address: Option<String>,

    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub phone: Option<String>,
}

impl Member {
    /// Create a living member with no relations
    pub fn new(
        id: impl Into<MemberId>,
        last_name: impl Into<String>,
        first_name: impl Into<String>,
        generation: u32,
    ) -> Self {
        Self {
            id: id.into(),
            last_name: last_name.into(),
            first_name: first_name.into(),
            registry: Registry::Living,
            generation,
            branch_id: None,
            parent_id: None,
            spouse_id: None,
            birth_date: None,
            passed_at: None,
            address: None,
            phone: None,
        }
    }

    /// Set the blood parent
    pub fn with_parent(mut self, parent_id: impl Into<MemberId>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Set the spouse reference
    pub fn with_spouse(mut self, spouse_id: impl Into<MemberId>) -> Self {
        self.spouse_id = Some(spouse_id.into());
        self
    }

    /// Set the branch
    pub fn with_branch(mut self, branch_id: BranchId) -> Self {
        self.branch_id = Some(branch_id);
        self
    }

    /// Set the birth date
    pub fn with_birth_date(mut self, birth_date: impl Into<String>) -> Self {
        self.birth_date = Some(birth_date.into());
        self
    }

    /// Mark as deceased, optionally with a date of death
    pub fn deceased(mut self, passed_at: Option<&str>) -> Self {
        self.registry = Registry::Deceased;
        self.passed_at = passed_at.map(str::to_string);
        self
    }

    /// Branch with the founder default applied
    pub fn branch(&self) -> BranchId {
        self.branch_id.unwrap_or(FOUNDER_BRANCH)
    }

    /// Whether this record is a generation-1 founder
    pub fn is_founder(&self) -> bool {
        self.generation == FOUNDER_GENERATION
    }

    pub fn is_deceased(&self) -> bool {
        self.registry == Registry::Deceased
    }

    /// Display label: family name, then given name
    pub fn display_name(&self) -> String {
        format!("{} {}", self.last_name, self.first_name)
    }

    /// Lowercased `last_name + first_name`, the key used by name search
    pub fn search_key(&self) -> String {
        format!("{}{}", self.last_name, self.first_name).to_lowercase()
    }
}

fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<MemberId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_optional_text(deserializer)?.map(MemberId))
}

fn deserialize_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|value| !value.trim().is_empty()))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_from_store_json() {
        let json = r#"{
            "id": "c1",
            "lastName": "Yamada",
            "firstName": "Jiro",
            "registry": "tengoku",
            "generation": 2,
            "branchId": 3,
            "parentId": "f1",
            "spouseId": "",
            "birthDate": "1950-01-01",
            "passedAt": "2001-05-02",
            "createdAt": "ignored"
        }"#;

        let member: Member = serde_json::from_str(json).unwrap();
        assert_eq!(member.id, MemberId::from("c1"));
        assert_eq!(member.registry, Registry::Deceased);
        assert_eq!(member.branch(), 3);
        assert_eq!(member.parent_id, Some(MemberId::from("f1")));
        assert_eq!(member.spouse_id, None);
        assert_eq!(member.birth_date.as_deref(), Some("1950-01-01"));
        assert_eq!(member.address, None);
    }

    #[test]
    fn test_missing_optional_fields() {
        let json = r#"{"id": "f1", "lastName": "Yamada", "firstName": "Taro", "generation": 1}"#;
        let member: Member = serde_json::from_str(json).unwrap();

        assert!(member.is_founder());
        assert_eq!(member.branch(), FOUNDER_BRANCH);
        assert_eq!(member.registry, Registry::Living);
        assert_eq!(member.parent_id, None);
    }

    #[test]
    fn test_registry_names() {
        let living: Registry = serde_json::from_str("\"magomago\"").unwrap();
        let deceased: Registry = serde_json::from_str("\"deceased\"").unwrap();
        assert_eq!(living, Registry::Living);
        assert_eq!(deceased, Registry::Deceased);
        assert_eq!(serde_json::to_string(&deceased).unwrap(), "\"deceased\"");
    }

    #[test]
    fn test_labels() {
        let member = Member::new("a", "Yamada", "Hanako", 2);
        assert_eq!(member.display_name(), "Yamada Hanako");
        assert_eq!(member.search_key(), "yamadahanako");
    }

    #[test]
    fn test_member_id_borrows_as_str() {
        let mut map = std::collections::HashMap::new();
        map.insert(MemberId::from("x"), 1);
        assert_eq!(map.get("x"), Some(&1));
    }
}
