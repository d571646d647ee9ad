//! Function registry: function id -> accumulated statistics.
//!
//! Built once from the trace header. The tree builder bumps call counts while
//! decoding; the annotator is the only writer of the cycle aggregates.

use crate::utils::config::{SELF_FUNCTION_ID, SELF_FUNCTION_NAME};
use crate::utils::error::ParseError;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of a scripted function (its 4 byte aligned pointer value)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FunctionId(pub u32);

impl FunctionId {
    /// Lookup id of the synthetic "self" record
    pub const SELF: FunctionId = FunctionId(SELF_FUNCTION_ID);

    /// Real function ids are non-zero with the two low bits clear
    pub fn is_function_pointer(self) -> bool {
        self.0 != 0 && self.0 & 3 == 0
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// Statistics for a single function across the whole trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub id: FunctionId,

    /// Display name as serialized in the header
    pub name: String,

    /// Inclusive cycles summed over every call site of this function
    pub incl_cycles: i64,

    /// Exclusive cycles summed over every call site of this function
    pub excl_cycles: i64,

    /// Number of times this function has been entered
    pub calls: u32,
}

impl FunctionRecord {
    pub fn new(id: FunctionId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            incl_cycles: 0,
            excl_cycles: 0,
            calls: 0,
        }
    }
}

/// Mapping from function id to its record
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    records: BTreeMap<FunctionId, FunctionRecord>,
}

impl FunctionRegistry {
    /// Create a registry holding only the synthetic "self" record
    pub fn new() -> Self {
        let mut records = BTreeMap::new();
        records.insert(
            FunctionId::SELF,
            FunctionRecord::new(FunctionId::SELF, SELF_FUNCTION_NAME),
        );
        Self { records }
    }

    /// Register a function declared in the header
    ///
    /// # Errors
    /// * `ParseError::ReservedFunctionId` - id collides with the self sentinel
    /// * `ParseError::DuplicateFunction` - id was already declared
    pub fn declare(&mut self, id: FunctionId, name: impl Into<String>) -> Result<(), ParseError> {
        if id == FunctionId::SELF {
            return Err(ParseError::ReservedFunctionId { id: id.0 });
        }
        if self.records.contains_key(&id) {
            return Err(ParseError::DuplicateFunction { id: id.0 });
        }
        if !id.is_function_pointer() {
            warn!("Function {} is not 4 byte aligned and can never be entered", id);
        }
        self.records.insert(id, FunctionRecord::new(id, name));
        Ok(())
    }

    /// Record one call of `id`
    ///
    /// Ids missing from the header get a placeholder record so that a
    /// stripped header still yields a usable tree.
    pub fn record_call(&mut self, id: FunctionId) {
        let record = self.records.entry(id).or_insert_with(|| {
            warn!("Function {} entered but not declared in header", id);
            FunctionRecord::new(id, format!("<unknown {}>", id))
        });
        record.calls += 1;
    }

    pub fn get(&self, id: FunctionId) -> Option<&FunctionRecord> {
        self.records.get(&id)
    }

    pub fn get_mut(&mut self, id: FunctionId) -> Option<&mut FunctionRecord> {
        self.records.get_mut(&id)
    }

    /// Display name of `id`, falling back to the hex id
    pub fn name_of(&self, id: FunctionId) -> String {
        self.records
            .get(&id)
            .map(|r| r.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Iterate records in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = &FunctionRecord> {
        self.records.values()
    }

    /// Number of records, the self record included
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_has_self_record() {
        let registry = FunctionRegistry::new();
        let record = registry.get(FunctionId::SELF).unwrap();
        assert_eq!(record.name, "self");
        assert_eq!(record.calls, 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_declare_rejects_sentinel_and_duplicates() {
        let mut registry = FunctionRegistry::new();
        registry.declare(FunctionId(4), "Main").unwrap();

        assert_eq!(
            registry.declare(FunctionId(4), "Again"),
            Err(ParseError::DuplicateFunction { id: 4 })
        );
        assert_eq!(
            registry.declare(FunctionId::SELF, "Fake"),
            Err(ParseError::ReservedFunctionId { id: SELF_FUNCTION_ID })
        );
        assert_eq!(registry.name_of(FunctionId(4)), "Main");
    }

    #[test]
    fn test_record_call_on_undeclared_function() {
        let mut registry = FunctionRegistry::new();
        registry.record_call(FunctionId(0x40));
        registry.record_call(FunctionId(0x40));

        let record = registry.get(FunctionId(0x40)).unwrap();
        assert_eq!(record.calls, 2);
        assert_eq!(record.name, "<unknown 0x00000040>");
    }

    #[test]
    fn test_function_pointer_alignment() {
        assert!(FunctionId(8).is_function_pointer());
        assert!(!FunctionId(0).is_function_pointer());
        assert!(!FunctionId(6).is_function_pointer());
        assert!(!FunctionId::SELF.is_function_pointer());
    }
}
