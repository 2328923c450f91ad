//! # Concept Binding Extraction
//!
//! Turns one query answer (variable name -> opaque store handle) into typed
//! `Thing` records.
//!
//! The store's handles are only reachable through the `ConceptHandle`
//! accessors; their base kind and data type arrive as free-form labels and
//! are narrowed here into the closed `ThingKind`/`Value` union. Everything
//! downstream works on `Thing` and never sees a handle.

use crate::types::{BaseKind, DataType, KgraphError, Thing, ThingKind, Value};
use std::collections::BTreeMap;

/// One query answer: variable name -> store handle.
pub type Answer<H> = BTreeMap<String, H>;

/// One extracted answer: variable name -> record.
pub type ConceptDict = BTreeMap<String, Thing>;

/// Read access to a record handle produced by the query collaborator.
pub trait ConceptHandle {
    /// Store identifier.
    fn id(&self) -> &str;

    /// Schema type label.
    fn type_label(&self) -> &str;

    /// Base kind label (`entity`, `relation`, `attribute`), any ASCII case.
    fn base_type(&self) -> &str;

    /// Declared data type label, for attributes.
    fn data_type(&self) -> Option<&str>;

    /// Attribute value, for attributes.
    fn value(&self) -> Option<Value>;
}

impl ConceptHandle for Thing {
    fn id(&self) -> &str {
        &self.id
    }

    fn type_label(&self) -> &str {
        &self.type_label
    }

    fn base_type(&self) -> &str {
        self.base_kind().as_str()
    }

    fn data_type(&self) -> Option<&str> {
        self.value().map(|value| value.data_type().as_str())
    }

    fn value(&self) -> Option<Value> {
        Thing::value(self).cloned()
    }
}

/// Read one handle into a `Thing`.
pub fn thing_from_handle<H: ConceptHandle + ?Sized>(handle: &H) -> Result<Thing, KgraphError> {
    let id = handle.id();
    let base_type = handle.base_type();
    let kind = match BaseKind::parse(base_type) {
        Some(BaseKind::Entity) => ThingKind::Entity,
        Some(BaseKind::Relation) => ThingKind::Relation,
        Some(BaseKind::Attribute) => ThingKind::Attribute(attribute_value(handle)?),
        None => {
            return Err(KgraphError::UnsupportedBaseKind {
                id: id.to_string(),
                kind: base_type.to_string(),
            });
        }
    };

    Ok(Thing {
        id: id.to_string(),
        type_label: handle.type_label().to_string(),
        kind,
    })
}

fn attribute_value<H: ConceptHandle + ?Sized>(handle: &H) -> Result<Value, KgraphError> {
    let declared = handle.data_type().unwrap_or_default();
    let Some(data_type) = DataType::parse(declared) else {
        return Err(KgraphError::UnsupportedDataType {
            id: handle.id().to_string(),
            data_type: declared.to_string(),
        });
    };

    let value = handle
        .value()
        .ok_or_else(|| KgraphError::InvalidAttributeValue {
            id: handle.id().to_string(),
            data_type,
            reason: "no value".to_string(),
        })?;

    if value.data_type() != data_type {
        return Err(KgraphError::InvalidAttributeValue {
            id: handle.id().to_string(),
            data_type,
            reason: format!("got a {} value ({value})", value.data_type()),
        });
    }

    Ok(value)
}

/// Extract every binding of one answer.
pub fn concept_dict_from_answer<H: ConceptHandle>(
    answer: &Answer<H>,
) -> Result<ConceptDict, KgraphError> {
    answer
        .iter()
        .map(|(variable, handle)| Ok((variable.clone(), thing_from_handle(handle)?)))
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
