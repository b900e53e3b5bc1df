//! Key/value annotations attached to a distance field.
//!
//! Metadata is provenance/tagging only; no geometric algorithm reads it.

use std::collections::BTreeMap;

use glam::Vec3;

/// A single typed metadata value.
#[derive(Clone, Debug, PartialEq)]
pub enum MetaValue {
  Str(String),
  Float(f32),
  Int(i64),
  Vector(Vec3),
}

/// String-keyed typed annotations for one grid instance.
///
/// Keys are kept sorted so enumeration order is stable.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldMetadata {
  values: BTreeMap<String, MetaValue>,
}

impl FieldMetadata {
  pub fn new() -> Self {
    Self::default()
  }

  /// Set or replace a value.
  pub fn set(&mut self, key: impl Into<String>, value: MetaValue) {
    self.values.insert(key.into(), value);
  }

  pub fn get(&self, key: &str) -> Option<&MetaValue> {
    self.values.get(key)
  }

  /// Remove a value, returning it if present.
  pub fn remove(&mut self, key: &str) -> Option<MetaValue> {
    self.values.remove(key)
  }

  /// All keys in sorted order.
  pub fn keys(&self) -> impl Iterator<Item = &str> {
    self.values.keys().map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }
}
