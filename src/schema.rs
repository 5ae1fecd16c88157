//! Feature schema loading and vector alignment.
//!
//! A model's schema is the ordered feature-name list it was trained with,
//! shipped as a JSON sidecar next to the artifact. Every constructed
//! feature vector is reindexed onto that schema before inference:
//! schema columns the vector lacks are filled with 0, vector entries the
//! schema lacks are dropped. A misaligned vector produces wrong scores
//! rather than an error, so this step is where correctness lives.

use crate::error::ScoringError;
use serde::Deserialize;
use std::path::Path;

/// Ordered feature-name list a model was trained with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    names: Vec<String>,
}

#[derive(Deserialize)]
struct SchemaFile {
    features: Vec<String>,
}

impl FeatureSchema {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Load a schema sidecar file (`{"features": ["age", ...]}`).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScoringError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ScoringError::model_load(
                path.display().to_string(),
                format!("cannot read schema sidecar: {}", e),
            )
        })?;
        Self::parse(&content).map_err(|reason| {
            ScoringError::model_load(path.display().to_string(), reason)
        })
    }

    /// Parse schema JSON content.
    pub fn parse(content: &str) -> Result<Self, String> {
        let file: SchemaFile = serde_json::from_str(content)
            .map_err(|e| format!("invalid schema sidecar: {}", e))?;
        if file.features.is_empty() {
            return Err("schema sidecar lists no features".to_string());
        }
        Ok(Self::new(file.features))
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }
}

/// Insertion-ordered mapping from feature name to value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureVector {
    entries: Vec<(String, f32)>,
}

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, value: f32) {
        self.entries.push((name.into(), value));
    }

    pub fn get(&self, name: &str) -> Option<f32> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Reindex onto a schema: one value per schema column in schema order,
    /// missing columns filled with 0, extra entries dropped.
    pub fn align(&self, schema: &FeatureSchema) -> Vec<f32> {
        schema
            .names()
            .iter()
            .map(|name| self.get(name).unwrap_or(0.0))
            .collect()
    }

    /// Rebuild a named vector from schema-aligned values.
    pub fn from_aligned(schema: &FeatureSchema, values: &[f32]) -> Self {
        let entries = schema
            .names()
            .iter()
            .cloned()
            .zip(values.iter().copied())
            .collect();
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> FeatureSchema {
        FeatureSchema::new(vec![
            "age".to_string(),
            "total_spend".to_string(),
            "state_Delhi".to_string(),
            "platform_Web".to_string(),
        ])
    }

    #[test]
    fn test_parse_schema_sidecar() {
        let schema = FeatureSchema::parse(r#"{"features": ["age", "recency"]}"#).unwrap();
        assert_eq!(schema.len(), 2);
        assert!(schema.contains("age"));
        assert!(!schema.contains("state_Delhi"));
    }

    #[test]
    fn test_parse_rejects_empty_schema() {
        assert!(FeatureSchema::parse(r#"{"features": []}"#).is_err());
        assert!(FeatureSchema::parse("not json").is_err());
    }

    #[test]
    fn test_align_fills_missing_with_zero() {
        let mut vector = FeatureVector::new();
        vector.push("age", 35.0);
        vector.push("total_spend", 200.0);

        let aligned = vector.align(&schema());
        assert_eq!(aligned, vec![35.0, 200.0, 0.0, 0.0]);
    }

    #[test]
    fn test_align_drops_extra_columns() {
        let mut vector = FeatureVector::new();
        vector.push("age", 35.0);
        vector.push("unknown_feature", 99.0);
        vector.push("total_spend", 200.0);

        let aligned = vector.align(&schema());
        assert_eq!(aligned.len(), schema().len());
        assert_eq!(aligned, vec![35.0, 200.0, 0.0, 0.0]);
    }

    #[test]
    fn test_align_reorders_to_schema_order() {
        let mut vector = FeatureVector::new();
        vector.push("platform_Web", 1.0);
        vector.push("age", 42.0);

        let aligned = vector.align(&schema());
        assert_eq!(aligned, vec![42.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_align_is_idempotent() {
        let schema = schema();
        let mut vector = FeatureVector::new();
        vector.push("age", 35.0);
        vector.push("extra", 7.0);
        vector.push("state_Delhi", 1.0);

        let once = vector.align(&schema);
        let twice = FeatureVector::from_aligned(&schema, &once).align(&schema);
        assert_eq!(once, twice);
    }
}
