use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Category tag carried by every sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    A,
    B,
    C,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::A, Category::B, Category::C];

    /// Cycles through A, B, C for any index
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Category::A => "A",
            Category::B => "B",
            Category::C => "C",
        }
    }
}

/// One timestamped measurement in the stream.
///
/// Samples are never mutated once created: the buffer only hands out shared
/// references, and eviction is the only way a sample leaves the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,

    pub value: f64,

    pub category: Category,

    /// Side-channel tags (source, region, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, String>>,
}

impl Sample {
    pub fn new(timestamp: i64, value: f64, category: Category) -> Self {
        Self {
            timestamp,
            value,
            category,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.as_ref()?.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_cycles() {
        assert_eq!(Category::from_index(0), Category::A);
        assert_eq!(Category::from_index(4), Category::B);
        assert_eq!(Category::from_index(5), Category::C);
    }

    #[test]
    fn test_sample_json_shape() {
        let sample = Sample::new(1_000, 42.5, Category::B);
        let json = serde_json::to_value(&sample).unwrap();

        assert_eq!(json["category"], "B");
        assert!(json.get("metadata").is_none());

        let parsed: Sample = serde_json::from_str(
            r#"{"timestamp": 5, "value": 1.5, "category": "C", "metadata": {"region": "North"}}"#,
        )
        .unwrap();
        assert_eq!(parsed.category, Category::C);
        assert_eq!(parsed.metadata_value("region"), Some("North"));
    }
}
