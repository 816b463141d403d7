use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Schema revision tag written to every record.
pub const SPEC_VERSION_V1: &str = "squash-tree/v1";

/// The only record kind currently understood.
pub const TYPE_SQUASH: &str = "squash";

/// A structural violation found while decoding a squash record.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("failed to parse metadata JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("metadata missing required field: {0}")]
    MissingField(&'static str),

    #[error("unsupported spec version: {found} (expected {})", SPEC_VERSION_V1)]
    UnsupportedSpec { found: String },

    #[error("unsupported type: {found} (expected {})", TYPE_SQUASH)]
    UnsupportedType { found: String },

    #[error("metadata must have at least one child commit")]
    NoChildren,

    #[error("child commit at index {index} missing hash")]
    ChildMissingHash { index: usize },

    #[error("child commit at index {index} has invalid order: {order} (must be >= 1)")]
    ChildInvalidOrder { index: usize, order: i64 },

    #[error("duplicate order {order} in children")]
    DuplicateOrder { order: i64 },
}

/// One pre-squash commit referenced by a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildRef {
    #[serde(default)]
    pub hash: String,
    /// 1-based position among siblings. Gaps are allowed.
    #[serde(default)]
    pub order: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// The persisted description of one squash event, stored as a git note on
/// the squash result (`root`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquashRecord {
    #[serde(rename = "spec", default)]
    pub spec_version: String,
    #[serde(rename = "type", default)]
    pub record_type: String,
    #[serde(rename = "root", default)]
    pub root_id: String,
    #[serde(rename = "base", default)]
    pub base_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub children: Vec<ChildRef>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub strategy: String,
}

impl SquashRecord {
    /// Build a v1 record whose children are numbered 1..=n in the order given,
    /// stamped with the current UTC time.
    pub fn new(root: &str, base: &str, children: &[String], strategy: &str) -> Self {
        let children = children
            .iter()
            .zip(1..)
            .map(|(hash, order)| ChildRef {
                hash: hash.clone(),
                order,
                message: None,
            })
            .collect();
        Self {
            spec_version: SPEC_VERSION_V1.to_string(),
            record_type: TYPE_SQUASH.to_string(),
            root_id: root.to_string(),
            base_id: base.to_string(),
            message: None,
            children,
            created_at: now_rfc3339(),
            strategy: strategy.to_string(),
        }
    }

    /// Decode and validate a record payload.
    pub fn parse(bytes: &[u8]) -> Result<Self, SchemaError> {
        let record: SquashRecord = serde_json::from_slice(bytes)?;
        record.validate()?;
        Ok(record)
    }

    /// Encode to the pretty-printed wire form written into notes.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Children ordered by `order` ascending. Storage order is not significant.
    pub fn sorted_children(&self) -> Vec<&ChildRef> {
        let mut children: Vec<&ChildRef> = self.children.iter().collect();
        children.sort_by_key(|c| c.order);
        children
    }

    /// Check the structural rules. The first violation found is reported.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.spec_version.is_empty() {
            return Err(SchemaError::MissingField("spec"));
        }
        if self.spec_version != SPEC_VERSION_V1 {
            return Err(SchemaError::UnsupportedSpec {
                found: self.spec_version.clone(),
            });
        }
        if self.record_type.is_empty() {
            return Err(SchemaError::MissingField("type"));
        }
        if self.record_type != TYPE_SQUASH {
            return Err(SchemaError::UnsupportedType {
                found: self.record_type.clone(),
            });
        }
        if self.root_id.is_empty() {
            return Err(SchemaError::MissingField("root"));
        }
        if self.base_id.is_empty() {
            return Err(SchemaError::MissingField("base"));
        }
        if self.children.is_empty() {
            return Err(SchemaError::NoChildren);
        }

        let mut seen_orders = HashSet::new();
        for (index, child) in self.children.iter().enumerate() {
            if child.hash.is_empty() {
                return Err(SchemaError::ChildMissingHash { index });
            }
            if child.order < 1 {
                return Err(SchemaError::ChildInvalidOrder {
                    index,
                    order: child.order,
                });
            }
            if !seen_orders.insert(child.order) {
                return Err(SchemaError::DuplicateOrder { order: child.order });
            }
        }
        Ok(())
    }
}

fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "spec": "squash-tree/v1",
        "type": "squash",
        "root": "abc123",
        "base": "def456",
        "children": [
            {"hash": "c1", "order": 1},
            {"hash": "c2", "order": 2, "message": "fix typo"}
        ],
        "created_at": "2026-01-27T14:30:00Z",
        "strategy": "rebase"
    }"#;

    fn parse_err(json: &str) -> SchemaError {
        SquashRecord::parse(json.as_bytes()).unwrap_err()
    }

    #[test]
    fn parse_valid_record() {
        let record = SquashRecord::parse(VALID.as_bytes()).unwrap();
        assert_eq!(record.spec_version, SPEC_VERSION_V1);
        assert_eq!(record.record_type, TYPE_SQUASH);
        assert_eq!(record.root_id, "abc123");
        assert_eq!(record.base_id, "def456");
        assert_eq!(record.message, None);
        assert_eq!(record.children.len(), 2);
        assert_eq!(record.children[0].hash, "c1");
        assert_eq!(record.children[0].order, 1);
        assert_eq!(record.children[1].message.as_deref(), Some("fix typo"));
        assert_eq!(record.created_at, "2026-01-27T14:30:00Z");
        assert_eq!(record.strategy, "rebase");
    }

    #[test]
    fn encode_then_parse_is_lossless() {
        let mut record = SquashRecord::parse(VALID.as_bytes()).unwrap();
        record.message = Some("Squash feature branch".into());
        let json = record.to_json_pretty().unwrap();
        let again = SquashRecord::parse(json.as_bytes()).unwrap();
        assert_eq!(again, record);
    }

    #[test]
    fn absent_message_is_omitted_on_encode() {
        let record = SquashRecord::parse(VALID.as_bytes()).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&record.to_json_pretty().unwrap()).unwrap();
        assert!(value.get("message").is_none());
        assert!(value["children"][0].get("message").is_none());
        assert_eq!(value["children"][1]["message"], "fix typo");
        assert_eq!(value["spec"], "squash-tree/v1");
        assert_eq!(value["type"], "squash");
    }

    #[test]
    fn malformed_payload() {
        assert!(matches!(parse_err("not json"), SchemaError::Malformed(_)));
    }

    #[test]
    fn missing_spec() {
        let err = parse_err(
            r#"{"type":"squash","root":"r","base":"b","children":[{"hash":"c","order":1}]}"#,
        );
        assert!(matches!(err, SchemaError::MissingField("spec")));
    }

    #[test]
    fn wrong_spec() {
        let err = parse_err(
            r#"{"spec":"v0","type":"squash","root":"r","base":"b","children":[{"hash":"c","order":1}]}"#,
        );
        assert!(err.to_string().contains("unsupported spec version"));
    }

    #[test]
    fn missing_type() {
        let err = parse_err(
            r#"{"spec":"squash-tree/v1","root":"r","base":"b","children":[{"hash":"c","order":1}]}"#,
        );
        assert!(matches!(err, SchemaError::MissingField("type")));
    }

    #[test]
    fn wrong_type() {
        let err = parse_err(
            r#"{"spec":"squash-tree/v1","type":"other","root":"r","base":"b","children":[{"hash":"c","order":1}]}"#,
        );
        assert!(err.to_string().contains("unsupported type"));
    }

    #[test]
    fn missing_root() {
        let err = parse_err(
            r#"{"spec":"squash-tree/v1","type":"squash","base":"b","children":[{"hash":"c","order":1}]}"#,
        );
        assert!(matches!(err, SchemaError::MissingField("root")));
    }

    #[test]
    fn missing_base() {
        let err = parse_err(
            r#"{"spec":"squash-tree/v1","type":"squash","root":"r","children":[{"hash":"c","order":1}]}"#,
        );
        assert!(matches!(err, SchemaError::MissingField("base")));
    }

    #[test]
    fn empty_children() {
        let err = parse_err(
            r#"{"spec":"squash-tree/v1","type":"squash","root":"r","base":"b","children":[]}"#,
        );
        assert!(matches!(err, SchemaError::NoChildren));
        assert!(err.to_string().contains("at least one child"));
    }

    #[test]
    fn child_with_empty_hash() {
        let err = parse_err(
            r#"{"spec":"squash-tree/v1","type":"squash","root":"r","base":"b","children":[{"hash":"","order":1}]}"#,
        );
        assert!(matches!(err, SchemaError::ChildMissingHash { index: 0 }));
    }

    #[test]
    fn child_with_order_below_one() {
        let err = parse_err(
            r#"{"spec":"squash-tree/v1","type":"squash","root":"r","base":"b","children":[{"hash":"c","order":0}]}"#,
        );
        assert!(matches!(
            err,
            SchemaError::ChildInvalidOrder { index: 0, order: 0 }
        ));
        let err = parse_err(
            r#"{"spec":"squash-tree/v1","type":"squash","root":"r","base":"b","children":[{"hash":"a","order":1},{"hash":"c","order":-4}]}"#,
        );
        assert!(matches!(
            err,
            SchemaError::ChildInvalidOrder { index: 1, order: -4 }
        ));
    }

    #[test]
    fn duplicate_order() {
        let err = parse_err(
            r#"{"spec":"squash-tree/v1","type":"squash","root":"r","base":"b","children":[{"hash":"a","order":1},{"hash":"b","order":1}]}"#,
        );
        assert!(matches!(err, SchemaError::DuplicateOrder { order: 1 }));
    }

    #[test]
    fn gaps_in_order_are_accepted() {
        let record = SquashRecord::parse(
            br#"{"spec":"squash-tree/v1","type":"squash","root":"r","base":"b","children":[{"hash":"c3","order":3},{"hash":"c1","order":1}]}"#,
        )
        .unwrap();
        let hashes: Vec<&str> = record
            .sorted_children()
            .iter()
            .map(|c| c.hash.as_str())
            .collect();
        assert_eq!(hashes, vec!["c1", "c3"]);
        // storage order is untouched
        assert_eq!(record.children[0].hash, "c3");
    }

    #[test]
    fn new_numbers_children_from_one() {
        let record = SquashRecord::new("r", "b", &["x".into(), "y".into(), "z".into()], "auto");
        record.validate().unwrap();
        let orders: Vec<i64> = record.children.iter().map(|c| c.order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
        assert_eq!(record.strategy, "auto");
        assert!(time::OffsetDateTime::parse(
            &record.created_at,
            &time::format_description::well_known::Rfc3339
        )
        .is_ok());
    }
}
