//! Field-by-field comparison of two record snapshots.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    pub field: String,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "changes", rename_all = "snake_case")]
pub enum AuditDiff {
    FullInsert,
    FullDelete,
    Changes(Vec<FieldChange>),
}

impl AuditDiff {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, AuditDiff::Changes(c) if c.is_empty())
    }

    pub fn summary(&self) -> String {
        match self {
            AuditDiff::FullInsert => "full insert".to_string(),
            AuditDiff::FullDelete => "full delete".to_string(),
            AuditDiff::Changes(c) if c.is_empty() => "no changes".to_string(),
            AuditDiff::Changes(c) => c
                .iter()
                .map(|f| f.field.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

fn present(v: Option<&Value>) -> Option<&Value> {
    v.filter(|v| !v.is_null())
}

/// Keys whose serialized values differ between `before` and `after`.
///
/// A key found on one side only counts as changed. A missing (or JSON
/// `null`) `before` is a full insert, a missing `after` a full delete.
/// Keys come out in sorted order.
pub fn audit_diff(before: Option<&Value>, after: Option<&Value>) -> AuditDiff {
    match (present(before), present(after)) {
        (None, None) => AuditDiff::Changes(Vec::new()),
        (None, Some(_)) => AuditDiff::FullInsert,
        (Some(_), None) => AuditDiff::FullDelete,
        (Some(Value::Object(b)), Some(Value::Object(a))) => AuditDiff::Changes(diff_objects(b, a)),
        (Some(b), Some(a)) => {
            if serialized(Some(b)) == serialized(Some(a)) {
                AuditDiff::Changes(Vec::new())
            } else {
                AuditDiff::Changes(vec![FieldChange {
                    field: "(value)".to_string(),
                    old_value: Some(b.clone()),
                    new_value: Some(a.clone()),
                }])
            }
        }
    }
}

fn diff_objects(before: &Map<String, Value>, after: &Map<String, Value>) -> Vec<FieldChange> {
    let keys: BTreeSet<&String> = before.keys().chain(after.keys()).collect();

    keys.into_iter()
        .filter_map(|key| {
            let b = before.get(key);
            let a = after.get(key);
            (serialized(b) != serialized(a)).then(|| FieldChange {
                field: key.clone(),
                old_value: b.cloned(),
                new_value: a.cloned(),
            })
        })
        .collect()
}

fn serialized(v: Option<&Value>) -> Option<String> {
    v.map(Value::to_string)
}
