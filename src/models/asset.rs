use crate::errors::{AppError, AppResult};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Serialize)]
pub struct Asset {
    pub id: i64,
    pub branch_id: i64,
    pub area_id: Option<i64>,
    pub name: String,
    pub category: String,
    pub serial: Option<String>,
    pub status: String,
    pub specification: Option<Value>,
    pub created_at: String,
}

/// Validate the free-form specification typed by the user.
///
/// The field must be a JSON object; anything else is rejected before the
/// asset is written.
pub fn parse_specification(raw: &str) -> AppResult<Value> {
    let value: Value = serde_json::from_str(raw.trim())
        .map_err(|e| AppError::InvalidSpecification(e.to_string()))?;

    if !value.is_object() {
        return Err(AppError::InvalidSpecification(
            "specification must be a JSON object".into(),
        ));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_json_objects() {
        let v = parse_specification(r#"{ "power_kw": 3.5, "brand": "Daikin" }"#).unwrap();
        assert_eq!(v["brand"], "Daikin");
    }

    #[test]
    fn rejects_malformed_json() {
        let err = parse_specification("{ power_kw: 3.5 ").unwrap_err();
        assert!(matches!(err, AppError::InvalidSpecification(_)));
    }

    #[test]
    fn rejects_non_object_json() {
        let err = parse_specification("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, AppError::InvalidSpecification(_)));
    }
}
