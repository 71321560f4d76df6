//! Reference types - persisted article references
//!
//! A reference records that one article (the source) points at a target:
//! - `Inner`: another article in the system (wire code 11)
//! - `External`: an outside URL or uploaded resource (wire code 21)
//!
//! `target_url` is the stable identity of a target for every type, and
//! `source_id` the stable identity of a source. Names are display only.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Discriminator for what a reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum TargetType {
    /// Another article in the same system
    Inner,
    /// An external URL or resource
    External,
}

impl TargetType {
    /// Get the persisted integer code
    pub fn code(&self) -> i64 {
        match self {
            TargetType::Inner => 11,
            TargetType::External => 21,
        }
    }

    /// Get the string representation of the target type
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Inner => "inner",
            TargetType::External => "external",
        }
    }

    /// Get all target types
    pub fn all() -> &'static [TargetType] {
        &[TargetType::Inner, TargetType::External]
    }

    /// Target types visible to a graph query
    pub fn filter(only_inner: bool) -> &'static [TargetType] {
        if only_inner {
            &[TargetType::Inner]
        } else {
            Self::all()
        }
    }

    pub fn is_inner(&self) -> bool {
        matches!(self, TargetType::Inner)
    }
}

impl TryFrom<i64> for TargetType {
    type Error = crate::Error;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            11 => Ok(TargetType::Inner),
            21 => Ok(TargetType::External),
            other => Err(crate::Error::InvalidTargetType(other.to_string())),
        }
    }
}

impl From<TargetType> for i64 {
    fn from(value: TargetType) -> Self {
        value.code()
    }
}

impl FromStr for TargetType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "11" | "inner" | "article" => Ok(TargetType::Inner),
            "21" | "external" | "url" => Ok(TargetType::External),
            _ => Err(crate::Error::InvalidTargetType(s.to_string())),
        }
    }
}

impl std::fmt::Display for TargetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One outbound reference as submitted by a caller of `bind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceRequest {
    pub target_type: TargetType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<i64>,
    pub target_url: String,
    pub target_name: String,
}

impl ReferenceRequest {
    /// Reference to another article
    pub fn inner(target_id: i64, target_url: impl Into<String>, target_name: impl Into<String>) -> Self {
        Self {
            target_type: TargetType::Inner,
            target_id: Some(target_id),
            target_url: target_url.into(),
            target_name: target_name.into(),
        }
    }

    /// Reference to an external URL
    pub fn external(target_url: impl Into<String>, target_name: impl Into<String>) -> Self {
        Self {
            target_type: TargetType::External,
            target_id: None,
            target_url: target_url.into(),
            target_name: target_name.into(),
        }
    }

    /// Stamp the request with its owner and source article.
    ///
    /// Inner references must name the target article.
    pub fn into_record(self, user_id: i64, source_id: i64, source_name: &str) -> crate::Result<ReferenceRecord> {
        if self.target_type.is_inner() && self.target_id.is_none() {
            return Err(crate::Error::InvalidReference(format!(
                "inner reference to {} has no target id",
                self.target_url
            )));
        }

        Ok(ReferenceRecord {
            id: 0,
            user_id,
            source_id,
            source_name: source_name.to_string(),
            target_type: self.target_type,
            target_id: self.target_id,
            target_url: self.target_url,
            target_name: self.target_name,
        })
    }
}

/// Persisted reference record (one directed edge in storage)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceRecord {
    pub id: i64,
    pub user_id: i64,
    pub source_id: i64,
    pub source_name: String,
    pub target_type: TargetType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<i64>,
    pub target_url: String,
    pub target_name: String,
}

impl ReferenceRecord {
    /// Create a record for insertion (id will be set by DB)
    pub fn new(user_id: i64, source_id: i64, source_name: &str, request: ReferenceRequest) -> crate::Result<Self> {
        request.into_record(user_id, source_id, source_name)
    }

    pub fn is_inner(&self) -> bool {
        self.target_type.is_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_type_codes() {
        for kind in TargetType::all() {
            let parsed = TargetType::try_from(kind.code()).unwrap();
            assert_eq!(*kind, parsed);
            assert_eq!(kind.as_str().parse::<TargetType>().unwrap(), *kind);
        }
        assert!(TargetType::try_from(12).is_err());
        assert!("folder".parse::<TargetType>().is_err());
    }

    #[test]
    fn test_filter() {
        assert_eq!(TargetType::filter(true), &[TargetType::Inner]);
        assert_eq!(TargetType::filter(false), &[TargetType::Inner, TargetType::External]);
    }

    #[test]
    fn test_request_json_shape() {
        let json = r#"{"targetType":21,"targetUrl":"https://x.com","targetName":"X"}"#;
        let req: ReferenceRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req, ReferenceRequest::external("https://x.com", "X"));

        let bad = r#"{"targetType":99,"targetUrl":"u","targetName":"n"}"#;
        assert!(serde_json::from_str::<ReferenceRequest>(bad).is_err());
    }

    #[test]
    fn test_into_record_stamps_source() {
        let record = ReferenceRequest::inner(2, "/articles/2", "Guide")
            .into_record(7, 1, "Intro")
            .unwrap();
        assert_eq!(record.user_id, 7);
        assert_eq!(record.source_id, 1);
        assert_eq!(record.source_name, "Intro");
        assert_eq!(record.target_id, Some(2));
        assert!(record.is_inner());
    }

    #[test]
    fn test_inner_without_target_id_rejected() {
        let req = ReferenceRequest {
            target_type: TargetType::Inner,
            target_id: None,
            target_url: "/articles/2".into(),
            target_name: "Guide".into(),
        };
        let err = req.into_record(7, 1, "Intro").unwrap_err();
        assert!(matches!(err, crate::Error::InvalidReference(_)));
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = ReferenceRequest::external("https://x.com", "X")
            .into_record(7, 1, "Intro")
            .unwrap();
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["sourceName"], "Intro");
        assert_eq!(value["targetType"], 21);
        assert!(value.get("targetId").is_none());
    }
}
