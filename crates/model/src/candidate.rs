use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// An entity that can be selected as a binding's target, as listed by the
/// catalog service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateEntity {
    pub id: String,
    pub display_name: String,
    /// Secondary label used to section policy candidates, e.g. the verbose
    /// policy type name. Groups and users leave it unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
}

impl CandidateEntity {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            classification: None,
        }
    }

    pub fn with_classification(mut self, classification: impl Into<String>) -> Self {
        self.classification = Some(classification.into());
        self
    }

    /// Primary-key ordering. Numeric keys (user ids) compare numerically,
    /// everything else lexically; numeric keys sort first.
    pub fn cmp_pk(&self, other: &Self) -> Ordering {
        match (self.id.parse::<i64>(), other.id.parse::<i64>()) {
            (Ok(a), Ok(b)) => a.cmp(&b),
            (Ok(_), Err(_)) => Ordering::Less,
            (Err(_), Ok(_)) => Ordering::Greater,
            (Err(_), Err(_)) => self.id.cmp(&other.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_keys_sort_numerically() {
        let mut users = vec![
            CandidateEntity::new("10", "j"),
            CandidateEntity::new("2", "b"),
            CandidateEntity::new("1", "a"),
        ];
        users.sort_by(CandidateEntity::cmp_pk);
        let ids: Vec<&str> = users.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "10"]);
    }

    #[test]
    fn uuid_keys_sort_lexically() {
        let a = CandidateEntity::new("0b7c", "x");
        let b = CandidateEntity::new("a310", "y");
        assert_eq!(a.cmp_pk(&b), Ordering::Less);
    }

    #[test]
    fn classification_is_omitted_when_absent() {
        let value = serde_json::to_value(CandidateEntity::new("g-1", "admins")).unwrap();
        assert!(value.get("classification").is_none());
    }
}
