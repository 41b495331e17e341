use crate::types::{Document, Value};
use serde::{Deserialize, Serialize};

/// A conjunction of field conditions. An empty filter matches every
/// document in the collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Filter {
    conditions: Vec<Condition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Condition {
    Eq(String, Value),
    Ne(String, Value),
    Gt(String, Value),
    Lt(String, Value),
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Eq(field.to_string(), value.into()));
        self
    }

    pub fn ne(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Ne(field.to_string(), value.into()));
        self
    }

    pub fn gt(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Gt(field.to_string(), value.into()));
        self
    }

    pub fn lt(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Lt(field.to_string(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions.iter().all(|condition| condition.matches(doc))
    }
}

impl Condition {
    fn matches(&self, doc: &Document) -> bool {
        match self {
            Condition::Eq(field, value) => doc.data.get(field) == Some(value),
            // A missing field counts as "not equal", like most document stores
            Condition::Ne(field, value) => doc.data.get(field) != Some(value),
            Condition::Gt(field, value) => {
                doc.data.get(field).is_some_and(|found| found > value)
            }
            Condition::Lt(field, value) => {
                doc.data.get(field).is_some_and(|found| found < value)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn doc(fields: Vec<(&str, Value)>) -> Document {
        let mut data = HashMap::new();
        for (key, value) in fields {
            data.insert(key.to_string(), value);
        }
        Document::new(data)
    }

    #[test]
    fn empty_filter_matches_everything() {
        let doc = doc(vec![("author", "Roy".into())]);
        assert!(Filter::new().matches(&doc));
    }

    #[test]
    fn eq_matches_exact_field_value() {
        let doc = doc(vec![("author", "Bill".into()), ("views", 3.into())]);
        assert!(Filter::new().eq("author", "Bill").matches(&doc));
        assert!(!Filter::new().eq("author", "Scott").matches(&doc));
        assert!(!Filter::new().eq("missing", "Bill").matches(&doc));
    }

    #[test]
    fn conditions_are_conjunctive() {
        let doc = doc(vec![("author", "Scott".into()), ("views", 10.into())]);
        assert!(
            Filter::new()
                .eq("author", "Scott")
                .gt("views", 5)
                .matches(&doc)
        );
        assert!(
            !Filter::new()
                .eq("author", "Scott")
                .gt("views", 50)
                .matches(&doc)
        );
    }

    #[test]
    fn ne_matches_missing_fields() {
        let doc = doc(vec![("author", "Roy".into())]);
        assert!(Filter::new().ne("editor", "Roy").matches(&doc));
        assert!(Filter::new().ne("author", "Bill").matches(&doc));
        assert!(!Filter::new().ne("author", "Roy").matches(&doc));
    }

    #[test]
    fn ordering_conditions_ignore_missing_fields() {
        let doc = doc(vec![("views", 10.into())]);
        assert!(Filter::new().lt("views", 20).matches(&doc));
        assert!(!Filter::new().gt("likes", 1).matches(&doc));
    }
}
