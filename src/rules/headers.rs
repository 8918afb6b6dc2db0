//! Case-insensitive header lookup built from a stored message record.

use std::collections::HashMap;

use crate::store::MessageRecord;

/// Lookup table from lower-cased header name to its value.
///
/// Built fresh per evaluation and never persisted. If a header name repeats
/// in the record, the later occurrence wins.
#[derive(Debug, Clone, Default)]
pub struct HeaderIndex {
    map: HashMap<String, String>,
}

impl HeaderIndex {
    /// Build the index from a record's header sequence. Never fails.
    pub fn build(record: &MessageRecord) -> Self {
        let mut map = HashMap::with_capacity(record.headers.len());
        for header in &record.headers {
            map.insert(header.name.to_lowercase(), header.value.clone());
        }
        Self { map }
    }

    /// Look up a header by name, case-insensitively. `None` when absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.map.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Header;

    fn record(headers: &[(&str, &str)]) -> MessageRecord {
        MessageRecord {
            id: "m1".into(),
            headers: headers
                .iter()
                .map(|(name, value)| Header {
                    name: (*name).into(),
                    value: (*value).into(),
                })
                .collect(),
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let index = HeaderIndex::build(&record(&[("Subject", "Hello")]));
        assert_eq!(index.get("subject"), Some("Hello"));
        assert_eq!(index.get("Subject"), Some("Hello"));
        assert_eq!(index.get("SUBJECT"), Some("Hello"));
    }

    #[test]
    fn missing_header_is_none() {
        let index = HeaderIndex::build(&record(&[("From", "a@b.com")]));
        assert_eq!(index.get("subject"), None);
    }

    #[test]
    fn empty_record_builds_empty_index() {
        let index = HeaderIndex::build(&record(&[]));
        assert!(index.is_empty());
        assert_eq!(index.get("anything"), None);
    }

    #[test]
    fn later_duplicate_wins() {
        let index = HeaderIndex::build(&record(&[
            ("Received", "first hop"),
            ("received", "second hop"),
        ]));
        assert_eq!(index.get("received"), Some("second hop"));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn values_keep_their_case() {
        let index = HeaderIndex::build(&record(&[("From", "Alice <ALICE@Example.com>")]));
        assert_eq!(index.get("from"), Some("Alice <ALICE@Example.com>"));
    }
}
