//! End-to-end engine run: libSQL store → rule matching → recorded actions.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use mailrules::error::ActionError;
use mailrules::rules::engine::{ActionExecutor, FailureMode, RuleEngine};
use mailrules::rules::loader::parse_rules;
use mailrules::rules::model::Action;
use mailrules::store::{Header, LibSqlStore, MessageRecord, MessageStore};

/// Executor that records submissions instead of calling a provider.
#[derive(Default)]
struct RecordingExecutor {
    submissions: Mutex<Vec<(String, Vec<String>)>>,
}

impl RecordingExecutor {
    fn submissions(&self) -> Vec<(String, Vec<String>)> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl ActionExecutor for RecordingExecutor {
    async fn apply(&self, message_id: &str, actions: &[Action]) -> Result<(), ActionError> {
        self.submissions.lock().unwrap().push((
            message_id.to_string(),
            actions.iter().map(|a| a.as_str().to_string()).collect(),
        ));
        Ok(())
    }
}

fn record(id: &str, headers: &[(&str, &str)]) -> MessageRecord {
    MessageRecord {
        id: id.into(),
        headers: headers
            .iter()
            .map(|(name, value)| Header {
                name: (*name).into(),
                value: (*value).into(),
            })
            .collect(),
    }
}

fn fixed_now(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

const RULES_JSON: &str = r#"[
    {
        "name": "archive stale promos",
        "conditions": {
            "match": "all",
            "rules": [
                {"field": "from", "predicate": "contains", "value": "promo"},
                {"field": "received_at", "predicate": "is_greater_than", "value": "5 days"}
            ]
        },
        "actions": ["mark_as_read", "move_to_archive"]
    },
    {
        "name": "flag invoices",
        "conditions": {
            "match": "any",
            "rules": [
                {"field": "subject", "predicate": "contains", "value": "Invoice"},
                {"field": "subject", "predicate": "contains", "value": "Receipt"}
            ]
        },
        "actions": ["move_to_inbox"]
    }
]"#;

async fn seeded_store() -> LibSqlStore {
    let store = LibSqlStore::new_memory().await.unwrap();
    // Old promotional mail; matches rule one.
    store
        .upsert(&record(
            "m1",
            &[
                ("From", "promo@shop.example"),
                ("Subject", "Summer deals"),
                ("Date", "Sat, 31 Aug 2024 15:44:49 +0000"),
            ],
        ))
        .await
        .unwrap();
    // Invoice from a promo sender, recent; matches only rule two.
    store
        .upsert(&record(
            "m2",
            &[
                ("From", "promo@shop.example"),
                ("Subject", "Invoice #42"),
                ("Date", "Mon, 09 Sep 2024 09:00:00 +0000"),
            ],
        ))
        .await
        .unwrap();
    // Personal mail; matches nothing.
    store
        .upsert(&record(
            "m3",
            &[
                ("From", "alice@example.com"),
                ("Subject", "Lunch?"),
                ("Date", "Mon, 09 Sep 2024 10:00:00 +0000"),
            ],
        ))
        .await
        .unwrap();
    store
}

#[tokio::test]
async fn full_run_submits_per_rule_in_order() {
    let store = seeded_store().await;
    let rule_set = parse_rules(RULES_JSON).unwrap();
    let engine = RuleEngine::new(rule_set, FailureMode::ContinueOnError).unwrap();
    let executor = RecordingExecutor::default();

    let now = fixed_now("2024-09-10T15:44:49Z");
    let summary = engine.run_at(&store, &executor, now).await.unwrap();

    assert_eq!(summary.messages_processed, 3);
    assert_eq!(summary.rules_matched, 2);
    assert_eq!(summary.actions_submitted, 3);
    assert!(!summary.has_errors());

    // m1 matched the promo rule (its own ordered action list), m2 the
    // invoice rule; m3 matched nothing.
    assert_eq!(
        executor.submissions(),
        vec![
            (
                "m1".to_string(),
                vec!["mark_as_read".to_string(), "move_to_archive".to_string()]
            ),
            ("m2".to_string(), vec!["move_to_inbox".to_string()]),
        ]
    );
}

#[tokio::test]
async fn rerun_at_same_instant_is_idempotent() {
    let store = seeded_store().await;
    let rule_set = parse_rules(RULES_JSON).unwrap();
    let engine = RuleEngine::new(rule_set, FailureMode::ContinueOnError).unwrap();
    let now = fixed_now("2024-09-10T15:44:49Z");

    let first = RecordingExecutor::default();
    let second = RecordingExecutor::default();
    engine.run_at(&store, &first, now).await.unwrap();
    engine.run_at(&store, &second, now).await.unwrap();

    assert_eq!(first.submissions(), second.submissions());
}

#[tokio::test]
async fn bad_date_header_is_recorded_without_crashing_the_run() {
    let store = LibSqlStore::new_memory().await.unwrap();
    store
        .upsert(&record(
            "broken",
            &[("From", "promo@shop.example"), ("Date", "yesterday-ish")],
        ))
        .await
        .unwrap();
    store
        .upsert(&record(
            "fine",
            &[
                ("From", "x@y.example"),
                ("Subject", "Invoice #7"),
                ("Date", "Mon, 09 Sep 2024 09:00:00 +0000"),
            ],
        ))
        .await
        .unwrap();

    let rule_set = parse_rules(RULES_JSON).unwrap();
    let engine = RuleEngine::new(rule_set, FailureMode::ContinueOnError).unwrap();
    let executor = RecordingExecutor::default();

    let summary = engine
        .run_at(&store, &executor, fixed_now("2024-09-10T00:00:00Z"))
        .await
        .unwrap();

    // The stale-promo rule failed on the broken Date header, the invoice
    // rule still matched the other message.
    assert_eq!(summary.messages_processed, 2);
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(
        executor.submissions(),
        vec![("fine".to_string(), vec!["move_to_inbox".to_string()])]
    );
}

#[tokio::test]
async fn malformed_rule_set_is_rejected_before_any_evaluation() {
    let raw = r#"[{
        "conditions": {
            "match": "all",
            "rules": [{"field": "received_at", "predicate": "equals", "value": "2 days"}]
        },
        "actions": ["mark_as_read"]
    }]"#;
    assert!(parse_rules(raw).is_err());
}
