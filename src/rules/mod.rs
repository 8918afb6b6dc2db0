//! Rule evaluation engine — conditions, matching, and action dispatch.

pub mod duration;
pub mod engine;
pub mod evaluate;
pub mod headers;
pub mod loader;
pub mod matcher;
pub mod model;

pub use engine::{ActionExecutor, FailureMode, RuleEngine, RunSummary};
pub use headers::HeaderIndex;
pub use loader::load_rules;
pub use model::{Action, Condition, MatchPolicy, PredicateKind, Rule, RuleSet};
