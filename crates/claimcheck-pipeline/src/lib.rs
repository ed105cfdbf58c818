//! Claim checking end to end: retrieval feeding the evidence judge, the A/B
//! evaluation harness, and the run-history sink.

pub mod checker;
pub mod eval;
pub mod history;

pub use checker::{CheckOutcome, ClaimChecker};
pub use eval::{citation_hit_rate, EvalCase, EvalResult, EvalSummary, EvaluationHarness};
pub use history::{RunHistory, RunRecord};
