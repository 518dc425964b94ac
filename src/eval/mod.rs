//! Evaluation session and report generation.
//!
//! - [`session::EvalSession`]: runs the strategies and scores artifacts
//! - [`session::EvalConfig`]: output location, failure policy, report options
//! - [`report`]: result records, ranking and summary rendering

pub mod report;
pub mod session;

pub use report::{Report, ResultRecord};
pub use session::{EvalConfig, EvalSession, Evaluation, FailurePolicy, StrategyFailure};
