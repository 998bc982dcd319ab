//! FraudGuard Policy
//!
//! The decision logic for a single transaction:
//!
//! - [`checker`]: deterministic balance-consistency rules
//! - [`engine`]: two-stage decision (rules first, classifier only for
//!   records that pass them)
//! - [`prevention`]: independent allow/block recommendation
//!
//! Consistency rule results are authoritative and are never overridden by the
//! classifier.

pub mod checker;
pub mod config;
pub mod engine;
pub mod prevention;

pub use checker::{check, CheckReport, CheckRule};
pub use config::PolicyConfig;
pub use engine::{Assessment, DecisionEngine};
pub use prevention::PreventionPolicy;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::checker::{check, CheckReport};
    pub use crate::config::PolicyConfig;
    pub use crate::engine::{Assessment, DecisionEngine};
    pub use crate::prevention::PreventionPolicy;
}
