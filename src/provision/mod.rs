pub mod deprovision;
pub mod exists;
pub mod logging_condition;
pub mod orchestrator;
pub mod owasp;

pub use deprovision::{delete_logging, deprovision, DeprovisionReport};
pub use exists::{name_exists, name_exists_exact, Named};
pub use logging_condition::{compose_logging_condition, AttachedConditions, LoggingFeatures};
pub use orchestrator::provision;
pub use owasp::upsert_owasp;
