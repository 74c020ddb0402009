// storage/mod.rs
// Incident and feedback persistence

pub mod feedback;
pub mod incidents;
pub mod migrations;
pub mod pool;

pub use feedback::{record_feedback, feedback_stats, FeedbackRecord, FeedbackStats, Judgment};
pub use incidents::{get_incident, insert_incident, recent_incidents};
pub use migrations::run_migrations;
pub use pool::init_db_pool_with_path;
