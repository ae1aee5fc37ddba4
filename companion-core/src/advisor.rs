//! Rule-based advisors over already-fetched forecast data.
//!
//! Everything in here is pure: no I/O, no clock reads, no shared state.

pub mod activity;
pub mod best_times;
pub mod commute;
pub mod condition;
pub mod outfit;

pub use activity::suggest_activity;
pub use best_times::{Activity, best_times, suggest_best_times};
pub use commute::{CommuteAlert, commute_alert};
pub use condition::ConditionClass;
pub use outfit::suggest_outfit;
