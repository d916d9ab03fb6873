pub mod chart;
pub mod daybyday;
pub mod recurrence;
pub mod rule;
pub mod settings;
pub mod user;

mod de;
