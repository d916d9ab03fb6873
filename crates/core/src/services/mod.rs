pub mod chart_service;
pub mod refresh;
pub mod rule_service;
