pub mod daybyday_view;
pub mod load_state;
pub mod rule_form;
pub mod rule_modal;
pub mod rules_view;
