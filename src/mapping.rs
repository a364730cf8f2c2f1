//! Controller configuration table: which physical control drives which
//! software control, per deck and per effect unit.

pub mod components;
pub mod model;
pub mod user_config;
pub mod validation;
