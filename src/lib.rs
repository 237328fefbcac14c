//! Assessment recommendation wizard.
//!
//! Hosts one wizard view-model per UI session: a hiring query is sent to an external
//! recommendation backend, and the returned assessments are filtered, sorted, compared
//! and favorited client-side. The HTTP layer in [`api`] exposes every view-model
//! operation; [`services::wizard::Wizard`] holds the state and transitions.
pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
