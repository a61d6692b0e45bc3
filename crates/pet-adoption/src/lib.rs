//! Pet adoption service: a searchable pet catalogue, user accounts, and the
//! adoption application workflow that keeps pet availability consistent with
//! outstanding applications.

pub mod adoption;
pub mod auth;
pub mod blocking;
pub mod catalog;
pub mod config;
pub mod error;
pub mod extract;
pub mod pagination;
pub mod seed;
pub mod store;
pub mod telemetry;
