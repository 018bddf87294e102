//! Domain rules for the residential-complex backend.
//!
//! This crate has no I/O and no internal dependencies so that the
//! repository layer, the HTTP layer and the seed program can all share the
//! same enumerations, state machines and derived-field calculations.

pub mod bulk;
pub mod error;
pub mod notification;
pub mod pagination;
pub mod parking;
pub mod payment;
pub mod pqrs;
pub mod property;
pub mod reservation;
pub mod roles;
pub mod survey;
pub mod tracking;
pub mod types;
pub mod user;
pub mod validation;
