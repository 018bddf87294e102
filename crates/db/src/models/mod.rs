//! Row models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A create DTO for inserts
//! - An update DTO (all `Option` fields) for patches
//!
//! JSONB columns are typed through [`sqlx::types::Json`].

pub mod notification;
pub mod parking;
pub mod payment;
pub mod pqrs;
pub mod property;
pub mod reservation;
pub mod role;
pub mod status;
pub mod survey;
pub mod user;
