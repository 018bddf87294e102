//! Notification enumerations and audience resolution.

use crate::types::DbId;

pub const KIND_GENERAL: &str = "general";
pub const KIND_PAYMENT: &str = "payment";
pub const KIND_PQRS: &str = "pqrs";
pub const KIND_RESERVATION: &str = "reservation";
pub const KIND_ASSEMBLY: &str = "assembly";
pub const KIND_MAINTENANCE: &str = "maintenance";
pub const KIND_SECURITY: &str = "security";

pub const VALID_KINDS: &[&str] = &[
    KIND_GENERAL,
    KIND_PAYMENT,
    KIND_PQRS,
    KIND_RESERVATION,
    KIND_ASSEMBLY,
    KIND_MAINTENANCE,
    KIND_SECURITY,
];

pub const PRIORITY_LOW: &str = "low";
pub const PRIORITY_NORMAL: &str = "normal";
pub const PRIORITY_HIGH: &str = "high";

pub const VALID_PRIORITIES: &[&str] = &[PRIORITY_LOW, PRIORITY_NORMAL, PRIORITY_HIGH];

pub const CHANNEL_IN_APP: &str = "in_app";
pub const CHANNEL_EMAIL: &str = "email";
pub const CHANNEL_SMS: &str = "sms";
pub const CHANNEL_PUSH: &str = "push";

pub const VALID_CHANNELS: &[&str] = &[CHANNEL_IN_APP, CHANNEL_EMAIL, CHANNEL_SMS, CHANNEL_PUSH];

pub const TARGET_USER: &str = "user";
pub const TARGET_TOWER: &str = "tower";
pub const TARGET_ALL: &str = "all";

pub const VALID_TARGETS: &[&str] = &[TARGET_USER, TARGET_TOWER, TARGET_ALL];

/// Who receives a sent notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    User(DbId),
    /// Every active resident of an apartment in the tower.
    Tower(DbId),
    /// Every active user.
    All,
}

/// Resolve the `target` field of a send request into an [`Audience`].
pub fn resolve_audience(
    target: &str,
    user_id: Option<DbId>,
    tower_id: Option<DbId>,
) -> Result<Audience, String> {
    match target {
        TARGET_USER => user_id
            .map(Audience::User)
            .ok_or_else(|| "target 'user' requires user_id".to_string()),
        TARGET_TOWER => tower_id
            .map(Audience::Tower)
            .ok_or_else(|| "target 'tower' requires tower_id".to_string()),
        TARGET_ALL => Ok(Audience::All),
        other => Err(format!(
            "Invalid target '{other}'. Must be one of: {}",
            VALID_TARGETS.join(", ")
        )),
    }
}
