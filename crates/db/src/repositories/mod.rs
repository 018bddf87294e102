//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. List methods take the raw
//! `limit`/`offset` from the request and clamp them here.

pub mod apartment_repo;
pub mod bulk_repo;
pub mod notification_repo;
pub mod parking_repo;
pub mod payment_repo;
pub mod pqrs_repo;
pub mod reservation_repo;
pub mod role_repo;
pub mod survey_repo;
pub mod tower_repo;
pub mod user_repo;
pub mod user_status_repo;

pub use apartment_repo::ApartmentRepo;
pub use bulk_repo::BulkRepo;
pub use notification_repo::NotificationRepo;
pub use parking_repo::ParkingRepo;
pub use payment_repo::PaymentRepo;
pub use pqrs_repo::PqrsRepo;
pub use reservation_repo::ReservationRepo;
pub use role_repo::{ModuleRepo, PermissionRepo, RoleRepo};
pub use survey_repo::SurveyRepo;
pub use tower_repo::TowerRepo;
pub use user_repo::UserRepo;
pub use user_status_repo::UserStatusRepo;
