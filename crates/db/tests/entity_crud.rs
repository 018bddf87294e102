//! Integration tests for the repository layer against a real database.
//!
//! Covers the property hierarchy, users, roles, parking assignment, PQRS
//! edits, reservation overlap detection, notifications, payments and bulk
//! deletes.

use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use conjunto_core::pqrs::{apply_transition, compute_deadlines};
use conjunto_core::tracking::TrackingEntry;
use conjunto_db::models::notification::NewNotification;
use conjunto_db::models::payment::{CreatePayment, PaymentItem, SettlePayment};
use conjunto_db::models::pqrs::{CreatePqrsTicket, UpdatePqrsTicket};
use conjunto_db::models::property::{CreateApartment, CreateTower};
use conjunto_db::models::reservation::CreateReservation;
use conjunto_db::models::role::CreateRole;
use conjunto_db::models::status::UserStatus;
use conjunto_db::models::user::{CreateUser, Pet, UserProfile};
use conjunto_db::repositories::{
    ApartmentRepo, BulkRepo, NotificationRepo, ParkingRepo, PaymentRepo, PqrsRepo,
    ReservationRepo, RoleRepo, TowerRepo, UserRepo,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_tower(name: &str) -> CreateTower {
    CreateTower {
        name: name.to_string(),
        floors: 10,
        description: None,
    }
}

fn new_apartment(number: &str, floor: i32) -> CreateApartment {
    CreateApartment {
        number: number.to_string(),
        floor,
        area_m2: 72.5,
        bedrooms: Some(3),
        bathrooms: Some(2),
        occupancy: None,
        owner_id: None,
        monthly_fee: Some(350_000),
    }
}

fn profile(first: &str) -> UserProfile {
    UserProfile {
        first_name: first.to_string(),
        last_name: "Gómez".to_string(),
        document_type: "cc".to_string(),
        document_number: "10203040".to_string(),
        phone: "3001234567".to_string(),
        birth_date: None,
        emergency_contact: None,
    }
}

async fn new_user(pool: &PgPool, email: &str, apartment_id: Option<i64>) -> i64 {
    let role = RoleRepo::find_by_name(pool, "resident").await.unwrap().unwrap();
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            role_id: role.id,
            status_id: None,
            apartment_id,
            resident_type: Some("owner".to_string()),
            profile: profile("Ana"),
            pets: vec![],
        },
    )
    .await
    .unwrap()
    .id
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn booking(user_id: i64, start: NaiveTime, end: NaiveTime) -> CreateReservation {
    CreateReservation {
        area: "bbq".to_string(),
        user_id,
        apartment_id: None,
        date: NaiveDate::from_ymd_opt(2030, 5, 4).unwrap(),
        start_time: start,
        end_time: end,
        duration_minutes: (end - start).num_minutes() as i32,
        guests: 4,
        cost: 0,
        deposit: 0,
        notes: None,
        tracking: vec![TrackingEntry::new("pending", None, Some(user_id), Utc::now())],
    }
}

// ---------------------------------------------------------------------------
// Property hierarchy
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_tower_apartment_hierarchy(pool: PgPool) {
    let tower = TowerRepo::create(&pool, &new_tower("Torre A")).await.unwrap();
    assert!(tower.is_active);

    let apt = ApartmentRepo::create(&pool, tower.id, &new_apartment("101", 1))
        .await
        .unwrap();
    assert_eq!(apt.occupancy, "vacant");
    assert_eq!(apt.monthly_fee, 350_000);

    ApartmentRepo::create(&pool, tower.id, &new_apartment("804", 8))
        .await
        .unwrap();
    assert_eq!(
        TowerRepo::highest_used_floor(&pool, tower.id).await.unwrap(),
        Some(8)
    );

    let listed = ApartmentRepo::list_by_tower(&pool, tower.id, None, None)
        .await
        .unwrap();
    assert_eq!(listed.len(), 2);

    // Apartments cannot be reached through another tower.
    let other = TowerRepo::create(&pool, &new_tower("Torre B")).await.unwrap();
    assert!(ApartmentRepo::find_in_tower(&pool, other.id, apt.id)
        .await
        .unwrap()
        .is_none());

    // Deleting the tower cascades to its apartments.
    assert!(TowerRepo::delete(&pool, tower.id).await.unwrap());
    assert!(ApartmentRepo::find_by_id(&pool, apt.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_apartment_number_in_tower_fails(pool: PgPool) {
    let tower = TowerRepo::create(&pool, &new_tower("Torre A")).await.unwrap();
    ApartmentRepo::create(&pool, tower.id, &new_apartment("101", 1))
        .await
        .unwrap();

    let err = ApartmentRepo::create(&pool, tower.id, &new_apartment("101", 1))
        .await
        .unwrap_err();
    let db_err = err.as_database_error().unwrap();
    assert_eq!(db_err.code().as_deref(), Some("23505"));
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_user_profile_and_pets_round_trip(pool: PgPool) {
    let id = new_user(&pool, "ana@example.com", None).await;

    let user = UserRepo::find_by_email(&pool, "ana@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.id, id);
    assert_eq!(user.status_id, UserStatus::Active.id());
    assert_eq!(user.profile.0.first_name, "Ana");
    assert!(user.pets.0.is_empty());

    let pets = vec![Pet {
        name: "Luna".to_string(),
        species: "dog".to_string(),
        breed: None,
        vaccinated: true,
    }];
    let user = UserRepo::replace_pets(&pool, id, &pets).await.unwrap().unwrap();
    assert_eq!(user.pets.0, pets);

    let user = UserRepo::set_status(&pool, id, UserStatus::Suspended.id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(UserStatus::from_id(user.status_id), Some(UserStatus::Suspended));
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_email_fails(pool: PgPool) {
    new_user(&pool, "dup@example.com", None).await;
    let role = RoleRepo::find_by_name(&pool, "resident").await.unwrap().unwrap();
    let result = UserRepo::create(
        &pool,
        &CreateUser {
            email: "dup@example.com".to_string(),
            password_hash: "x".to_string(),
            role_id: role.id,
            status_id: None,
            apartment_id: None,
            resident_type: None,
            profile: profile("Otro"),
            pets: vec![],
        },
    )
    .await;
    assert!(result.is_err());
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_system_roles_cannot_be_deleted(pool: PgPool) {
    let admin = RoleRepo::find_by_name(&pool, "admin").await.unwrap().unwrap();
    assert!(!RoleRepo::delete(&pool, admin.id).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_role_with_users_cannot_be_deleted(pool: PgPool) {
    let role = RoleRepo::create(
        &pool,
        &CreateRole {
            name: "night_guard".to_string(),
            description: None,
            permission_ids: vec![],
        },
    )
    .await
    .unwrap();
    let user_id = new_user(&pool, "guard@example.com", None).await;
    sqlx::query("UPDATE users SET role_id = $2 WHERE id = $1")
        .bind(user_id)
        .bind(role.id)
        .execute(&pool)
        .await
        .unwrap();

    let err = RoleRepo::delete(&pool, role.id).await.unwrap_err();
    let code = err.as_database_error().and_then(|e| e.code()).unwrap();
    assert_eq!(code, "23503");

    UserRepo::delete(&pool, user_id).await.unwrap();
    assert!(RoleRepo::delete(&pool, role.id).await.unwrap());
    assert!(!RoleRepo::delete(&pool, role.id).await.unwrap());
}

// ---------------------------------------------------------------------------
// PQRS
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_resolved_ticket_rejects_field_updates(pool: PgPool) {
    let user_id = new_user(&pool, "ana@example.com", None).await;
    let now = Utc::now();
    let deadlines = compute_deadlines(now, "medium").unwrap();
    let ticket = PqrsRepo::create(
        &pool,
        &CreatePqrsTicket {
            ticket_number: "PQRS-2026-000001".to_string(),
            kind: "petition".to_string(),
            category: "maintenance".to_string(),
            priority: "medium".to_string(),
            subject: "Puerta del parqueadero".to_string(),
            description: "La puerta del sótano no cierra bien".to_string(),
            requester_id: user_id,
            apartment_id: None,
            response_due_at: deadlines.response_due_at,
            resolution_due_at: deadlines.resolution_due_at,
            tracking: vec![TrackingEntry::new("open", None, Some(user_id), now)],
            created_at: now,
        },
    )
    .await
    .unwrap();

    let rename = UpdatePqrsTicket {
        subject: Some("Puerta del sótano".to_string()),
        ..Default::default()
    };
    let updated = PqrsRepo::update(&pool, ticket.id, &rename).await.unwrap().unwrap();
    assert_eq!(updated.subject, "Puerta del sótano");

    let mut lifecycle = ticket.lifecycle();
    for (from, to) in [("open", "in_progress"), ("in_progress", "resolved")] {
        apply_transition(&mut lifecycle, from, to, Utc::now()).unwrap();
        let entry = TrackingEntry::new(to, None, None, Utc::now());
        PqrsRepo::transition(&pool, ticket.id, from, to, &lifecycle, &entry)
            .await
            .unwrap()
            .unwrap();
    }

    let late_edit = UpdatePqrsTicket {
        subject: Some("Otra cosa".to_string()),
        ..Default::default()
    };
    assert!(PqrsRepo::update(&pool, ticket.id, &late_edit).await.unwrap().is_none());
    let stored = PqrsRepo::find_by_id(&pool, ticket.id).await.unwrap().unwrap();
    assert_eq!(stored.subject, "Puerta del sótano");
}

// ---------------------------------------------------------------------------
// Parking
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_parking_assign_and_release(pool: PgPool) {
    use conjunto_db::models::parking::{CreateParkingSpot, Vehicle};

    let tower = TowerRepo::create(&pool, &new_tower("Torre A")).await.unwrap();
    let apt = ApartmentRepo::create(&pool, tower.id, &new_apartment("101", 1))
        .await
        .unwrap();
    let spot = ParkingRepo::create(
        &pool,
        &CreateParkingSpot {
            code: "P-001".to_string(),
            kind: "car".to_string(),
            status: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(spot.status, "available");

    let vehicle = Vehicle {
        plate: "ABC123".to_string(),
        brand: Some("Mazda".to_string()),
        model: None,
        color: None,
    };
    let assigned = ParkingRepo::assign(&pool, spot.id, apt.id, Some(&vehicle))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(assigned.status, "assigned");
    assert_eq!(assigned.apartment_id, Some(apt.id));
    assert!(assigned.assigned_at.is_some());

    // A second assignment finds no available spot.
    assert!(ParkingRepo::assign(&pool, spot.id, apt.id, None)
        .await
        .unwrap()
        .is_none());

    let released = ParkingRepo::release(&pool, spot.id).await.unwrap().unwrap();
    assert_eq!(released.status, "available");
    assert!(released.apartment_id.is_none());
    assert!(released.vehicle.is_none());
}

// ---------------------------------------------------------------------------
// Reservations
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_overlapping_reservation_is_refused(pool: PgPool) {
    let user_id = new_user(&pool, "ana@example.com", None).await;

    let first = ReservationRepo::create_checked(&pool, &booking(user_id, hm(12, 0), hm(15, 0)))
        .await
        .unwrap()
        .expect("first booking should succeed");
    assert_eq!(first.status, "pending");
    assert_eq!(first.tracking.0.len(), 1);

    let overlapping =
        ReservationRepo::create_checked(&pool, &booking(user_id, hm(14, 0), hm(16, 0)))
            .await
            .unwrap();
    assert!(overlapping.is_none());

    // Back-to-back slots do not overlap.
    let adjacent = ReservationRepo::create_checked(&pool, &booking(user_id, hm(15, 0), hm(17, 0)))
        .await
        .unwrap();
    assert!(adjacent.is_some());

    // A cancelled booking frees its slot.
    let entry = TrackingEntry::new("cancelled", Some("viaje".to_string()), Some(user_id), Utc::now());
    let cancelled =
        ReservationRepo::transition(&pool, first.id, "pending", "cancelled", Some("viaje"), &entry)
            .await
            .unwrap()
            .unwrap();
    assert_eq!(cancelled.cancellation_reason.as_deref(), Some("viaje"));
    assert_eq!(cancelled.tracking.0.len(), 2);

    let rebooked = ReservationRepo::create_checked(&pool, &booking(user_id, hm(12, 0), hm(14, 0)))
        .await
        .unwrap();
    assert!(rebooked.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_stale_transition_returns_none(pool: PgPool) {
    let user_id = new_user(&pool, "ana@example.com", None).await;
    let r = ReservationRepo::create_checked(&pool, &booking(user_id, hm(10, 0), hm(11, 0)))
        .await
        .unwrap()
        .unwrap();
    let entry = TrackingEntry::new("confirmed", None, None, Utc::now());

    let result = ReservationRepo::transition(&pool, r.id, "confirmed", "completed", None, &entry)
        .await
        .unwrap();
    assert!(result.is_none());
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_tower_notification_reaches_active_residents_only(pool: PgPool) {
    let tower = TowerRepo::create(&pool, &new_tower("Torre A")).await.unwrap();
    let apt = ApartmentRepo::create(&pool, tower.id, &new_apartment("101", 1))
        .await
        .unwrap();
    let active = new_user(&pool, "a@example.com", Some(apt.id)).await;
    let suspended = new_user(&pool, "b@example.com", Some(apt.id)).await;
    UserRepo::set_status(&pool, suspended, UserStatus::Suspended.id())
        .await
        .unwrap();
    new_user(&pool, "elsewhere@example.com", None).await;

    let n = NewNotification::about("maintenance", "Corte de agua", "Mañana 8am", "tower", tower.id);
    let sent = NotificationRepo::create_for_tower(&pool, tower.id, &n)
        .await
        .unwrap();
    assert_eq!(sent, 1);

    assert_eq!(NotificationRepo::unread_count(&pool, active).await.unwrap(), 1);
    let inbox = NotificationRepo::list_for_user(&pool, active, true, None, None)
        .await
        .unwrap();
    assert_eq!(inbox.len(), 1);

    let read = NotificationRepo::mark_read(&pool, inbox[0].id, active)
        .await
        .unwrap()
        .unwrap();
    assert!(read.is_read);
    assert!(read.read_at.is_some());
    assert_eq!(NotificationRepo::unread_count(&pool, active).await.unwrap(), 0);

    // Another user cannot touch it.
    assert!(!NotificationRepo::delete(&pool, inbox[0].id, suspended)
        .await
        .unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_expired_notifications_leave_the_inbox(pool: PgPool) {
    let user_id = new_user(&pool, "ana@example.com", None).await;
    let current = NewNotification::about("general", "Asamblea", "Sábado 9am", "survey", 1);
    let mut stale = NewNotification::about("general", "Corte de agua", "Ayer", "tower", 1);
    stale.expires_at = Some(Utc::now() - Duration::hours(1));
    NotificationRepo::create_for_user(&pool, user_id, &current).await.unwrap();
    let expired = NotificationRepo::create_for_user(&pool, user_id, &stale).await.unwrap();

    assert_eq!(NotificationRepo::unread_count(&pool, user_id).await.unwrap(), 1);
    let inbox = NotificationRepo::list_for_user(&pool, user_id, false, None, None)
        .await
        .unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].title, "Asamblea");

    assert_eq!(NotificationRepo::mark_all_read(&pool, user_id).await.unwrap(), 1);
    assert_eq!(NotificationRepo::unread_count(&pool, user_id).await.unwrap(), 0);
    assert!(NotificationRepo::delete(&pool, expired.id, user_id).await.unwrap());
}

// ---------------------------------------------------------------------------
// Payments
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_payment_settlement_and_statement(pool: PgPool) {
    let tower = TowerRepo::create(&pool, &new_tower("Torre A")).await.unwrap();
    let apt = ApartmentRepo::create(&pool, tower.id, &new_apartment("101", 1))
        .await
        .unwrap();

    let mut ids = Vec::new();
    for (month, amount) in [(1, 350_000), (2, 350_000)] {
        let seq = PaymentRepo::next_sequence(&pool).await.unwrap();
        let payment = PaymentRepo::create(
            &pool,
            &CreatePayment {
                receipt_number: conjunto_core::payment::format_receipt_number(2030, month, seq),
                apartment_id: apt.id,
                user_id: None,
                concept: "administration".to_string(),
                period: format!("2030-{month:02}"),
                items: vec![PaymentItem {
                    description: "Cuota de administración".to_string(),
                    amount,
                }],
                subtotal: amount,
                discount: 0,
                late_fee: 0,
                total: amount,
                due_date: NaiveDate::from_ymd_opt(2030, month, 10).unwrap(),
            },
        )
        .await
        .unwrap();
        ids.push(payment.id);
    }

    let overdue = PaymentRepo::mark_overdue(&pool, ids[0], 5_250, 355_250)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(overdue.status, "overdue");

    let paid = PaymentRepo::settle(
        &pool,
        ids[1],
        "pending",
        &SettlePayment {
            method: "pse".to_string(),
            reference: Some("PSE-991".to_string()),
            late_fee: 0,
            total: 350_000,
            paid_at: Utc::now(),
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(paid.status, "paid");

    let statement = PaymentRepo::statement(&pool, apt.id).await.unwrap();
    assert_eq!(statement.outstanding_count, 1);
    assert_eq!(statement.outstanding_total, 355_250);
    assert_eq!(statement.overdue_count, 1);
    assert_eq!(statement.paid_total, 350_000);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_inconsistent_total_is_rejected(pool: PgPool) {
    let tower = TowerRepo::create(&pool, &new_tower("Torre A")).await.unwrap();
    let apt = ApartmentRepo::create(&pool, tower.id, &new_apartment("101", 1))
        .await
        .unwrap();

    let err = PaymentRepo::create(
        &pool,
        &CreatePayment {
            receipt_number: "REC-203001-000001".to_string(),
            apartment_id: apt.id,
            user_id: None,
            concept: "fine".to_string(),
            period: "2030-01".to_string(),
            items: vec![PaymentItem {
                description: "Ruido".to_string(),
                amount: 100_000,
            }],
            subtotal: 100_000,
            discount: 0,
            late_fee: 0,
            total: 90_000,
            due_date: NaiveDate::from_ymd_opt(2030, 1, 10).unwrap(),
        },
    )
    .await
    .unwrap_err();
    let db_err = err.as_database_error().unwrap();
    assert_eq!(db_err.code().as_deref(), Some("23514"));
}

// ---------------------------------------------------------------------------
// Bulk
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_bulk_delete_removes_only_listed_rows(pool: PgPool) {
    let a = TowerRepo::create(&pool, &new_tower("A")).await.unwrap();
    let b = TowerRepo::create(&pool, &new_tower("B")).await.unwrap();
    let c = TowerRepo::create(&pool, &new_tower("C")).await.unwrap();

    let table = conjunto_core::bulk::table_for_entity("towers").unwrap();
    let deleted = BulkRepo::delete_many(&pool, table, &[a.id, b.id, 999_999])
        .await
        .unwrap();
    assert_eq!(deleted, 2);
    assert!(TowerRepo::find_by_id(&pool, c.id).await.unwrap().is_some());
}
