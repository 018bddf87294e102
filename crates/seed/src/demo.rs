//! Demo data for a three-tower complex, created through the repositories.

use anyhow::{anyhow, Context};
use chrono::{Datelike, Duration, Months, NaiveTime, Utc};
use conjunto_api::auth::password::hash_password;
use conjunto_core::notification::{
    CHANNEL_IN_APP, KIND_ASSEMBLY, KIND_GENERAL, KIND_MAINTENANCE, KIND_RESERVATION, PRIORITY_HIGH,
    PRIORITY_NORMAL,
};
use conjunto_core::payment::{
    compute_totals, format_receipt_number, late_fee, months_overdue, CONCEPT_ADMINISTRATION,
    METHOD_PSE, STATUS_PENDING as PAYMENT_PENDING,
};
use conjunto_core::pqrs::{
    apply_transition, compute_deadlines, format_ticket_number, Lifecycle, STATUS_IN_PROGRESS,
    STATUS_OPEN, STATUS_RESOLVED,
};
use conjunto_core::property::{OCCUPANCY_OWNER_OCCUPIED, OCCUPANCY_RENTED, OCCUPANCY_VACANT};
use conjunto_core::reservation::{quote, AREA_SOCIAL_HALL, STATUS_CONFIRMED, STATUS_PENDING};
use conjunto_core::roles::{ROLE_ADMIN, ROLE_GUARD, ROLE_MANAGER, ROLE_RESIDENT};
use conjunto_core::survey::{
    Answers, Question, QUESTION_RATING, QUESTION_SINGLE_CHOICE, QUESTION_TEXT, STATUS_ACTIVE,
    STATUS_DRAFT,
};
use conjunto_core::tracking::TrackingEntry;
use conjunto_core::types::{Cop, DbId, Timestamp};
use conjunto_core::user::{RESIDENT_OWNER, RESIDENT_STAFF, RESIDENT_TENANT};
use conjunto_db::models::notification::NewNotification;
use conjunto_db::models::parking::{CreateParkingSpot, Vehicle};
use conjunto_db::models::payment::{CreatePayment, PaymentItem, SettlePayment};
use conjunto_db::models::pqrs::CreatePqrsTicket;
use conjunto_db::models::property::{CreateApartment, CreateTower};
use conjunto_db::models::reservation::CreateReservation;
use conjunto_db::models::survey::CreateSurvey;
use conjunto_db::models::user::{CreateUser, EmergencyContact, Pet, UserProfile};
use conjunto_db::repositories::{
    ApartmentRepo, NotificationRepo, ParkingRepo, PaymentRepo, PqrsRepo, ReservationRepo,
    RoleRepo, SurveyRepo, TowerRepo, UserRepo,
};
use conjunto_db::DbPool;
use serde_json::json;

const TOWERS: &[&str] = &["Torre A", "Torre B", "Torre C"];
const FLOORS: i32 = 6;
const UNITS_PER_FLOOR: i32 = 2;
const DEMO_PASSWORD: &str = "Residente-2026!";

/// Counts reported at the end of the run.
#[derive(Debug, Default)]
pub struct Summary {
    pub towers: usize,
    pub apartments: usize,
    pub users: usize,
    pub parking_spots: usize,
    pub tickets: usize,
    pub payments: usize,
}

struct Resident {
    id: DbId,
    apartment_id: DbId,
}

pub async fn seed(pool: &DbPool, admin_email: &str, admin_password: &str) -> anyhow::Result<Summary> {
    let mut summary = Summary::default();
    let now = Utc::now();

    // -- People who run the complex --------------------------------------

    let admin_id = create_user(
        pool,
        NewPerson {
            email: admin_email,
            password: admin_password,
            role: ROLE_ADMIN,
            first_name: "Administración",
            last_name: "Conjunto",
            document: "900123456",
            apartment_id: None,
            resident_type: Some(RESIDENT_STAFF),
            pets: Vec::new(),
        },
    )
    .await?;
    create_user(
        pool,
        NewPerson {
            email: "gerencia@conjunto.local",
            password: DEMO_PASSWORD,
            role: ROLE_MANAGER,
            first_name: "Marta",
            last_name: "Ospina",
            document: "43111222",
            apartment_id: None,
            resident_type: Some(RESIDENT_STAFF),
            pets: Vec::new(),
        },
    )
    .await?;
    create_user(
        pool,
        NewPerson {
            email: "porteria@conjunto.local",
            password: DEMO_PASSWORD,
            role: ROLE_GUARD,
            first_name: "Jorge",
            last_name: "Cárdenas",
            document: "71333444",
            apartment_id: None,
            resident_type: Some(RESIDENT_STAFF),
            pets: Vec::new(),
        },
    )
    .await?;
    summary.users += 3;

    // -- Towers, apartments and parking ----------------------------------

    let mut apartments = Vec::new();
    for (t, name) in TOWERS.iter().enumerate() {
        let tower = TowerRepo::create(
            pool,
            &CreateTower {
                name: name.to_string(),
                floors: FLOORS,
                description: Some(format!("{name}, {FLOORS} pisos")),
            },
        )
        .await?;
        summary.towers += 1;

        for floor in 1..=FLOORS {
            for unit in 1..=UNITS_PER_FLOOR {
                let occupancy = match (floor + unit) % 3 {
                    0 => OCCUPANCY_VACANT,
                    1 => OCCUPANCY_OWNER_OCCUPIED,
                    _ => OCCUPANCY_RENTED,
                };
                let area_m2 = if unit == 1 { 68.5 } else { 82.0 };
                let apartment = ApartmentRepo::create(
                    pool,
                    tower.id,
                    &CreateApartment {
                        number: format!("{floor}0{unit}"),
                        floor,
                        area_m2,
                        bedrooms: Some(if unit == 1 { 2 } else { 3 }),
                        bathrooms: Some(2),
                        occupancy: Some(occupancy.to_string()),
                        owner_id: None,
                        monthly_fee: Some(monthly_fee(area_m2)),
                    },
                )
                .await?;
                apartments.push((apartment, occupancy));
                summary.apartments += 1;
            }
        }

        let prefix = char::from(b'A' + u8::try_from(t)?);
        for n in 1..=8 {
            let kind = match n {
                7 => "motorcycle",
                8 => "visitor",
                _ => "car",
            };
            ParkingRepo::create(
                pool,
                &CreateParkingSpot {
                    code: format!("{prefix}-{n:02}"),
                    kind: kind.to_string(),
                    status: None,
                },
            )
            .await?;
            summary.parking_spots += 1;
        }
    }

    // -- Residents -------------------------------------------------------

    let occupied: Vec<_> = apartments
        .iter()
        .filter(|(_, occupancy)| *occupancy != OCCUPANCY_VACANT)
        .map(|(apartment, occupancy)| (apartment.id, *occupancy))
        .collect();
    let people = [
        ("ana.perez", "Ana", "Pérez", vec![pet("Lulú", "dog", Some("French poodle"))]),
        ("carlos.gomez", "Carlos", "Gómez", Vec::new()),
        ("diana.rojas", "Diana", "Rojas", vec![pet("Michi", "cat", None)]),
        ("felipe.mora", "Felipe", "Mora", Vec::new()),
        ("laura.silva", "Laura", "Silva", vec![pet("Toby", "dog", Some("Beagle")), pet("Kiwi", "bird", None)]),
        ("andres.castro", "Andrés", "Castro", Vec::new()),
    ];

    let mut residents = Vec::new();
    for (i, (handle, first, last, pets)) in people.into_iter().enumerate() {
        let (apartment_id, occupancy) = *occupied
            .get(i * 3)
            .ok_or_else(|| anyhow!("not enough occupied apartments"))?;
        let resident_type = if occupancy == OCCUPANCY_RENTED {
            RESIDENT_TENANT
        } else {
            RESIDENT_OWNER
        };
        let email = format!("{handle}@correo.test");
        let id = create_user(
            pool,
            NewPerson {
                email: &email,
                password: DEMO_PASSWORD,
                role: ROLE_RESIDENT,
                first_name: first,
                last_name: last,
                document: &format!("10{:08}", 20_000_000 + i * 1_111),
                apartment_id: Some(apartment_id),
                resident_type: Some(resident_type),
                pets,
            },
        )
        .await?;
        residents.push(Resident { id, apartment_id });
        summary.users += 1;
    }

    // Two residents park their cars in A-01 and A-02.
    let spots = ParkingRepo::list(pool, &Default::default(), Some(2), Some(0)).await?;
    for (spot, (resident, plate)) in spots.iter().zip(residents.iter().zip(["KXR482", "BTN19F"])) {
        let vehicle = Vehicle {
            plate: plate.to_string(),
            brand: Some("Mazda".to_string()),
            model: Some("CX-30".to_string()),
            color: Some("Gris".to_string()),
        };
        ParkingRepo::assign(pool, spot.id, resident.apartment_id, Some(&vehicle)).await?;
    }

    // -- PQRS tickets ----------------------------------------------------

    let tickets: [(&str, &str, &str, &str, &str, &[&str]); 4] = [
        (
            "complaint",
            "noise",
            "high",
            "Ruido después de las 10pm",
            "Los fines de semana hay música a alto volumen en el piso superior hasta la madrugada.",
            &[],
        ),
        (
            "petition",
            "maintenance",
            "medium",
            "Filtración en el parqueadero",
            "Hay una filtración de agua en el sótano, cerca de los puestos A-03 y A-04.",
            &[STATUS_IN_PROGRESS],
        ),
        (
            "claim",
            "administration",
            "low",
            "Cobro duplicado de administración",
            "En el estado de cuenta aparece dos veces la cuota del mes anterior.",
            &[STATUS_IN_PROGRESS, STATUS_RESOLVED],
        ),
        (
            "suggestion",
            "common_areas",
            "low",
            "Horario extendido del gimnasio",
            "Proponemos abrir el gimnasio desde las 5am entre semana.",
            &[],
        ),
    ];

    for (i, (kind, category, priority, subject, description, path)) in tickets.into_iter().enumerate() {
        let requester = &residents[i % residents.len()];
        let filed_at = now - Duration::hours(30 - 6 * i64::try_from(i)?);
        let deadlines = compute_deadlines(filed_at, priority).map_err(|e| anyhow!(e))?;
        let sequence = PqrsRepo::next_sequence(pool).await?;

        let ticket = PqrsRepo::create(
            pool,
            &CreatePqrsTicket {
                ticket_number: format_ticket_number(filed_at.year(), sequence),
                kind: kind.to_string(),
                category: category.to_string(),
                priority: priority.to_string(),
                subject: subject.to_string(),
                description: description.to_string(),
                requester_id: requester.id,
                apartment_id: Some(requester.apartment_id),
                response_due_at: deadlines.response_due_at,
                resolution_due_at: deadlines.resolution_due_at,
                tracking: vec![TrackingEntry::new(
                    STATUS_OPEN,
                    Some("Ticket filed".to_string()),
                    Some(requester.id),
                    filed_at,
                )],
                created_at: filed_at,
            },
        )
        .await?;
        summary.tickets += 1;

        let mut status = ticket.status.clone();
        let mut lifecycle = Lifecycle::default();
        for (step, to) in path.iter().enumerate() {
            let at = filed_at + Duration::hours(2 * (i64::try_from(step)? + 1));
            apply_transition(&mut lifecycle, &status, to, at).map_err(|e| anyhow!(e))?;
            let entry = TrackingEntry::new(to, Some("Atendido por administración".to_string()), Some(admin_id), at);
            PqrsRepo::transition(pool, ticket.id, &status, to, &lifecycle, &entry)
                .await?
                .context("ticket changed while seeding")?;
            status = to.to_string();
        }
        if status == STATUS_RESOLVED {
            PqrsRepo::rate(pool, ticket.id, 4).await?;
        }
    }

    // -- Reservation -----------------------------------------------------

    let host = &residents[0];
    let date = (now + Duration::days(10)).date_naive();
    let start = NaiveTime::from_hms_opt(15, 0, 0).context("valid time")?;
    let end = NaiveTime::from_hms_opt(20, 0, 0).context("valid time")?;
    let q = quote(AREA_SOCIAL_HALL, date, start, end, 35, now.date_naive()).map_err(|e| anyhow!(e))?;
    let reservation = ReservationRepo::create_checked(
        pool,
        &CreateReservation {
            area: AREA_SOCIAL_HALL.to_string(),
            user_id: host.id,
            apartment_id: Some(host.apartment_id),
            date,
            start_time: start,
            end_time: end,
            duration_minutes: q.duration_minutes,
            guests: 35,
            cost: q.cost,
            deposit: q.deposit,
            notes: Some("Cumpleaños".to_string()),
            tracking: vec![TrackingEntry::new(STATUS_PENDING, None, Some(host.id), now)],
        },
    )
    .await?
    .context("demo reservation slot is taken")?;
    let entry = TrackingEntry::new(STATUS_CONFIRMED, None, Some(admin_id), now);
    ReservationRepo::transition(pool, reservation.id, STATUS_PENDING, STATUS_CONFIRMED, None, &entry).await?;

    // -- Notifications ---------------------------------------------------

    NotificationRepo::create_for_all(
        pool,
        &NewNotification {
            title: "Bienvenidos al portal del conjunto".to_string(),
            message: "Desde aquí pueden radicar PQRS, reservar zonas comunes y consultar pagos."
                .to_string(),
            kind: KIND_GENERAL.to_string(),
            priority: PRIORITY_NORMAL.to_string(),
            channel: CHANNEL_IN_APP.to_string(),
            related_entity_type: None,
            related_entity_id: None,
            expires_at: None,
        },
    )
    .await?;
    NotificationRepo::create_for_all(
        pool,
        &NewNotification {
            title: "Mantenimiento de ascensores".to_string(),
            message: "El sábado de 8am a 12m los ascensores estarán fuera de servicio.".to_string(),
            kind: KIND_MAINTENANCE.to_string(),
            priority: PRIORITY_HIGH.to_string(),
            channel: CHANNEL_IN_APP.to_string(),
            related_entity_type: None,
            related_entity_id: None,
            expires_at: Some(now + Duration::days(7)),
        },
    )
    .await?;
    NotificationRepo::create_for_user(
        pool,
        host.id,
        &NewNotification::about(
            KIND_RESERVATION,
            "Reserva confirmada",
            format!("Su reserva del salón social para el {date} fue confirmada."),
            "reservation",
            reservation.id,
        ),
    )
    .await?;

    // -- Survey ----------------------------------------------------------

    let survey = SurveyRepo::create(
        pool,
        &CreateSurvey {
            title: "Prioridades de inversión 2027".to_string(),
            description: Some("Ayúdenos a decidir en qué invertir el fondo de imprevistos.".to_string()),
            starts_at: now - Duration::days(1),
            ends_at: now + Duration::days(14),
            is_anonymous: Some(false),
            questions: survey_questions(),
        },
        admin_id,
    )
    .await?;
    SurveyRepo::set_status(pool, survey.id, STATUS_DRAFT, STATUS_ACTIVE).await?;
    let answers: Answers = [
        ("priority".to_string(), json!("Cámaras de seguridad")),
        ("satisfaction".to_string(), json!(4)),
        ("comments".to_string(), json!("Mejorar la iluminación del parqueadero.")),
    ]
    .into_iter()
    .collect();
    SurveyRepo::add_response(pool, survey.id, residents[1].id, &answers).await?;
    NotificationRepo::create_for_all(
        pool,
        &NewNotification::about(
            KIND_ASSEMBLY,
            "Nueva encuesta",
            "Participe en la encuesta de prioridades de inversión.",
            "survey",
            survey.id,
        ),
    )
    .await?;

    // -- Payments --------------------------------------------------------

    let today = now.date_naive();
    let last_month = today
        .checked_sub_months(Months::new(1))
        .context("date out of range")?;
    for (i, resident) in residents.iter().enumerate() {
        let fee = match ApartmentRepo::find_by_id(pool, resident.apartment_id).await? {
            Some(apartment) => apartment.monthly_fee,
            None => continue,
        };

        // Current month, pending for everyone.
        create_payment(pool, resident, fee, today.year(), today.month(), today.with_day(10).context("day 10")?)
            .await?;
        summary.payments += 1;

        // Last month: even residents paid, odd ones are overdue.
        let due = last_month.with_day(10).context("day 10")?;
        let previous = create_payment(pool, resident, fee, last_month.year(), last_month.month(), due).await?;
        summary.payments += 1;
        let months = months_overdue(due, today);
        let fee_due = late_fee(previous.fee_base(), months).map_err(|e| anyhow!(e))?;
        if i % 2 == 0 {
            PaymentRepo::settle(
                pool,
                previous.id,
                PAYMENT_PENDING,
                &SettlePayment {
                    method: METHOD_PSE.to_string(),
                    reference: Some(format!("PSE-{:06}", 410_000 + i)),
                    late_fee: 0,
                    total: previous.fee_base(),
                    paid_at: at_noon(due - Duration::days(2))?,
                },
            )
            .await?;
        } else if months > 0 {
            PaymentRepo::mark_overdue(pool, previous.id, fee_due, previous.fee_base() + fee_due).await?;
        }
    }

    Ok(summary)
}

struct NewPerson<'a> {
    email: &'a str,
    password: &'a str,
    role: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    document: &'a str,
    apartment_id: Option<DbId>,
    resident_type: Option<&'a str>,
    pets: Vec<Pet>,
}

async fn create_user(pool: &DbPool, person: NewPerson<'_>) -> anyhow::Result<DbId> {
    let role = RoleRepo::find_by_name(pool, person.role)
        .await?
        .with_context(|| format!("role '{}' is not seeded", person.role))?;
    let password_hash =
        hash_password(person.password).map_err(|e| anyhow!("hashing password: {e}"))?;

    let user = UserRepo::create(
        pool,
        &CreateUser {
            email: person.email.to_string(),
            password_hash,
            role_id: role.id,
            status_id: None,
            apartment_id: person.apartment_id,
            resident_type: person.resident_type.map(str::to_string),
            profile: UserProfile {
                first_name: person.first_name.to_string(),
                last_name: person.last_name.to_string(),
                document_type: "CC".to_string(),
                document_number: person.document.to_string(),
                phone: "+57 300 123 4567".to_string(),
                birth_date: None,
                emergency_contact: person.apartment_id.map(|_| EmergencyContact {
                    name: "Contacto familiar".to_string(),
                    phone: "+57 311 765 4321".to_string(),
                    relationship: Some("family".to_string()),
                }),
            },
            pets: person.pets,
        },
    )
    .await?;
    tracing::debug!(user_id = user.id, email = %user.email, role = person.role, "User created");
    Ok(user.id)
}

async fn create_payment(
    pool: &DbPool,
    resident: &Resident,
    fee: Cop,
    year: i32,
    month: u32,
    due_date: chrono::NaiveDate,
) -> anyhow::Result<conjunto_db::models::payment::Payment> {
    let items = vec![
        PaymentItem {
            description: "Cuota de administración".to_string(),
            amount: fee,
        },
        PaymentItem {
            description: "Fondo de imprevistos".to_string(),
            amount: fee / 100,
        },
    ];
    let amounts: Vec<Cop> = items.iter().map(|i| i.amount).collect();
    let totals = compute_totals(&amounts, 0, 0).map_err(|e| anyhow!(e))?;
    let sequence = PaymentRepo::next_sequence(pool).await?;

    Ok(PaymentRepo::create(
        pool,
        &CreatePayment {
            receipt_number: format_receipt_number(year, month, sequence),
            apartment_id: resident.apartment_id,
            user_id: Some(resident.id),
            concept: CONCEPT_ADMINISTRATION.to_string(),
            period: format!("{year}-{month:02}"),
            items,
            subtotal: totals.subtotal,
            discount: totals.discount,
            late_fee: totals.late_fee,
            total: totals.total,
            due_date,
        },
    )
    .await?)
}

/// Monthly administration fee: 4,800 COP per square metre, rounded to thousands.
fn monthly_fee(area_m2: f64) -> Cop {
    ((area_m2 * 4.8).round() as Cop) * 1_000
}

fn at_noon(date: chrono::NaiveDate) -> anyhow::Result<Timestamp> {
    Ok(date
        .and_hms_opt(12, 0, 0)
        .context("valid time")?
        .and_utc())
}

fn pet(name: &str, species: &str, breed: Option<&str>) -> Pet {
    Pet {
        name: name.to_string(),
        species: species.to_string(),
        breed: breed.map(str::to_string),
        vaccinated: true,
    }
}

fn survey_questions() -> Vec<Question> {
    vec![
        Question {
            key: "priority".to_string(),
            text: "¿Cuál debería ser la prioridad de inversión?".to_string(),
            kind: QUESTION_SINGLE_CHOICE.to_string(),
            options: vec![
                "Cámaras de seguridad".to_string(),
                "Remodelación del salón social".to_string(),
                "Zona infantil".to_string(),
            ],
            required: true,
        },
        Question {
            key: "satisfaction".to_string(),
            text: "Califique la administración actual".to_string(),
            kind: QUESTION_RATING.to_string(),
            options: Vec::new(),
            required: true,
        },
        Question {
            key: "comments".to_string(),
            text: "Comentarios adicionales".to_string(),
            kind: QUESTION_TEXT.to_string(),
            options: Vec::new(),
            required: false,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use conjunto_core::survey::{validate_answers, validate_questions};

    #[test]
    fn fee_scales_with_area() {
        assert_eq!(monthly_fee(68.5), 329_000);
        assert_eq!(monthly_fee(82.0), 394_000);
    }

    #[test]
    fn demo_survey_is_valid() {
        let questions = survey_questions();
        assert!(validate_questions(&questions).is_ok());

        let answers: Answers = [
            ("priority".to_string(), json!("Zona infantil")),
            ("satisfaction".to_string(), json!(5)),
        ]
        .into_iter()
        .collect();
        assert!(validate_answers(&questions, &answers).is_ok());
    }
}
