//! Postgres gateway against a throwaway container
//!
//! Run with `cargo test --test pg_gateway -- --ignored` on a machine with Docker.

use std::sync::Arc;

use chrono::{Duration, Utc};
use sqlx::PgPool;
use testcontainers::{ContainerAsync, ImageExt, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;

use eventmaster::{
    constants::roles,
    db::{
        self, PgRegistrationGateway,
        repositories::{
            EventFields, EventRepository, NewUser, UserRepository,
            event_repo::EVENT_HAS_REGISTRATIONS,
        },
    },
    error::AppError,
    services::{
        RegistrationEngine,
        registration_service::{Actor, CreateRegistration},
    },
    utils::ManualClock,
};

async fn start_database() -> (ContainerAsync<Postgres>, PgPool) {
    let container = Postgres::default()
        .with_user("eventmaster")
        .with_password("eventmaster_test")
        .with_db_name("eventmaster_test")
        .start()
        .await
        .expect("Failed to start PostgreSQL container");

    let host = container.get_host().await.unwrap();
    let port = container.get_host_port_ipv4(5432).await.unwrap();
    let url = format!("postgres://eventmaster:eventmaster_test@{host}:{port}/eventmaster_test");

    let pool = PgPool::connect(&url).await.expect("Failed to connect to test database");
    db::run_migrations(&pool).await.expect("Failed to run migrations");

    (container, pool)
}

async fn create_user(pool: &PgPool, n: usize, role: &str) -> i64 {
    let role = UserRepository::find_role_by_name(pool, role).await.unwrap().unwrap();
    UserRepository::create(
        pool,
        &NewUser {
            first_name: "Test".into(),
            last_name: format!("User{n}"),
            email: format!("user{n}@college.edu"),
            phone: None,
            telegram_id: None,
            password_hash: "not-a-real-hash".into(),
            role_id: role.id,
            group_id: None,
            is_active: true,
        },
    )
    .await
    .unwrap()
    .id
}

async fn create_event(pool: &PgPool, organizer_id: i64, max_participants: Option<i32>) -> i64 {
    let start = Utc::now() + Duration::days(2);
    EventRepository::create(
        pool,
        &EventFields {
            title: "Database night".into(),
            description: None,
            type_id: 1,
            start_date_time: start,
            end_date_time: start + Duration::hours(2),
            location: "Room 101".into(),
            organizer_id,
            max_participants,
            faculty_id: None,
            budget: None,
            image_url: None,
        },
    )
    .await
    .unwrap()
    .id
}

fn engine(pool: &PgPool) -> RegistrationEngine {
    RegistrationEngine::new(
        Arc::new(PgRegistrationGateway::new(pool.clone())),
        Arc::new(ManualClock::new(Utc::now())),
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires Docker"]
async fn test_concurrent_registrations_respect_capacity() {
    let (_container, pool) = start_database().await;
    let organizer = create_user(&pool, 0, roles::ORGANIZER).await;
    let event_id = create_event(&pool, organizer, Some(3)).await;

    let mut students = Vec::new();
    for n in 1..=12 {
        students.push(create_user(&pool, n, roles::STUDENT).await);
    }

    let engine = engine(&pool);
    let tasks = students.into_iter().map(|user_id| {
        let engine = engine.clone();
        tokio::spawn(async move {
            engine
                .create_registration(CreateRegistration {
                    event_id,
                    user_id,
                    status_id: None,
                })
                .await
        })
    });

    let mut admitted = 0;
    for result in futures::future::join_all(tasks).await {
        match result.unwrap() {
            Ok(_) => admitted += 1,
            Err(AppError::CapacityExceeded) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    assert_eq!(admitted, 3);

    let view = engine.list_event_registrations(event_id).await.unwrap();
    assert_eq!(view.registrations.len(), 3);
    assert_eq!(view.statistics.available_spots, Some(0));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_register_update_and_cancel_round_trip() {
    let (_container, pool) = start_database().await;
    let organizer = create_user(&pool, 0, roles::ORGANIZER).await;
    let student = create_user(&pool, 1, roles::STUDENT).await;
    let event_id = create_event(&pool, organizer, None).await;
    let engine = engine(&pool);

    let created = engine
        .create_registration(CreateRegistration {
            event_id,
            user_id: student,
            status_id: None,
        })
        .await
        .unwrap();
    assert_eq!(created.status.name, "pending");
    assert_eq!(created.event.id, event_id);
    assert_eq!(created.user.id, student);

    let duplicate = engine
        .create_registration(CreateRegistration {
            event_id,
            user_id: student,
            status_id: None,
        })
        .await;
    assert!(matches!(duplicate, Err(AppError::DuplicateRegistration)));

    let confirmed = engine
        .update_registration_status(created.registration.id, 2)
        .await
        .unwrap();
    assert_eq!(confirmed.status.name, "confirmed");

    let mine = engine.list_user_registrations(student).await.unwrap();
    assert_eq!(mine.statistics.confirmed, 1);
    assert_eq!(mine.statistics.upcoming_events, 1);

    let actor = Actor {
        user_id: student,
        role: roles::STUDENT.into(),
    };
    engine
        .cancel_registration(created.registration.id, Some(&actor))
        .await
        .unwrap();

    let missing = engine.get_registration(created.registration.id).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_deleting_an_event_with_a_late_registration_is_a_conflict() {
    let (_container, pool) = start_database().await;
    let organizer = create_user(&pool, 0, roles::ORGANIZER).await;
    let student = create_user(&pool, 1, roles::STUDENT).await;
    let event_id = create_event(&pool, organizer, Some(10)).await;

    // Registration arrives after the service's existence check would have passed
    engine(&pool)
        .create_registration(CreateRegistration {
            event_id,
            user_id: student,
            status_id: None,
        })
        .await
        .unwrap();

    match EventRepository::delete(&pool, event_id).await {
        Err(AppError::Conflict(message)) => assert_eq!(message, EVENT_HAS_REGISTRATIONS),
        other => panic!("expected conflict, got {other:?}"),
    }
    assert!(EventRepository::find_by_id(&pool, event_id).await.unwrap().is_some());
}
