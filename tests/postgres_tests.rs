//! Storage adapter tests against a real PostgreSQL
//!
//! Run with: DATABASE_URL=postgres://... cargo test --test postgres_tests -- --ignored

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::Rng;
use sqlx::postgres::PgPoolOptions;

use studio_booking::{
    error::AppError,
    models::{BookingStatus, NewBooking},
    repository::{BookingStore, Repository},
};

async fn repository() -> Repository {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect(&url)
        .await
        .expect("Failed to connect to database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    Repository::new(pool)
}

/// A random hour far in the future so runs do not collide with each other
fn free_instant() -> DateTime<Utc> {
    let hours = rand::thread_rng().gen_range(0..24 * 365 * 50);
    Utc.with_ymd_and_hms(2100, 1, 1, 0, 0, 0).unwrap() + Duration::hours(hours)
}

fn new_booking(start_at: DateTime<Utc>, minutes: i64) -> NewBooking {
    NewBooking {
        start_at,
        end_at: start_at + Duration::minutes(minutes),
        client_name: "Anna".to_string(),
        client_phone: "+79991234567".to_string(),
        comment: None,
    }
}

async fn cleanup(repo: &Repository, start: DateTime<Utc>) {
    sqlx::query("DELETE FROM bookings WHERE start_at >= $1 AND start_at < $2")
        .bind(start - Duration::hours(1))
        .bind(start + Duration::hours(2))
        .execute(&repo.pool)
        .await
        .expect("cleanup failed");
}

#[tokio::test]
#[ignore]
async fn test_concurrent_inserts_admit_one() {
    let repo = repository().await;
    let start = free_instant();
    let first = new_booking(start, 60);
    let second = new_booking(start + Duration::minutes(30), 60);

    let (a, b) = tokio::join!(repo.bookings.create(&first), repo.bookings.create(&second));

    let conflicts = [&a, &b]
        .iter()
        .filter(|r| matches!(r, Err(AppError::Conflict(_))))
        .count();
    assert_eq!(conflicts, 1);
    assert!(a.is_ok() || b.is_ok());

    cleanup(&repo, start).await;
}

#[tokio::test]
#[ignore]
async fn test_cancel_frees_the_interval() {
    let repo = repository().await;
    let start = free_instant();

    let created = repo.bookings.create(&new_booking(start, 60)).await.unwrap();
    assert_eq!(created.status, BookingStatus::Active);

    let now = Utc::now();
    let cancelled = repo
        .bookings
        .cancel(created.id, now, Some("client called".to_string()))
        .await
        .unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    assert_eq!(cancelled.cancel_reason.as_deref(), Some("client called"));

    // Second cancel keeps the original stamps
    let again = repo
        .bookings
        .cancel(created.id, now + Duration::minutes(5), None)
        .await
        .unwrap();
    assert_eq!(again.cancelled_at, cancelled.cancelled_at);
    assert_eq!(again.cancel_reason, cancelled.cancel_reason);

    let rebooked = repo.bookings.create(&new_booking(start, 60)).await;
    assert!(rebooked.is_ok());

    let listed = repo
        .bookings
        .list_by_range(start, start + Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(listed.len(), 2);

    cleanup(&repo, start).await;
}

#[tokio::test]
#[ignore]
async fn test_missing_booking_is_not_found() {
    let repo = repository().await;

    let err = repo.bookings.get_by_id(uuid::Uuid::new_v4()).await.unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
    repo.bookings.ping().await.unwrap();
}
