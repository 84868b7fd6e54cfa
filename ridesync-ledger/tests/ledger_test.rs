use chrono::{Duration, TimeZone, Utc};
use ridesync_core::{RideMode, TripDetails, VehicleClass};
use ridesync_ledger::RideLedger;
use ridesync_store::{DbClient, SqliteLedgerRepository};
use std::sync::Arc;

async fn ledger(cap: u32) -> RideLedger {
    let db = DbClient::in_memory().await.unwrap();
    db.migrate().await.unwrap();
    RideLedger::new(Arc::new(SqliteLedgerRepository::new(db.pool)), cap)
}

fn trip(price: i64, sharing: bool) -> TripDetails {
    TripDetails {
        source: "LJU Campus".to_string(),
        destination: "Satellite".to_string(),
        vehicle: VehicleClass::Auto,
        sharing,
        price,
    }
}

#[tokio::test]
async fn history_is_newest_first() {
    let ledger = ledger(20).await;
    let base = Utc.with_ymd_and_hms(2025, 12, 1, 9, 0, 0).unwrap();

    for i in 0..3 {
        ledger
            .record_completion("p1", &trip(100 + i, false), base + Duration::minutes(i))
            .await
            .unwrap();
    }

    let rows = ledger.history("p1").await.unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].price, 102);
    assert_eq!(rows[2].price, 100);
}

#[tokio::test]
async fn twenty_first_ride_evicts_the_oldest() {
    let ledger = ledger(20).await;
    let base = Utc.with_ymd_and_hms(2025, 12, 1, 9, 0, 0).unwrap();

    for i in 0..20 {
        ledger
            .record_completion("p1", &trip(i, false), base + Duration::minutes(i))
            .await
            .unwrap();
    }
    assert_eq!(ledger.stats("p1").await.unwrap().count, 20);

    ledger
        .record_completion("p1", &trip(999, false), base + Duration::hours(1))
        .await
        .unwrap();

    let rows = ledger.history("p1").await.unwrap();
    assert_eq!(rows.len(), 20);
    assert_eq!(rows[0].price, 999);
    // the oldest pre-insert row (price 0) is the one that left
    assert!(rows.iter().all(|r| r.price != 0));
    assert!(rows.iter().any(|r| r.price == 1));
}

#[tokio::test]
async fn cap_is_per_owner() {
    let ledger = ledger(2).await;
    let base = Utc.with_ymd_and_hms(2025, 12, 1, 9, 0, 0).unwrap();

    for i in 0..3 {
        ledger
            .record_completion("p1", &trip(i, false), base + Duration::minutes(i))
            .await
            .unwrap();
    }
    ledger.record_completion("d1", &trip(50, false), base).await.unwrap();

    assert_eq!(ledger.history("p1").await.unwrap().len(), 2);
    assert_eq!(ledger.history("d1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn stats_average_is_zero_without_rides() {
    let ledger = ledger(20).await;
    let stats = ledger.stats("nobody").await.unwrap();
    assert_eq!(stats.count, 0);
    assert_eq!(stats.total_value, 0);
    assert_eq!(stats.average, 0.0);
}

#[tokio::test]
async fn stats_totals_and_average() {
    let ledger = ledger(20).await;
    let base = Utc.with_ymd_and_hms(2025, 12, 1, 9, 0, 0).unwrap();

    ledger.record_completion("p1", &trip(100, false), base).await.unwrap();
    ledger
        .record_completion("p1", &trip(50, true), base + Duration::minutes(1))
        .await
        .unwrap();

    let stats = ledger.stats("p1").await.unwrap();
    assert_eq!(stats.count, 2);
    assert_eq!(stats.total_value, 150);
    assert_eq!(stats.average, 75.0);
}

#[tokio::test]
async fn sharing_flag_sets_the_ride_mode() {
    let ledger = ledger(20).await;
    let base = Utc.with_ymd_and_hms(2025, 12, 1, 9, 0, 0).unwrap();

    ledger.record_completion("p1", &trip(80, true), base).await.unwrap();

    let rows = ledger.history("p1").await.unwrap();
    assert_eq!(rows[0].ride_mode, RideMode::Shared);
    assert_eq!(rows[0].status, "Completed");
}
