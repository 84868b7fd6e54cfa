use crate::{corrupt_row, map_sqlx_err};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ridesync_core::repository::{LedgerRepository, StoreResult};
use ridesync_core::{CompletedRide, LedgerStats, NewCompletedRide, RideMode, VehicleClass};
use sqlx::{Pool, Sqlite};

pub struct SqliteLedgerRepository {
    pool: Pool<Sqlite>,
}

impl SqliteLedgerRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct RideRow {
    id: i64,
    owner: String,
    source: String,
    destination: String,
    vehicle: String,
    ride_mode: String,
    price: i64,
    status: String,
    recorded_at: i64,
}

impl RideRow {
    fn into_ride(self) -> StoreResult<CompletedRide> {
        let vehicle: VehicleClass = self
            .vehicle
            .parse()
            .map_err(|e| corrupt_row("completed_rides", e))?;
        let ride_mode: RideMode = self
            .ride_mode
            .parse()
            .map_err(|e| corrupt_row("completed_rides", e))?;
        let recorded_at = DateTime::<Utc>::from_timestamp(self.recorded_at, 0).ok_or_else(|| {
            corrupt_row("completed_rides", format!("timestamp {}", self.recorded_at))
        })?;

        Ok(CompletedRide {
            id: self.id,
            owner: self.owner,
            source: self.source,
            destination: self.destination,
            vehicle,
            ride_mode,
            price: self.price,
            status: self.status,
            recorded_at,
        })
    }
}

#[async_trait]
impl LedgerRepository for SqliteLedgerRepository {
    async fn insert_capped(&self, ride: &NewCompletedRide, cap: u32) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM completed_rides WHERE owner = ?1")
                .bind(&ride.owner)
                .fetch_one(&mut *tx)
                .await
                .map_err(map_sqlx_err)?;

        // Sliding window: at the cap, the single oldest row makes room
        if count >= cap as i64 {
            sqlx::query(
                r#"
                DELETE FROM completed_rides
                WHERE id = (
                    SELECT id FROM completed_rides
                    WHERE owner = ?1
                    ORDER BY recorded_at ASC, id ASC
                    LIMIT 1
                )
                "#,
            )
            .bind(&ride.owner)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;
        }

        sqlx::query(
            r#"
            INSERT INTO completed_rides
                (owner, source, destination, vehicle, ride_mode, price, status, recorded_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'Completed', ?7)
            "#,
        )
        .bind(&ride.owner)
        .bind(&ride.source)
        .bind(&ride.destination)
        .bind(ride.vehicle.as_str())
        .bind(ride.ride_mode.as_str())
        .bind(ride.price)
        .bind(ride.recorded_at.timestamp())
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_err)?;

        tx.commit().await.map_err(map_sqlx_err)
    }

    async fn history(&self, owner: &str) -> StoreResult<Vec<CompletedRide>> {
        let rows = sqlx::query_as::<_, RideRow>(
            "SELECT id, owner, source, destination, vehicle, ride_mode, price, status, recorded_at \
             FROM completed_rides WHERE owner = ?1 ORDER BY recorded_at DESC, id DESC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        rows.into_iter().map(RideRow::into_ride).collect()
    }

    async fn stats(&self, owner: &str) -> StoreResult<LedgerStats> {
        let (count, total_value): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(price), 0) FROM completed_rides WHERE owner = ?1",
        )
        .bind(owner)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        let average = if count > 0 {
            total_value as f64 / count as f64
        } else {
            0.0
        };

        Ok(LedgerStats {
            count,
            total_value,
            average,
        })
    }
}
