use crate::{corrupt_row, map_sqlx_err};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ridesync_core::repository::{RequestRepository, StoreResult};
use ridesync_core::{ActiveRequest, NewRequest, RequestStatus, RideMode, VehicleClass};
use sqlx::{Pool, Sqlite};

const REQUEST_COLUMNS: &str = "id, passenger, pickup, destination, vehicle, price, status, \
     driver, expiry_time, ride_mode, current_passengers, max_passengers";

pub struct SqliteRequestRepository {
    pool: Pool<Sqlite>,
}

impl SqliteRequestRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct RequestRow {
    id: i64,
    passenger: String,
    pickup: String,
    destination: String,
    vehicle: String,
    price: i64,
    status: String,
    driver: Option<String>,
    expiry_time: i64,
    ride_mode: String,
    current_passengers: i64,
    max_passengers: i64,
}

impl RequestRow {
    fn into_request(self) -> StoreResult<ActiveRequest> {
        let vehicle: VehicleClass = self
            .vehicle
            .parse()
            .map_err(|e| corrupt_row("active_requests", e))?;
        let status: RequestStatus = self
            .status
            .parse()
            .map_err(|e| corrupt_row("active_requests", e))?;
        let ride_mode: RideMode = self
            .ride_mode
            .parse()
            .map_err(|e| corrupt_row("active_requests", e))?;
        let expires_at = DateTime::<Utc>::from_timestamp(self.expiry_time, 0)
            .ok_or_else(|| corrupt_row("active_requests", format!("expiry {}", self.expiry_time)))?;

        Ok(ActiveRequest {
            id: self.id,
            passenger: self.passenger,
            pickup: self.pickup,
            destination: self.destination,
            vehicle,
            price: self.price,
            status,
            driver: self.driver,
            expires_at,
            ride_mode,
            current_passengers: self.current_passengers as i32,
            max_passengers: self.max_passengers as i32,
        })
    }
}

fn rows_into_requests(rows: Vec<RequestRow>) -> StoreResult<Vec<ActiveRequest>> {
    rows.into_iter().map(RequestRow::into_request).collect()
}

#[async_trait]
impl RequestRepository for SqliteRequestRepository {
    async fn insert(&self, request: &NewRequest) -> StoreResult<ActiveRequest> {
        let result = sqlx::query(
            r#"
            INSERT INTO active_requests
                (passenger, pickup, destination, vehicle, price, status, driver,
                 expiry_time, ride_mode, current_passengers, max_passengers)
            VALUES (?1, ?2, ?3, ?4, ?5, 'pending', NULL, ?6, ?7, 1, ?8)
            "#,
        )
        .bind(&request.passenger)
        .bind(&request.pickup)
        .bind(&request.destination)
        .bind(request.vehicle.as_str())
        .bind(request.price)
        .bind(request.expires_at.timestamp())
        .bind(request.ride_mode.as_str())
        .bind(request.max_passengers)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(ActiveRequest {
            id: result.last_insert_rowid(),
            passenger: request.passenger.clone(),
            pickup: request.pickup.clone(),
            destination: request.destination.clone(),
            vehicle: request.vehicle,
            price: request.price,
            status: RequestStatus::Pending,
            driver: None,
            expires_at: request.expires_at,
            ride_mode: request.ride_mode,
            current_passengers: 1,
            max_passengers: request.max_passengers,
        })
    }

    async fn get(&self, id: i64) -> StoreResult<Option<ActiveRequest>> {
        let row = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {} FROM active_requests WHERE id = ?1",
            REQUEST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        row.map(RequestRow::into_request).transpose()
    }

    async fn active_for_passenger(&self, passenger: &str) -> StoreResult<Option<ActiveRequest>> {
        let row = sqlx::query_as::<_, RequestRow>(&format!(
            r#"
            SELECT {} FROM active_requests
            WHERE passenger = ?1 AND status IN ('pending', 'accepted')
            ORDER BY id DESC
            LIMIT 1
            "#,
            REQUEST_COLUMNS
        ))
        .bind(passenger)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        row.map(RequestRow::into_request).transpose()
    }

    async fn list_pending(
        &self,
        vehicle: VehicleClass,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<ActiveRequest>> {
        // One row per passenger (newest wins), skipping passengers a driver
        // already picked up elsewhere
        let rows = sqlx::query_as::<_, RequestRow>(&format!(
            r#"
            SELECT {} FROM active_requests
            WHERE id IN (
                SELECT MAX(id) FROM active_requests
                WHERE status = 'pending'
                  AND vehicle = ?1
                  AND expiry_time > ?2
                GROUP BY passenger
            )
            AND passenger NOT IN (
                SELECT passenger FROM active_requests WHERE status = 'accepted'
            )
            ORDER BY id ASC
            "#,
            REQUEST_COLUMNS
        ))
        .bind(vehicle.as_str())
        .bind(now.timestamp())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        rows_into_requests(rows)
    }

    async fn accept_if_pending(&self, id: i64, driver: &str) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE active_requests SET status = 'accepted', driver = ?2 \
             WHERE id = ?1 AND status = 'pending'",
        )
        .bind(id)
        .bind(driver)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn complete_if_accepted(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE active_requests SET status = 'completed' \
             WHERE id = ?1 AND status = 'accepted'",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn cancel_if_pending(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE active_requests SET status = 'cancelled' \
             WHERE id = ?1 AND status = 'pending'",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn shared_matches(&self, destination: &str) -> StoreResult<Vec<ActiveRequest>> {
        let rows = sqlx::query_as::<_, RequestRow>(&format!(
            r#"
            SELECT {} FROM active_requests
            WHERE destination = ?1
              AND ride_mode = 'Shared'
              AND status IN ('pending', 'accepted')
              AND current_passengers < max_passengers
            ORDER BY id ASC
            "#,
            REQUEST_COLUMNS
        ))
        .bind(destination)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        rows_into_requests(rows)
    }

    async fn accepted_for_driver(&self, driver: &str) -> StoreResult<Vec<ActiveRequest>> {
        let rows = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {} FROM active_requests \
             WHERE driver = ?1 AND status = 'accepted' ORDER BY id ASC",
            REQUEST_COLUMNS
        ))
        .bind(driver)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        rows_into_requests(rows)
    }

    async fn expire_pending(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let result = sqlx::query(
            "UPDATE active_requests SET status = 'cancelled' \
             WHERE status = 'pending' AND expiry_time <= ?1",
        )
        .bind(now.timestamp())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(result.rows_affected())
    }

    async fn cancel_duplicate_pending(&self) -> StoreResult<u64> {
        // Keep only the MAX(id) pending row per passenger
        let result = sqlx::query(
            r#"
            UPDATE active_requests SET status = 'cancelled'
            WHERE status = 'pending'
            AND id NOT IN (
                SELECT MAX(id) FROM active_requests
                WHERE status = 'pending'
                GROUP BY passenger
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(result.rows_affected())
    }
}
