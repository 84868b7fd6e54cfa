use ridesync_core::VehicleClass;
use serde::{Deserialize, Serialize};

/// Base fee plus per-km rate for one vehicle class
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FareRate {
    pub base: f64,
    pub per_km: f64,
}

/// Fare schedule for the whole fleet.
///
/// The car floor keeps car fares at least `car_floor_margin` above the auto
/// fare for the same distance; the shared discount applies after the floor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FareTable {
    pub bike: FareRate,
    pub auto: FareRate,
    pub car: FareRate,
    #[serde(default = "default_car_floor_margin")]
    pub car_floor_margin: f64,
    #[serde(default = "default_shared_discount")]
    pub shared_discount: f64,
}

fn default_car_floor_margin() -> f64 {
    15.0
}

fn default_shared_discount() -> f64 {
    0.8
}

impl Default for FareTable {
    fn default() -> Self {
        Self {
            bike: FareRate { base: 15.0, per_km: 8.0 },
            auto: FareRate { base: 25.0, per_km: 12.0 },
            car: FareRate { base: 45.0, per_km: 18.0 },
            car_floor_margin: default_car_floor_margin(),
            shared_discount: default_shared_discount(),
        }
    }
}

impl FareTable {
    fn rate(&self, vehicle: VehicleClass) -> FareRate {
        match vehicle {
            VehicleClass::Bike => self.bike,
            VehicleClass::Auto => self.auto,
            VehicleClass::Car => self.car,
        }
    }

    /// Fare for a trip, in whole currency units.
    ///
    /// Pure: identical inputs always produce identical output.
    pub fn quote(&self, distance_km: f64, vehicle: VehicleClass, sharing: bool) -> i64 {
        let rate = self.rate(vehicle);
        let mut raw = rate.base + distance_km * rate.per_km;

        // A car trip must not undercut the auto fare by more than the margin
        if vehicle == VehicleClass::Car {
            let auto_raw = self.auto.base + distance_km * self.auto.per_km;
            if raw < auto_raw + self.car_floor_margin {
                raw = auto_raw + self.car_floor_margin;
            }
        }

        if sharing {
            raw *= self.shared_discount;
        }

        raw.round() as i64
    }
}
