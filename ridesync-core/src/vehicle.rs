use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Vehicle classes a request can be booked against
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VehicleClass {
    Bike,
    Auto,
    Car,
}

impl VehicleClass {
    /// Seat capacity, including the first passenger
    pub fn capacity(&self) -> i32 {
        match self {
            VehicleClass::Bike => 1,
            VehicleClass::Auto => 3,
            VehicleClass::Car => 4,
        }
    }

    /// Shared rides need more than one seat
    pub fn supports_sharing(&self) -> bool {
        self.capacity() > 1
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleClass::Bike => "bike",
            VehicleClass::Auto => "auto",
            VehicleClass::Car => "car",
        }
    }

    pub fn all() -> [VehicleClass; 3] {
        [VehicleClass::Bike, VehicleClass::Auto, VehicleClass::Car]
    }
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bike" => Ok(VehicleClass::Bike),
            "auto" => Ok(VehicleClass::Auto),
            "car" => Ok(VehicleClass::Car),
            other => Err(format!("unknown vehicle class: {}", other)),
        }
    }
}
