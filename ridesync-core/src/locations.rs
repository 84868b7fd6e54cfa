use serde::Serialize;

/// A named pickup/drop point from the fixed service area
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

/// The fixed location set the service operates over
pub static LOCATIONS: [Location; 8] = [
    Location { name: "LJU Campus", lat: 22.9912, lng: 72.4884 },
    Location { name: "Prahlad Nagar", lat: 23.0120, lng: 72.5108 },
    Location { name: "Anand Nagar", lat: 23.0180, lng: 72.5200 },
    Location { name: "Satellite", lat: 23.0300, lng: 72.5170 },
    Location { name: "Vastrapur", lat: 23.0387, lng: 72.5307 },
    Location { name: "Bodakdev", lat: 23.0380, lng: 72.5100 },
    Location { name: "Ambawadi", lat: 23.0230, lng: 72.5560 },
    Location { name: "Navrangpura", lat: 23.0365, lng: 72.5610 },
];

/// Look a location up by its exact display name
pub fn find(name: &str) -> Option<&'static Location> {
    LOCATIONS.iter().find(|l| l.name == name)
}
