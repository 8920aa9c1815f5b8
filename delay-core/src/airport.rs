use serde::{Deserialize, Serialize};

/// An airport the weather provider knows about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airport {
    pub code: String,
    /// Provider station id; usually the code itself, sometimes a `zmw:` station.
    pub location_id: String,
    pub state: String,
}

impl Airport {
    fn new(code: &str, location_id: &str, state: &str) -> Self {
        Self {
            code: code.to_string(),
            location_id: location_id.to_string(),
            state: state.to_string(),
        }
    }

    /// Location path used in weather queries, e.g. `WA/SEA`.
    pub fn location_path(&self) -> String {
        format!("{}/{}", self.state, self.location_id)
    }
}

/// Static lookup from airport code to provider location.
#[derive(Debug, Clone)]
pub struct AirportDirectory {
    airports: Vec<Airport>,
}

impl AirportDirectory {
    pub fn new(airports: Vec<Airport>) -> Self {
        Self { airports }
    }

    /// Case-insensitive lookup by IATA code.
    pub fn find(&self, code: &str) -> Option<&Airport> {
        let code = code.trim();
        self.airports.iter().find(|a| a.code.eq_ignore_ascii_case(code))
    }

    pub fn airports(&self) -> &[Airport] {
        &self.airports
    }
}

impl Default for AirportDirectory {
    fn default() -> Self {
        Self::new(vec![
            Airport::new("SEA", "SEA", "WA"),
            Airport::new("ABQ", "ABQ", "NM"),
            Airport::new("ANC", "ANC", "AK"),
            Airport::new("ATL", "ATL", "GA"),
            Airport::new("AUS", "AUS", "TX"),
            Airport::new("CLE", "CLE", "OH"),
            Airport::new("DTW", "DTW", "MI"),
            Airport::new("JAX", "JAX", "FL"),
            Airport::new("MEM", "MEM", "TN"),
            Airport::new("MIA", "MIA", "FL"),
            Airport::new("ORD", "zmw:60666.6.99999", "IL"),
            Airport::new("PHX", "PHX", "AZ"),
            Airport::new("SAN", "zmw:92140.5.99999", "CA"),
            Airport::new("SFO", "SFO", "CA"),
            Airport::new("SJC", "SJC", "CA"),
            Airport::new("SLC", "SLC", "UT"),
            Airport::new("STL", "STL", "MO"),
            Airport::new("TPA", "TPA", "FL"),
        ])
    }
}
