//! Canonical trip record and seat tiers.

use serde::{Deserialize, Serialize};

/// Coarse service tier inferred from a free-text class label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatType {
    #[default]
    Salon,
    Semicama,
    Suite,
}

impl SeatType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Salon => "salon",
            Self::Semicama => "semicama",
            Self::Suite => "suite",
        }
    }
}

/// One bookable service, normalized regardless of where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalTrip {
    /// Source-provided id, or one derived from departure time and operator.
    pub id: String,
    pub operator_name: String,
    pub operator_logo: String,
    /// `HH:MM`, or empty when the source time could not be parsed.
    pub departure_time: String,
    pub arrival_time: String,
    /// Class label exactly as the source wrote it.
    pub class_raw: String,
    pub seat_type: SeatType,
    /// None when the source does not report capacity.
    pub available_seats: Option<i64>,
    pub price_ars: f64,
    pub price_final: f64,
    pub price_display: String,
    /// Always 0 here; the storefront applies its own service charge.
    pub surcharge: f64,
    pub amenities: Vec<String>,
    pub duration_min: Option<i64>,
    /// Which origin/strategy produced this record.
    pub source: String,
}

impl CanonicalTrip {
    /// A trip needs either a departure time or a positive price to be useful.
    pub fn is_valid(&self) -> bool {
        !self.departure_time.is_empty() || self.price_final > 0.0
    }
}

/// Sort trips by departure time as plain strings.
///
/// Same-day `HH:MM` values order correctly lexicographically; trips past
/// midnight are not reordered.
pub fn sort_by_departure(trips: &mut [CanonicalTrip]) {
    trips.sort_by(|a, b| a.departure_time.cmp(&b.departure_time));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip(dep: &str, price: f64) -> CanonicalTrip {
        CanonicalTrip {
            id: format!("{}-test", dep),
            operator_name: "Operador".to_string(),
            operator_logo: String::new(),
            departure_time: dep.to_string(),
            arrival_time: String::new(),
            class_raw: "Servicio".to_string(),
            seat_type: SeatType::Salon,
            available_seats: None,
            price_ars: price,
            price_final: price,
            price_display: String::new(),
            surcharge: 0.0,
            amenities: vec![],
            duration_min: None,
            source: "test".to_string(),
        }
    }

    #[test]
    fn test_seat_type_names_match_serde() {
        for seat in [SeatType::Salon, SeatType::Semicama, SeatType::Suite] {
            let json = serde_json::to_value(seat).unwrap();
            assert_eq!(json, seat.as_str());
        }
    }

    #[test]
    fn test_seat_type_serializes_lowercase() {
        let json = serde_json::to_string(&SeatType::Semicama).unwrap();
        assert_eq!(json, "\"semicama\"");
    }

    #[test]
    fn test_is_valid() {
        assert!(trip("08:00", 0.0).is_valid());
        assert!(trip("", 100.0).is_valid());
        assert!(!trip("", 0.0).is_valid());
    }

    #[test]
    fn test_sort_by_departure() {
        let mut trips = vec![trip("22:15", 1.0), trip("06:40", 1.0), trip("13:05", 1.0)];
        sort_by_departure(&mut trips);
        let times: Vec<_> = trips.iter().map(|t| t.departure_time.as_str()).collect();
        assert_eq!(times, vec!["06:40", "13:05", "22:15"]);
    }
}
