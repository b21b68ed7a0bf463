//! Seat tier classification and amenity derivation.

use crate::models::SeatType;

/// Substrings marking premium, sleeper or executive service.
const SUITE_KEYWORDS: &[&str] = &["suite", "ejecut", "premium", "full cama"];

/// Substrings marking semi-reclining or business service.
const SEMICAMA_KEYWORDS: &[&str] = &["semi", "dormis", "business"];

const BASE_AMENITIES: &[&str] = &["🚻 Baño", "❄️ AC"];
const SUITE_AMENITIES: &[&str] = &["🍽️ Comida", "👤 Azafata", "🔌 Enchufes"];
const SEMICAMA_AMENITIES: &[&str] = &["🔌 Enchufes"];

/// Classify a free-text class label. Suite keywords take priority.
pub fn classify(label: &str) -> SeatType {
    let label = label.to_lowercase();

    if SUITE_KEYWORDS.iter().any(|k| label.contains(k)) || has_full_cama(&label) {
        SeatType::Suite
    } else if SEMICAMA_KEYWORDS.iter().any(|k| label.contains(k)) {
        SeatType::Semicama
    } else {
        SeatType::Salon
    }
}

/// `cama` on its own, not as the tail of `semicama`/`semi cama`/`semi-cama`.
fn has_full_cama(label: &str) -> bool {
    label.match_indices("cama").any(|(idx, _)| {
        !label[..idx]
            .trim_end_matches([' ', '-'])
            .ends_with("semi")
    })
}

/// Amenities offered for a seat tier, base set first.
pub fn amenities(seat_type: SeatType) -> Vec<String> {
    let extra: &[&str] = match seat_type {
        SeatType::Suite => SUITE_AMENITIES,
        SeatType::Semicama => SEMICAMA_AMENITIES,
        SeatType::Salon => &[],
    };
    BASE_AMENITIES
        .iter()
        .chain(extra)
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suite_labels() {
        assert_eq!(classify("Suite"), SeatType::Suite);
        assert_eq!(classify("CAMA EJECUTIVO"), SeatType::Suite);
        assert_eq!(classify("Cama"), SeatType::Suite);
        assert_eq!(classify("Premium"), SeatType::Suite);
        assert_eq!(classify("Full Cama"), SeatType::Suite);
    }

    #[test]
    fn test_semicama_labels() {
        assert_eq!(classify("Semicama"), SeatType::Semicama);
        assert_eq!(classify("Semi Cama"), SeatType::Semicama);
        assert_eq!(classify("semi-cama"), SeatType::Semicama);
        assert_eq!(classify("Dormis"), SeatType::Semicama);
        assert_eq!(classify("Business"), SeatType::Semicama);
    }

    #[test]
    fn test_suite_keyword_beats_semicama_keyword() {
        assert_eq!(classify("Semicama Premium"), SeatType::Suite);
        assert_eq!(classify("Semi Cama / Cama Suite"), SeatType::Suite);
    }

    #[test]
    fn test_default_is_salon() {
        assert_eq!(classify("Común"), SeatType::Salon);
        assert_eq!(classify(""), SeatType::Salon);
        assert_eq!(classify("Servicio"), SeatType::Salon);
        assert_eq!(classify("🚌 ★"), SeatType::Salon);
    }

    #[test]
    fn test_amenities() {
        assert_eq!(amenities(SeatType::Salon), vec!["🚻 Baño", "❄️ AC"]);
        assert_eq!(
            amenities(SeatType::Semicama),
            vec!["🚻 Baño", "❄️ AC", "🔌 Enchufes"]
        );
        assert_eq!(
            amenities(SeatType::Suite),
            vec!["🚻 Baño", "❄️ AC", "🍽️ Comida", "👤 Azafata", "🔌 Enchufes"]
        );
    }
}
