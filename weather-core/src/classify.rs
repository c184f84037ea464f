use regex::Regex;
use std::sync::LazyLock;

use crate::model::{Coordinates, LocationQuery};

static COORDS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(-?[0-9]+\.?[0-9]*),\s*(-?[0-9]+\.?[0-9]*)$").unwrap());

static POSTAL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{5}(-[0-9]{4})?$").unwrap());

/// Classify free-form search text. Total over all inputs; no range checks on coordinates.
pub fn classify(text: &str) -> LocationQuery {
    let trimmed = text.trim();

    if let Some(caps) = COORDS_RE.captures(trimmed) {
        if let (Ok(lat), Ok(lon)) = (caps[1].parse::<f64>(), caps[2].parse::<f64>()) {
            return LocationQuery::Coordinates(Coordinates::new(lat, lon));
        }
    }

    if POSTAL_RE.is_match(trimmed) {
        return LocationQuery::PostalCode(trimmed.to_string());
    }

    LocationQuery::CityName(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(lat: f64, lon: f64) -> LocationQuery {
        LocationQuery::Coordinates(Coordinates::new(lat, lon))
    }

    #[test]
    fn coordinates_with_and_without_space() {
        assert_eq!(classify("40.7,-74.0"), coords(40.7, -74.0));
        assert_eq!(classify("  -33.86,   151.2 "), coords(-33.86, 151.2));
        assert_eq!(classify("51,0"), coords(51.0, 0.0));
        assert_eq!(classify("12.,3"), coords(12.0, 3.0));
    }

    #[test]
    fn out_of_range_coordinates_are_not_rejected() {
        assert_eq!(classify("123.4,567.8"), coords(123.4, 567.8));
    }

    #[test]
    fn space_before_comma_is_not_coordinates() {
        assert_eq!(classify("40.7 ,-74.0"), LocationQuery::CityName("40.7 ,-74.0".into()));
    }

    #[test]
    fn postal_codes() {
        assert_eq!(classify("10001"), LocationQuery::PostalCode("10001".into()));
        assert_eq!(classify(" 10001-1234 "), LocationQuery::PostalCode("10001-1234".into()));
    }

    #[test]
    fn near_postal_codes_fall_through_to_city() {
        for text in ["10001x", "1000", "100011", "10001-12", "10001-"] {
            assert_eq!(classify(text), LocationQuery::CityName(text.into()), "{text}");
        }
    }

    #[test]
    fn city_name_is_trimmed_verbatim() {
        assert_eq!(classify("  New York "), LocationQuery::CityName("New York".into()));
        assert_eq!(classify("São Paulo,BR"), LocationQuery::CityName("São Paulo,BR".into()));
    }

    #[test]
    fn empty_and_blank_input_is_an_empty_city() {
        assert_eq!(classify(""), LocationQuery::CityName(String::new()));
        assert_eq!(classify("   "), LocationQuery::CityName(String::new()));
    }

    #[test]
    fn non_ascii_digits_are_not_postal_codes() {
        assert_eq!(classify("١٢٣٤٥"), LocationQuery::CityName("١٢٣٤٥".into()));
    }
}
