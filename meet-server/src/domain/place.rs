//! Points of interest around a meeting point.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::GeoPoint;

/// Error returned when parsing an unknown place category.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown place category: {0}")]
pub struct InvalidPlaceCategory(String);

/// Kind of place to look for around the meeting point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceCategory {
    Cafe,
    Restaurant,
    Bar,
}

impl PlaceCategory {
    /// Place type name understood by the place-search oracle.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceCategory::Cafe => "cafe",
            PlaceCategory::Restaurant => "restaurant",
            PlaceCategory::Bar => "bar",
        }
    }
}

impl FromStr for PlaceCategory {
    type Err = InvalidPlaceCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cafe" => Ok(PlaceCategory::Cafe),
            "restaurant" => Ok(PlaceCategory::Restaurant),
            "bar" => Ok(PlaceCategory::Bar),
            _ => Err(InvalidPlaceCategory(s.to_string())),
        }
    }
}

impl fmt::Display for PlaceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A place returned by the place-search oracle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Place {
    pub id: String,
    pub name: String,
    /// Short address, e.g. "12 High Street, Reading".
    pub vicinity: String,
    /// Average rating, 0.0 when the place has none.
    pub rating: f32,
    pub user_ratings_total: u32,
    pub location: GeoPoint,
    pub types: Vec<String>,
}

/// Sort places best-rated first.
///
/// The sort is stable, so places with equal ratings keep the oracle's
/// relevance order.
pub fn rank_by_rating(mut places: Vec<Place>) -> Vec<Place> {
    places.sort_by(|a, b| b.rating.total_cmp(&a.rating));
    places
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(id: &str, rating: f32) -> Place {
        Place {
            id: id.to_string(),
            name: format!("Place {id}"),
            vicinity: String::new(),
            rating,
            user_ratings_total: 0,
            location: GeoPoint::new(0.0, 0.0).unwrap(),
            types: vec!["cafe".to_string()],
        }
    }

    #[test]
    fn ranks_descending_and_stable() {
        let ranked = rank_by_rating(vec![
            place("a", 3.5),
            place("b", 4.8),
            place("c", 3.5),
            place("d", 0.0),
        ]);
        let ids: Vec<_> = ranked.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["b", "a", "c", "d"]);
    }

    #[test]
    fn category_parse_and_display() {
        assert_eq!("Cafe".parse::<PlaceCategory>().unwrap(), PlaceCategory::Cafe);
        assert_eq!(PlaceCategory::Bar.to_string(), "bar");
        assert!("museum".parse::<PlaceCategory>().is_err());
    }
}
