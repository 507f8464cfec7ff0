//! Mapbox places API DTOs.

use serde::{Deserialize, Serialize};

use crate::domain::Coordinate;

/// Response of `/geocoding/v5/mapbox.places/{query}.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlacesResponse {
    #[serde(default)]
    pub features: Vec<PlaceFeature>,
}

/// One matched place.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceFeature {
    /// Full display name, e.g. "Place Victor Hugo, 38000 Grenoble, France".
    pub place_name: Option<String>,

    /// Short name of the feature itself.
    pub text: Option<String>,

    /// `[lon, lat]`
    pub center: Option<[f64; 2]>,

    /// Match score between 0 and 1.
    pub relevance: Option<f64>,
}

/// A geocoding candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    pub name: String,
    pub center: Coordinate,
}

impl PlaceFeature {
    /// Usable candidate, if the feature has a position.
    pub fn to_candidate(&self) -> Option<PlaceCandidate> {
        let [lon, lat] = self.center?;
        let name = self
            .place_name
            .clone()
            .or_else(|| self.text.clone())
            .unwrap_or_default();
        Some(PlaceCandidate {
            name,
            center: Coordinate::new(lon, lat),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_places_response() {
        let json = r#"{
            "type": "FeatureCollection",
            "query": ["victor", "hugo"],
            "features": [
                {"id": "poi.1", "text": "Place Victor Hugo",
                 "place_name": "Place Victor Hugo, 38000 Grenoble, France",
                 "center": [5.7263, 45.1889], "relevance": 0.98},
                {"id": "address.2", "text": "Rue sans position"}
            ]
        }"#;
        let response: PlacesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.features.len(), 2);

        let candidate = response.features[0].to_candidate().unwrap();
        assert_eq!(candidate.name, "Place Victor Hugo, 38000 Grenoble, France");
        assert_eq!(candidate.center, Coordinate::new(5.7263, 45.1889));

        assert!(response.features[1].to_candidate().is_none());
    }

    #[test]
    fn name_falls_back_to_text() {
        let feature = PlaceFeature {
            place_name: None,
            text: Some("Bastille".into()),
            center: Some([5.7249, 45.1989]),
            relevance: None,
        };
        assert_eq!(feature.to_candidate().unwrap().name, "Bastille");
    }
}
