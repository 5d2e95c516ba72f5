use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// Identifier assigned by the backend. Numbers and strings are both accepted
/// and serialized back in the form they arrived in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Number(n) => write!(f, "{n}"),
            ResourceId::Text(s) => f.write_str(s),
        }
    }
}

impl FromStr for ResourceId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<i64>() {
            Ok(n) => ResourceId::Number(n),
            Err(_) => ResourceId::Text(s.to_string()),
        })
    }
}

impl From<i64> for ResourceId {
    fn from(n: i64) -> Self {
        ResourceId::Number(n)
    }
}

impl From<&str> for ResourceId {
    fn from(s: &str) -> Self {
        ResourceId::Text(s.to_string())
    }
}

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Both components are set to a usable (non-zero, non-NaN) value.
    pub fn is_usable(&self) -> bool {
        truthy(Some(self.latitude)) && truthy(Some(self.longitude))
    }
}

/// A coordinate only counts when it is present, non-zero and not NaN.
fn truthy(value: Option<f64>) -> bool {
    matches!(value, Some(v) if v != 0.0 && !v.is_nan())
}

/// Timestamp string as sent by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub String);

impl Timestamp {
    /// Wall-clock time of the timestamp. Accepts RFC 3339 and zone-less
    /// ISO-8601 date-times.
    pub fn parse(&self) -> Option<NaiveDateTime> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.0) {
            return Some(dt.naive_local());
        }
        NaiveDateTime::parse_from_str(&self.0, "%Y-%m-%dT%H:%M:%S%.f").ok()
    }

    /// `dd/mm/yyyy, HH:MM`, or `Unknown` when the value can't be parsed.
    pub fn display(&self) -> String {
        match self.parse() {
            Some(dt) => dt.format("%d/%m/%Y, %H:%M").to_string(),
            None => "Unknown".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: ResourceId,
    pub file_name: String,
    /// Server-relative path, resolve with [`crate::BackendConfig::photo_url`].
    pub url: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub uploaded_at: Option<Timestamp>,
}

impl Photo {
    /// Whether the photo can be placed on the map. Both coordinates must be
    /// truthy; a single coordinate counts as no location.
    pub fn has_location(&self) -> bool {
        truthy(self.latitude) && truthy(self.longitude)
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) if self.has_location() => {
                Some(Coordinates::new(latitude, longitude))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: ResourceId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover_photo_id: Option<ResourceId>,
    /// Display field computed by the backend, may lag behind `cover_photo_id`.
    #[serde(default)]
    pub cover_photo_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub photo_count: u32,
    /// Only present when the album was fetched on its own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photos: Option<Vec<Photo>>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

fn null_as_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or_default())
}

impl Album {
    /// Drop a photo from the loaded membership list and decrement
    /// `photo_count` in the same step. Returns false when the photo isn't in
    /// the loaded list, in which case nothing changes.
    pub fn remove_photo(&mut self, photo_id: &ResourceId) -> bool {
        let Some(photos) = self.photos.as_mut() else {
            return false;
        };

        let before = photos.len();
        photos.retain(|p| &p.id != photo_id);
        let removed = before - photos.len();
        if removed == 0 {
            return false;
        }

        self.photo_count = self.photo_count.saturating_sub(removed as u32);
        true
    }

    pub fn photos(&self) -> &[Photo] {
        self.photos.as_deref().unwrap_or_default()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{album, photo};
    use super::*;

    #[test]
    fn photo_deserializes_from_backend_json() {
        let json = serde_json::json!({
            "id": 42,
            "fileName": "beach.jpg",
            "url": "/uploads/beach.jpg",
            "latitude": 10.762622,
            "longitude": 106.660172,
            "description": null,
            "uploadedAt": "2024-01-15T14:30:00"
        });

        let photo: Photo = serde_json::from_value(json).unwrap();
        assert_eq!(photo.id, ResourceId::Number(42));
        assert_eq!(photo.file_name, "beach.jpg");
        assert!(photo.has_location());
        assert_eq!(
            photo.coordinates(),
            Some(Coordinates::new(10.762622, 106.660172))
        );
    }

    #[test]
    fn string_ids_round_trip_as_strings() {
        let id: ResourceId = serde_json::from_str("\"a1b2\"").unwrap();
        assert_eq!(id, ResourceId::Text("a1b2".into()));
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"a1b2\"");
        assert_eq!("17".parse::<ResourceId>().unwrap(), ResourceId::Number(17));
    }

    #[test]
    fn one_coordinate_is_no_location() {
        assert!(!photo(1, Some(10.5), None).has_location());
        assert!(!photo(2, None, Some(106.0)).has_location());
        assert!(photo(3, None, Some(106.0)).coordinates().is_none());
    }

    #[test]
    fn zero_and_nan_coordinates_are_falsy() {
        assert!(!photo(1, Some(0.0), Some(106.0)).has_location());
        assert!(!photo(2, Some(10.0), Some(f64::NAN)).has_location());
        assert!(photo(3, Some(-33.9), Some(151.2)).has_location());
    }

    #[test]
    fn remove_photo_keeps_count_and_list_together() {
        let mut a = album(1, vec![photo(1, None, None), photo(2, None, None), photo(3, None, None)]);

        assert!(a.remove_photo(&ResourceId::Number(2)));
        assert_eq!(a.photo_count, 2);
        let ids: Vec<_> = a.photos().iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids, vec![ResourceId::Number(1), ResourceId::Number(3)]);

        assert!(!a.remove_photo(&ResourceId::Number(2)));
        assert_eq!(a.photo_count, 2);
    }

    #[test]
    fn remove_photo_without_loaded_photos_is_noop() {
        let mut a = album(1, vec![]);
        a.photos = None;
        a.photo_count = 5;
        assert!(!a.remove_photo(&ResourceId::Number(1)));
        assert_eq!(a.photo_count, 5);
    }

    #[test]
    fn album_list_entry_has_no_photos() {
        let json = serde_json::json!({
            "id": 7,
            "name": "Trip",
            "photoCount": 12,
            "createdAt": "2024-03-01T08:00:00Z"
        });
        let a: Album = serde_json::from_value(json).unwrap();
        assert!(a.photos.is_none());
        assert_eq!(a.photo_count, 12);
        assert_eq!(a.created_at.unwrap().display(), "01/03/2024, 08:00");
    }

    #[test]
    fn null_photo_count_reads_as_zero() {
        let json = serde_json::json!([
            { "id": 1, "name": "Empty", "photoCount": null },
            { "id": 2, "name": "Full", "photoCount": 3 }
        ]);
        let albums: Vec<Album> = serde_json::from_value(json).unwrap();
        assert_eq!(albums[0].photo_count, 0);
        assert_eq!(albums[1].photo_count, 3);
    }

    #[test]
    fn timestamp_display_handles_garbage() {
        assert_eq!(Timestamp("yesterday".into()).display(), "Unknown");
        assert_eq!(
            Timestamp("2024-01-15T14:30:00.123".into()).display(),
            "15/01/2024, 14:30"
        );
    }
}
