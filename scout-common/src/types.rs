use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in WGS84 degrees.
///
/// Serialized as `[min_lon, min_lat, max_lon, max_lat]`, the shape used by
/// both the AOI catalog file and STAC search requests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Bbox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Bbox {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self { min_lon, min_lat, max_lon, max_lat }
    }

    pub fn as_array(&self) -> [f64; 4] {
        [self.min_lon, self.min_lat, self.max_lon, self.max_lat]
    }

    /// Arithmetic midpoint of the box.
    ///
    /// Not a geodesic midpoint: good enough for regionally compact areas,
    /// and wrong for boxes spanning the antimeridian or large latitude bands.
    pub fn center(&self) -> Center {
        Center {
            lon: (self.min_lon + self.max_lon) / 2.0,
            lat: (self.min_lat + self.max_lat) / 2.0,
        }
    }

    /// First invariant this box breaks, if any.
    ///
    /// Checks, in order: finite coordinates, longitude/latitude ranges,
    /// then `min < max` on both axes.
    pub fn violation(&self) -> Option<String> {
        if self.as_array().iter().any(|v| !v.is_finite()) {
            return Some(format!("coordinates must be finite numbers, got {}", self));
        }
        for lon in [self.min_lon, self.max_lon] {
            if !(-180.0..=180.0).contains(&lon) {
                return Some(format!("longitude {} out of range [-180, 180]", lon));
            }
        }
        for lat in [self.min_lat, self.max_lat] {
            if !(-90.0..=90.0).contains(&lat) {
                return Some(format!("latitude {} out of range [-90, 90]", lat));
            }
        }
        if self.min_lon >= self.max_lon {
            return Some(format!(
                "min_lon ({}) must be less than max_lon ({})",
                self.min_lon, self.max_lon
            ));
        }
        if self.min_lat >= self.max_lat {
            return Some(format!(
                "min_lat ({}) must be less than max_lat ({})",
                self.min_lat, self.max_lat
            ));
        }
        None
    }
}

impl From<[f64; 4]> for Bbox {
    fn from(v: [f64; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<Bbox> for [f64; 4] {
    fn from(b: Bbox) -> Self {
        b.as_array()
    }
}

impl std::fmt::Display for Bbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{:?}, {:?}, {:?}, {:?}]",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Center {
    pub lon: f64,
    pub lat: f64,
}

/// One named area of interest from the AOI catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AoiCatalogEntry {
    /// Canonical identifier, e.g. "hokkaido_east"
    pub id: String,

    /// Alternative names, matched after normalization
    #[serde(default)]
    pub aliases: Vec<String>,

    pub bbox: Bbox,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    /// Cloud cover threshold applied when the caller gives none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_cloud_cover: Option<f64>,
}

/// Outcome of resolving a location hint against the catalog.
///
/// An unmatched result carries only `message`; every other optional field is
/// `None`. Use [`ResolvedAoi::from_entry`] and [`ResolvedAoi::unmatched`]
/// rather than building one by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedAoi {
    pub matched: bool,
    pub aoi_id: Option<String>,
    pub bbox: Option<Bbox>,
    pub center: Option<Center>,
    pub note: Option<String>,
    pub default_cloud_cover: Option<f64>,
    pub message: String,
}

impl ResolvedAoi {
    pub fn from_entry(entry: &AoiCatalogEntry) -> Self {
        Self {
            matched: true,
            aoi_id: Some(entry.id.clone()),
            bbox: Some(entry.bbox),
            center: Some(entry.bbox.center()),
            note: entry.note.clone(),
            default_cloud_cover: entry.default_cloud_cover,
            message: "Matched known AOI.".to_string(),
        }
    }

    pub fn unmatched(message: impl Into<String>) -> Self {
        Self {
            matched: false,
            aoi_id: None,
            bbox: None,
            center: None,
            note: None,
            default_cloud_cover: None,
            message: message.into(),
        }
    }
}

/// One scene returned by the metadata search provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneRecord {
    /// STAC item id
    pub id: String,

    /// Acquisition time
    pub datetime: Option<DateTime<Utc>>,

    /// Scene-level cloud cover in percent
    pub cloud_cover: Option<f64>,

    /// Quick-look image URL, only when the provider listed one
    pub preview_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_is_arithmetic_mean() {
        let bbox = Bbox::new(143.0, 42.5, 146.0, 45.5);
        assert_eq!(bbox.center(), Center { lon: 144.5, lat: 44.0 });
    }

    #[test]
    fn test_bbox_serializes_as_array() {
        let bbox = Bbox::new(138.8, 34.8, 140.0, 36.2);
        let json = serde_json::to_string(&bbox).unwrap();
        assert_eq!(json, "[138.8,34.8,140.0,36.2]");

        let back: Bbox = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bbox);
    }

    #[test]
    fn test_bbox_wrong_arity_rejected() {
        assert!(serde_json::from_str::<Bbox>("[1.0, 2.0, 3.0]").is_err());
    }

    #[test]
    fn test_bbox_violations() {
        assert!(Bbox::new(143.0, 42.5, 146.0, 45.5).violation().is_none());

        let reason = Bbox::new(146.0, 42.5, 143.0, 45.5).violation().unwrap();
        assert!(reason.contains("min_lon"));

        let reason = Bbox::new(0.0, 10.0, 1.0, 10.0).violation().unwrap();
        assert!(reason.contains("min_lat"));

        let reason = Bbox::new(-190.0, 0.0, 0.0, 1.0).violation().unwrap();
        assert!(reason.contains("longitude"));

        let reason = Bbox::new(0.0, -91.0, 1.0, 1.0).violation().unwrap();
        assert!(reason.contains("latitude"));

        assert!(Bbox::new(f64::NAN, 0.0, 1.0, 1.0).violation().is_some());
    }

    #[test]
    fn test_unmatched_has_no_location() {
        let r = ResolvedAoi::unmatched("nope");
        assert!(!r.matched);
        assert!(r.aoi_id.is_none());
        assert!(r.bbox.is_none());
        assert!(r.center.is_none());
        assert!(r.note.is_none());
        assert!(r.default_cloud_cover.is_none());
        assert_eq!(r.message, "nope");
    }
}
