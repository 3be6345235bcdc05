//! STAC ItemCollection -> SceneRecord
//!
//! Walks the JSON by hand instead of deserializing into strict structs, so one
//! odd feature (string cloud cover, bad timestamp, missing assets) degrades to
//! empty optional fields rather than failing the whole page.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::warn;

use scout_common::SceneRecord;

/// Asset keys that may hold a quick-look image, highest priority first
pub const PREVIEW_ASSET_KEYS: [&str; 4] = ["thumbnail", "overview", "true_color", "preview"];

/// Parse every usable feature of a search response, in provider order.
///
/// Features without a string `id` are skipped: an id is never invented.
pub fn parse_item_collection(body: &Value) -> Vec<SceneRecord> {
    let Some(features) = body.get("features") else {
        warn!("STAC response has no 'features' member; treating as empty");
        return Vec::new();
    };
    let Some(features) = features.as_array() else {
        warn!("STAC response 'features' is not an array; treating as empty");
        return Vec::new();
    };

    let mut records = Vec::with_capacity(features.len());
    for (index, feature) in features.iter().enumerate() {
        match parse_feature(feature) {
            Some(record) => records.push(record),
            None => warn!("Skipping STAC feature #{} without an id", index),
        }
    }
    records
}

/// One feature, or `None` when it has no usable id
pub fn parse_feature(feature: &Value) -> Option<SceneRecord> {
    let id = feature.get("id")?.as_str()?.to_string();
    let properties = feature.get("properties");

    let datetime = properties
        .and_then(|p| p.get("datetime"))
        .and_then(Value::as_str)
        .and_then(|s| parse_datetime(&id, s));

    let cloud_cover = properties
        .and_then(|p| p.get("eo:cloud_cover"))
        .and_then(Value::as_f64);

    let preview_url = feature.get("assets").and_then(preview_href);

    Some(SceneRecord {
        id,
        datetime,
        cloud_cover,
        preview_url,
    })
}

/// The first preview-like asset present decides; if it has no string href
/// the scene simply has no preview.
fn preview_href(assets: &Value) -> Option<String> {
    let asset = PREVIEW_ASSET_KEYS.iter().find_map(|key| assets.get(key))?;
    asset.get("href").and_then(Value::as_str).map(str::to_string)
}

fn parse_datetime(id: &str, s: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(s) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(e) => {
            warn!("Scene {} has unparseable datetime '{}': {}", id, s, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_parse_full_feature() {
        let body = json!({
            "type": "FeatureCollection",
            "features": [{
                "id": "S2B_54TXJ_20230715_0_L2A",
                "properties": {
                    "datetime": "2023-07-15T01:23:45.678Z",
                    "eo:cloud_cover": 3.25
                },
                "assets": {
                    "thumbnail": {"href": "https://example.com/thumb.jpg"},
                    "overview": {"href": "https://example.com/overview.tif"}
                }
            }]
        });

        let records = parse_item_collection(&body);
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.id, "S2B_54TXJ_20230715_0_L2A");
        assert_eq!(r.cloud_cover, Some(3.25));
        assert_eq!(
            r.datetime.map(|d| d.date_naive()),
            Some(Utc.with_ymd_and_hms(2023, 7, 15, 0, 0, 0).unwrap().date_naive())
        );
        assert_eq!(r.preview_url.as_deref(), Some("https://example.com/thumb.jpg"));
    }

    #[test]
    fn test_preview_priority() {
        let feature = json!({
            "id": "a",
            "assets": {
                "preview": {"href": "p"},
                "true_color": {"href": "t"},
                "overview": {"href": "o"}
            }
        });
        assert_eq!(parse_feature(&feature).unwrap().preview_url.as_deref(), Some("o"));

        let feature = json!({"id": "b", "assets": {"preview": {"href": "p"}, "true_color": {"href": "t"}}});
        assert_eq!(parse_feature(&feature).unwrap().preview_url.as_deref(), Some("t"));
    }

    #[test]
    fn test_no_recognized_assets_means_no_preview() {
        let body = json!({"features": [
            {"id": "a", "assets": {"B04": {"href": "x"}, "visual": {"href": "y"}}},
            {"id": "b", "assets": {}},
            {"id": "c"}
        ]});
        let records = parse_item_collection(&body);
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.preview_url.is_none()));
    }

    #[test]
    fn test_partial_features_degrade() {
        let body = json!({"features": [
            {"id": "a", "properties": {"datetime": "yesterday", "eo:cloud_cover": "12"}},
            {"id": "b", "properties": null},
            {"properties": {"eo:cloud_cover": 1.0}},
            {"id": 42}
        ]});
        let records = parse_item_collection(&body);
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(records[0].datetime.is_none());
        assert!(records[0].cloud_cover.is_none());
    }

    #[test]
    fn test_missing_features() {
        assert!(parse_item_collection(&json!({})).is_empty());
        assert!(parse_item_collection(&json!({"features": "nope"})).is_empty());
    }
}
