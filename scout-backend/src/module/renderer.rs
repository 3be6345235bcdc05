//! Text rendering of ranked scenes
//!
//! Output is a markdown table, one row per scene:
//!
//! | id | datetime (UTC) | cloud_cover (%) | preview_url |
//! | --- | --- | --- | --- |
//!
//! Absent values render as `-`; nothing is filled in that the provider did
//! not return.

use chrono::SecondsFormat;

use scout_common::{SceneRecord, SearchQuery};

const HEADER: &str = "| id | datetime (UTC) | cloud_cover (%) | preview_url |\n| --- | --- | --- | --- |";

pub fn render_scene_table(scenes: &[SceneRecord]) -> String {
    let mut out = String::from(HEADER);
    for scene in scenes {
        let datetime = scene
            .datetime
            .map(|d| d.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_else(|| "-".to_string());
        let cloud = scene
            .cloud_cover
            .map(|c| format!("{:.2}", c))
            .unwrap_or_else(|| "-".to_string());
        let preview = scene.preview_url.as_deref().unwrap_or("-");

        out.push_str(&format!(
            "\n| {} | {} | {} | {} |",
            escape_cell(&scene.id),
            datetime,
            cloud,
            escape_cell(preview)
        ));
    }
    out
}

/// Concrete ways to loosen a query that returned nothing
pub fn relaxation_hints(query: &SearchQuery) -> Vec<String> {
    let mut hints = Vec::new();

    if query.cloud_cover_max < 100.0 {
        let relaxed = (query.cloud_cover_max + 20.0).min(100.0);
        hints.push(format!(
            "raise the cloud cover threshold from {} to {}",
            query.cloud_cover_max, relaxed
        ));
    }

    let days = query.datetime_range.duration().num_days();
    hints.push(format!(
        "widen the date range (currently {} day{})",
        days,
        if days == 1 { "" } else { "s" }
    ));

    hints.push(format!("enlarge the search area (currently {})", query.bbox));
    hints
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use scout_common::{Bbox, TimeRange};

    #[test]
    fn test_table_rows_and_placeholders() {
        let scenes = vec![
            SceneRecord {
                id: "S2A_1".to_string(),
                datetime: Some(Utc.with_ymd_and_hms(2023, 7, 15, 1, 23, 45).unwrap()),
                cloud_cover: Some(3.5),
                preview_url: Some("https://example.com/t.jpg".to_string()),
            },
            SceneRecord {
                id: "S2A_2".to_string(),
                datetime: None,
                cloud_cover: None,
                preview_url: None,
            },
        ];

        let table = render_scene_table(&scenes);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "| id | datetime (UTC) | cloud_cover (%) | preview_url |");
        assert_eq!(
            lines[2],
            "| S2A_1 | 2023-07-15T01:23:45Z | 3.50 | https://example.com/t.jpg |"
        );
        assert_eq!(lines[3], "| S2A_2 | - | - | - |");
    }

    #[test]
    fn test_empty_table_is_header_only() {
        assert_eq!(render_scene_table(&[]).lines().count(), 2);
    }

    #[test]
    fn test_relaxation_hints() {
        let query = SearchQuery {
            bbox: Bbox::new(143.0, 42.5, 146.0, 45.5),
            datetime_range: TimeRange::new(
                Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2023, 6, 11, 0, 0, 0).unwrap(),
            ),
            cloud_cover_max: 90.0,
            collections: vec!["sentinel-2-l2a".to_string()],
            limit: 5,
        };
        let hints = relaxation_hints(&query);
        assert_eq!(hints.len(), 3);
        assert!(hints[0].contains("from 90 to 100"));
        assert!(hints[1].contains("10 days"));
    }
}
