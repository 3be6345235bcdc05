//! Scene ranking for presentation
use std::cmp::Ordering;
use std::collections::HashSet;

use scout_common::SceneRecord;

/// Order scenes best-first, drop repeated ids and keep the top `limit`.
///
/// Lowest `cloud_cover` first, then most recent `datetime`; a missing value
/// sorts after every present one on its key. The sort is stable, so scenes
/// with equal keys keep their provider order. Of several records sharing an
/// `id`, only the best-ranked one survives.
pub fn rank(mut records: Vec<SceneRecord>, limit: usize) -> Vec<SceneRecord> {
    records.sort_by(compare_scenes);

    let mut seen = HashSet::new();
    records.retain(|r| seen.insert(r.id.clone()));
    records.truncate(limit);
    records
}

fn compare_scenes(a: &SceneRecord, b: &SceneRecord) -> Ordering {
    let by_cloud = match (a.cloud_cover, b.cloud_cover) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };

    by_cloud.then_with(|| match (a.datetime, b.datetime) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    })
}
