use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::debug;

use crate::model::Timestamped;

/// Parse a bucket timestamp.
///
/// Accepts RFC 3339 (offset normalized to UTC), `YYYY-MM-DDTHH:MM:SS[.f]`,
/// `YYYY-MM-DD HH:MM:SS[.f]` and bare `YYYY-MM-DD` (midnight).
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Select the most recent record per key.
///
/// A missing or unparseable timestamp sorts below every real timestamp.
/// On equal timestamps the record seen later in `records` wins, so callers
/// can rely on insertion order as a recency signal.
pub fn latest_by_key<'a, R, K, I, F>(records: I, key_fn: F) -> BTreeMap<K, R>
where
    R: Timestamped + Clone + 'a,
    K: Ord,
    I: IntoIterator<Item = &'a R>,
    F: Fn(&R) -> K,
{
    let mut latest: BTreeMap<K, (Option<NaiveDateTime>, &'a R)> = BTreeMap::new();

    for record in records {
        let ts = record.bucket_ts().and_then(parse_timestamp);
        let key = key_fn(record);
        match latest.get_mut(&key) {
            // Option ordering puts None below any Some
            Some(current) if ts >= current.0 => *current = (ts, record),
            Some(_) => {}
            None => {
                latest.insert(key, (ts, record));
            }
        }
    }

    debug!("latest_by_key: {} distinct keys", latest.len());

    latest
        .into_iter()
        .map(|(key, (_, record))| (key, record.clone()))
        .collect()
}
