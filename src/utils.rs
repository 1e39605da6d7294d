use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};

use crate::types::{CollectionRelease, Release, ReleaseTableRow};

/// Replaces the value of any `token=` query parameter with `REDACTED`.
pub fn redact_token(url: &str) -> String {
    const KEY: &str = "token=";

    let mut out = String::with_capacity(url.len());
    let mut rest = url;
    while let Some(pos) = rest.find(KEY) {
        let key_end = pos + KEY.len();
        out.push_str(&rest[..key_end]);
        let value = &rest[key_end..];
        let value_len = value.find('&').unwrap_or(value.len());
        if value_len > 0 {
            out.push_str("REDACTED");
        }
        rest = &value[value_len..];
    }
    out.push_str(rest);
    out
}

/// Lower-cases a username and replaces anything outside `[a-z0-9]` with `_`,
/// so it can be used as part of a file name.
pub fn sanitize_username(username: &str) -> String {
    username
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

pub fn parse_added(date_added: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(date_added).ok()
}

/// True if `date_added` is at or before `cutoff`. Unparseable values never are.
pub fn added_at_or_before(date_added: &str, cutoff: &DateTime<FixedOffset>) -> bool {
    parse_added(date_added).is_some_and(|added| added <= *cutoff)
}

/// Groups collection releases that share a master release. Releases without a
/// master are ignored and only groups with more than one member are returned,
/// in the order their master was first seen.
pub fn find_duplicates(collection: &[CollectionRelease]) -> Vec<Vec<CollectionRelease>> {
    let mut positions: HashMap<i64, usize> = HashMap::new();
    let mut groups: Vec<Vec<CollectionRelease>> = Vec::new();

    for release in collection {
        let master_id = release.basic_information.master_id;
        if master_id <= 0 {
            continue;
        }
        match positions.get(&master_id) {
            Some(&idx) => groups[idx].push(release.clone()),
            None => {
                positions.insert(master_id, groups.len());
                groups.push(vec![release.clone()]);
            }
        }
    }

    groups.retain(|g| g.len() > 1);
    groups
}

/// Keeps releases whose title or primary artist contains `search`,
/// case-insensitively.
pub fn filter_releases<T: Release + Clone>(releases: &[T], search: Option<&str>) -> Vec<T> {
    let Some(term) = search.map(str::to_lowercase) else {
        return releases.to_vec();
    };
    releases
        .iter()
        .filter(|r| {
            let info = r.basic_information();
            info.title.to_lowercase().contains(&term)
                || info
                    .artists
                    .iter()
                    .any(|a| a.name.to_lowercase().contains(&term))
        })
        .cloned()
        .collect()
}

pub fn release_row<T: Release>(release: &T) -> ReleaseTableRow {
    let info = release.basic_information();
    ReleaseTableRow {
        added: release
            .date_added()
            .get(..10)
            .unwrap_or(release.date_added())
            .to_string(),
        artist: info.primary_artist().to_string(),
        title: info.title.clone(),
        year: if info.year > 0 {
            info.year.to_string()
        } else {
            String::new()
        },
        format: info
            .formats
            .iter()
            .map(|f| f.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    }
}
