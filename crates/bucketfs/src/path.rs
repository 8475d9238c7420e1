// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! String helpers for slash-separated object paths

pub const DELIMITER: char = '/';

fn is_scheme(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Remove a leading `scheme://` and any surrounding slashes
///
/// `s3://bucket/dir/file.hdf` becomes `bucket/dir/file.hdf`.
pub fn strip_protocol(path: &str) -> String {
    let rest = match path.split_once("://") {
        Some((scheme, rest)) if is_scheme(scheme) => rest,
        _ => path,
    };
    rest.trim_matches(DELIMITER).to_string()
}

/// Join two path fragments with exactly one delimiter between them
pub fn join(base: &str, child: &str) -> String {
    let base = base.trim_end_matches(DELIMITER);
    let child = child.trim_start_matches(DELIMITER);
    match (base.is_empty(), child.is_empty()) {
        (true, _) => child.to_string(),
        (_, true) => base.to_string(),
        _ => format!("{base}{DELIMITER}{child}"),
    }
}

/// Final path component
pub fn basename(path: &str) -> &str {
    let path = path.trim_end_matches(DELIMITER);
    path.rsplit_once(DELIMITER).map_or(path, |(_, name)| name)
}

/// Split `bucket/key/...` into `("bucket", "key/...")`
pub fn split_bucket(path: &str) -> Option<(&str, &str)> {
    let path = path.trim_start_matches(DELIMITER);
    match path.split_once(DELIMITER) {
        Some((bucket, key)) if !bucket.is_empty() => Some((bucket, key)),
        None if !path.is_empty() => Some((path, "")),
        _ => None,
    }
}
