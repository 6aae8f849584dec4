//! Total order for dotted version strings with mixed segments
//!
//! Feed release keys are not semver: segments may be non-numeric
//! (`2.2.beta-1`), so `semver::Version` cannot represent them. The order here
//! compares segment-by-segment, numerically where both sides parse as
//! integers and lexically otherwise; on an equal shared prefix the string
//! with more segments sorts greater.

use std::cmp::Ordering;

/// Compare two dotted version strings.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }

    let left: Vec<&str> = a.split('.').collect();
    let right: Vec<&str> = b.split('.').collect();

    for i in 0..left.len().max(right.len()) {
        let ord = match (left.get(i), right.get(i)) {
            (Some(l), Some(r)) => match (l.parse::<u64>(), r.parse::<u64>()) {
                (Ok(l), Ok(r)) => l.cmp(&r),
                _ => l.cmp(r),
            },
            // Equal shared prefix: the longer version is the greater one.
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => unreachable!(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    Ordering::Equal
}

/// The greatest version among `keys`, or `None` for an empty iterator.
pub fn max_version<'a, I>(keys: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    keys.into_iter().max_by(|a, b| compare_versions(a, b))
}
