use std::sync::LazyLock;

use regex::Regex;
use semver::Version;

use crate::version::error::VersionError;

/// Weight of a major-version step in [`version_distance`]
pub const MAJOR_WEIGHT: i64 = 10_000;

/// Weight of a minor-version step in [`version_distance`]
pub const MINOR_WEIGHT: i64 = 100;

static BASE_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"[vV]?(?P<major>0|[1-9][0-9]*)(?:\.(?P<minor>0|[1-9][0-9]*)(?:\.(?P<patch>0|[1-9][0-9]*))?)?",
    )
    .expect("base version pattern is valid")
});

/// Coerce an incomplete version string into a semver `Version`.
///
/// Looks for the first "basic" version (`major[.minor[.patch]]`, optionally
/// prefixed with `v`) anywhere in the input and pads missing components with
/// zeros. Returns the version together with the text following the match.
///
/// Examples:
/// - "v2.10" -> (2.10.0, "")
/// - "1.2.3rc1" -> (1.2.3, "rc1")
/// - "release" -> (None, "release")
pub fn coerce(version: &str) -> (Option<Version>, &str) {
    let Some(caps) = BASE_VERSION.captures(version) else {
        return (None, version);
    };

    let component = |name: &str| -> Option<u64> {
        caps.name(name)
            .map_or(Some(0), |m| m.as_str().parse::<u64>().ok())
    };

    let whole = caps.get(0).map_or(0..0, |m| m.range());
    let rest = &version[whole.end..];

    match (component("major"), component("minor"), component("patch")) {
        (Some(major), Some(minor), Some(patch)) => (Some(Version::new(major, minor, patch)), rest),
        // digits overflowing u64 are not a usable version
        _ => (None, version),
    }
}

/// Normalize a version string into a semver `Version`.
///
/// Strictly valid semver strings are parsed as-is; anything else goes through
/// [`coerce`].
pub fn normalize(version: &str) -> Result<Version, VersionError> {
    if let Ok(parsed) = Version::parse(version) {
        return Ok(parsed);
    }

    match coerce(version) {
        (Some(parsed), _) => Ok(parsed),
        (None, _) => Err(VersionError::NotAVersion(version.to_string())),
    }
}

/// Weighted distance between two versions.
///
/// `(a.major - b.major) * 10000 + (a.minor - b.minor) * 100 + (a.patch - b.patch)`.
/// Positive when `b` is older than `a`. Pre-release and build metadata are ignored.
pub fn version_distance(a: &Version, b: &Version) -> i64 {
    let diff = |x: u64, y: u64| as_i64(x).saturating_sub(as_i64(y));

    diff(a.major, b.major)
        .saturating_mul(MAJOR_WEIGHT)
        .saturating_add(diff(a.minor, b.minor).saturating_mul(MINOR_WEIGHT))
        .saturating_add(diff(a.patch, b.patch))
}

/// Parse a maximum version distance.
///
/// Accepts either a plain integer ("10203") or a `major.minor.patch` triple
/// ("1.2.3"), which is weighted the same way as [`version_distance`].
pub fn parse_distance(text: &str) -> Result<i64, VersionError> {
    let text = text.trim();

    if let Ok(distance) = text.parse::<i64>() {
        return Ok(distance);
    }

    let parts: Vec<&str> = text.split('.').collect();
    let weights = [MAJOR_WEIGHT, MINOR_WEIGHT, 1];
    if parts.is_empty() || parts.len() > weights.len() {
        return Err(VersionError::InvalidDistance(text.to_string()));
    }

    parts
        .iter()
        .zip(weights)
        .try_fold(0i64, |acc, (part, weight)| {
            part.parse::<i64>()
                .ok()
                .filter(|value| *value >= 0)
                .map(|value| acc.saturating_add(value.saturating_mul(weight)))
        })
        .ok_or_else(|| VersionError::InvalidDistance(text.to_string()))
}

fn as_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
