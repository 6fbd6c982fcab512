//! Version string cleanup applied before matching

use std::sync::LazyLock;

use regex::Regex;

/// Source-control suffixes appended to PV by recipes built from a repository
/// checkout (e.g. `1.2+gitAUTOINC+1a2b3c`, `0.9+svnr1234`, `git`).
static SCM_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[+~])(?:git|svn|hg|bzr|cvs|AUTOINC)")
        .expect("scm suffix pattern is valid")
});

/// Strip packaging noise from a version string.
///
/// Everything from the first source-control marker onwards is dropped, as are
/// dangling separators left behind.
///
/// Examples:
/// - "1.2.3+gitAUTOINC+abcdef" -> "1.2.3"
/// - "0.9+svnr1234" -> "0.9"
/// - "git" -> ""
/// - "2.0-digital" -> "2.0-digital"
pub fn filter_version_string(version: &str) -> String {
    let version = version.trim();
    let end = SCM_SUFFIX.find(version).map_or(version.len(), |m| m.start());

    version[..end]
        .trim_end_matches(['+', '-', '~', '.'])
        .to_string()
}

/// The part of a version before the first `+` or `-`.
pub fn leading_segment(version: &str) -> &str {
    version.split(['+', '-']).next().unwrap_or(version)
}
