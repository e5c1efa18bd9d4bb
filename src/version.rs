//! Version string with optional build metadata
//!
//! `CFAPI_BUILD_SHA` and `CFAPI_BUILD_DATE`, when set at compile time, are
//! appended as semver build metadata: `0.3.0+abc123.2026-01-01`.

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn version_string() -> String {
    format_version(
        VERSION,
        option_env!("CFAPI_BUILD_SHA"),
        option_env!("CFAPI_BUILD_DATE"),
    )
}

fn format_version(version: &str, sha: Option<&str>, build_date: Option<&str>) -> String {
    let metadata: Vec<&str> = [sha, build_date]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect();

    if metadata.is_empty() {
        version.to_string()
    } else {
        format!("{}+{}", version, metadata.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_version() {
        assert_eq!(format_version("1.2.3", None, None), "1.2.3");
        assert_eq!(format_version("1.2.3", Some(""), Some("")), "1.2.3");
    }

    #[test]
    fn test_version_with_metadata() {
        assert_eq!(
            format_version("1.2.3", Some("abc123"), Some("2026-01-01")),
            "1.2.3+abc123.2026-01-01"
        );
        assert_eq!(format_version("1.2.3", None, Some("2026-01-01")), "1.2.3+2026-01-01");
    }

    #[test]
    fn test_version_string_starts_with_crate_version() {
        assert!(version_string().starts_with(VERSION));
    }
}
