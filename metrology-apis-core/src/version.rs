//! API version tokens and resolution of discovery requests.

use core::fmt::{Display, Formatter, Result as FmtResult};
use core::str::FromStr;

use crate::error::VersionError;

/// A dot-separated numeric version token such as `"1.0"` or `"2024.12"`.
///
/// Versions order component-wise, so `"2024.12" > "2024.2"`.
///
/// ```rust
/// use metrology_apis_core::ApiVersion;
///
/// let a: ApiVersion = "2024.2".parse().unwrap();
/// let b: ApiVersion = "2024.12".parse().unwrap();
/// assert!(a < b);
/// assert_eq!(b.to_string(), "2024.12");
/// assert!("2024.x".parse::<ApiVersion>().is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ApiVersion(Vec<u32>);

impl ApiVersion {
    /// Parses a version token.
    pub fn parse(token: &str) -> Result<Self, VersionError> {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(VersionError::Malformed(token.to_string()));
        }
        trimmed
            .split('.')
            .map(|part| part.parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
            .map_err(|_| VersionError::Malformed(token.to_string()))
    }

    /// Builds a version from its numeric components.
    pub fn from_components(components: impl Into<Vec<u32>>) -> Self {
        Self(components.into())
    }

    /// Numeric components.
    pub fn components(&self) -> &[u32] {
        &self.0
    }
}

impl FromStr for ApiVersion {
    type Err = VersionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for ApiVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for (i, c) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

/// The API versions one implementation provides.
///
/// Implementations declare a static list and resolve every discovery request through
/// [`SupportedVersions::resolve`]:
///
/// ```rust
/// use metrology_apis_core::{SupportedVersions, VersionError};
///
/// static VERSIONS: SupportedVersions = SupportedVersions::new(&["2023.12", "2024.1"]);
///
/// assert_eq!(VERSIONS.resolve(None).unwrap().to_string(), "2024.1");
/// assert_eq!(VERSIONS.resolve(Some("2023.12")).unwrap().to_string(), "2023.12");
/// assert!(matches!(VERSIONS.resolve(Some("9999.1")), Err(VersionError::Unsupported { .. })));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct SupportedVersions {
    tokens: &'static [&'static str],
}

impl SupportedVersions {
    /// Wraps a static token list. Unparsable tokens are ignored at resolution time.
    pub const fn new(tokens: &'static [&'static str]) -> Self {
        Self { tokens }
    }

    /// Parsed versions in declaration order.
    pub fn versions(&self) -> impl Iterator<Item = ApiVersion> + '_ {
        self.tokens.iter().filter_map(|t| ApiVersion::parse(t).ok())
    }

    /// The greatest supported version.
    pub fn latest(&self) -> Option<ApiVersion> {
        self.versions().max()
    }

    /// Whether `version` is listed.
    pub fn contains(&self, version: &ApiVersion) -> bool {
        self.versions().any(|v| &v == version)
    }

    /// Resolves a discovery request: `None` selects the latest version.
    pub fn resolve(&self, requested: Option<&str>) -> Result<ApiVersion, VersionError> {
        let resolved = match requested {
            None => self.latest().ok_or_else(|| self.unsupported("latest")),
            Some(token) => {
                let version = ApiVersion::parse(token)?;
                if self.contains(&version) {
                    Ok(version)
                } else {
                    Err(self.unsupported(token))
                }
            }
        };
        match &resolved {
            Ok(v) => log::debug!("resolved metrology API version {:?} -> {}", requested, v),
            Err(e) => log::debug!("metrology API version resolution failed: {}", e),
        }
        resolved
    }

    fn unsupported(&self, requested: &str) -> VersionError {
        VersionError::Unsupported {
            requested: requested.to_string(),
            supported: self.tokens.join(", "),
        }
    }
}
