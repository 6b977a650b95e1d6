//! Package specifications as they appear under `depends` in package.yml.
//!
//! A dependency is declared either by bare name (`- pid`), which resolves to
//! the default organization, or by a single-key mapping carrying the source:
//!
//! ```yaml
//! depends:
//!   - pid
//!   - odometry:
//!       fork: antoinealb
//!   - crc:
//!       url: https://example.com/crc.git
//! ```

use std::fmt;

use serde_yaml::Value;
use thiserror::Error;

use crate::util::config::FetchConfig;

/// Malformed package specification.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpecError {
    #[error("package `{name}` must specify url or fork")]
    MissingUrlOrFork { name: String },

    #[error("package description has no name")]
    EmptyDescription,

    #[error("package description must name exactly one package, found: {}", names.join(", "))]
    AmbiguousDescription { names: Vec<String> },

    #[error("package description must be a name or a mapping")]
    InvalidType,

    #[error("`{key}` of package `{name}` must be a string")]
    InvalidAttribute { name: String, key: String },
}

/// Where a described package is fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Explicit source URL, used verbatim.
    Url(String),
    /// Alternate owner substituted into the URL template.
    Fork(String),
}

/// A single declared dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageSpec {
    /// Bare name, fetched from the default organization.
    Name(String),
    /// Name plus an explicit origin.
    Described { name: String, origin: Origin },
}

impl PackageSpec {
    /// Create a bare-name specification.
    pub fn name_only(name: impl Into<String>) -> Self {
        PackageSpec::Name(name.into())
    }

    /// Create a described specification, validating that a source is given.
    ///
    /// `url` takes precedence over `fork` when both are set.
    pub fn described(
        name: impl Into<String>,
        url: Option<String>,
        fork: Option<String>,
    ) -> Result<Self, SpecError> {
        let name = name.into();
        let origin = match (url, fork) {
            (Some(url), _) => Origin::Url(url),
            (None, Some(fork)) => Origin::Fork(fork),
            (None, None) => return Err(SpecError::MissingUrlOrFork { name }),
        };
        Ok(PackageSpec::Described { name, origin })
    }

    /// Parse a specification from its YAML form.
    pub fn from_yaml(value: &Value) -> Result<Self, SpecError> {
        match value {
            Value::String(name) => Ok(PackageSpec::Name(name.clone())),
            Value::Mapping(map) => {
                if map.len() > 1 {
                    let names = map
                        .keys()
                        .map(|k| k.as_str().unwrap_or("?").to_string())
                        .collect();
                    return Err(SpecError::AmbiguousDescription { names });
                }
                let (key, attrs) = map.iter().next().ok_or(SpecError::EmptyDescription)?;

                let name = key.as_str().ok_or(SpecError::InvalidType)?;
                let url = attr_string(name, attrs, "url")?;
                let fork = attr_string(name, attrs, "fork")?;
                Self::described(name, url, fork)
            }
            _ => Err(SpecError::InvalidType),
        }
    }

    /// The package name, which is also its directory name.
    pub fn name(&self) -> &str {
        match self {
            PackageSpec::Name(name) => name,
            PackageSpec::Described { name, .. } => name,
        }
    }

    /// Resolve the URL this package is fetched from.
    pub fn url(&self, config: &FetchConfig) -> String {
        match self {
            PackageSpec::Name(name) => config.format_url(config.default_org(), name),
            PackageSpec::Described { name, origin } => match origin {
                Origin::Url(url) => url.clone(),
                Origin::Fork(fork) => config.format_url(fork, name),
            },
        }
    }
}

impl fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageSpec::Name(name) => write!(f, "{}", name),
            PackageSpec::Described { name, origin } => match origin {
                Origin::Url(url) => write!(f, "{} ({})", name, url),
                Origin::Fork(fork) => write!(f, "{} (fork {})", name, fork),
            },
        }
    }
}

fn attr_string(name: &str, attrs: &Value, key: &str) -> Result<Option<String>, SpecError> {
    match attrs.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(SpecError::InvalidAttribute {
            name: name.to_string(),
            key: key.to_string(),
        }),
    }
}
