use serde::{Deserialize, Serialize};

/// Default size hint handed to the driver when none is given.
pub const DEFAULT_DATABASE_SIZE: i64 = -1;

/// Where a database file lives. Only meaningful to drivers that keep
/// databases in several well-known directories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Location {
    #[default]
    #[serde(rename = "default")]
    Default,
    Library,
    Documents,
    Shared,
}

impl Location {
    /// Subdirectory relative to a driver's base directory.
    pub fn subdirectory(self) -> Option<&'static str> {
        match self {
            Location::Default => None,
            Location::Library => Some("Library"),
            Location::Documents => Some("Documents"),
            Location::Shared => Some("Shared"),
        }
    }
}

/// The four positional open arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseParams {
    pub database_name: String,
    pub database_version: String,
    pub database_display_name: String,
    #[serde(default = "default_size")]
    pub database_size: i64,
}

fn default_size() -> i64 {
    DEFAULT_DATABASE_SIZE
}

/// The single-object form of the open arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenOptions {
    pub name: String,
    #[serde(default)]
    pub location: Location,
    /// Pre-populated database copied into place on first open.
    #[serde(default)]
    pub create_from_location: Option<String>,
    #[serde(default)]
    pub read_only: bool,
}

impl OpenOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    pub fn with_create_from_location(mut self, path: impl Into<String>) -> Self {
        self.create_from_location = Some(path.into());
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }
}

/// How a session opens its database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DatabaseConfig {
    Params(DatabaseParams),
    Options(OpenOptions),
}

impl DatabaseConfig {
    /// Create a config from the positional arguments
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        display_name: impl Into<String>,
        size: i64,
    ) -> Self {
        DatabaseConfig::Params(DatabaseParams {
            database_name: name.into(),
            database_version: version.into(),
            database_display_name: display_name.into(),
            database_size: size,
        })
    }

    pub fn from_options(options: OpenOptions) -> Self {
        DatabaseConfig::Options(options)
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn name(&self) -> &str {
        match self {
            DatabaseConfig::Params(p) => &p.database_name,
            DatabaseConfig::Options(o) => &o.name,
        }
    }

    pub fn location(&self) -> Location {
        match self {
            DatabaseConfig::Params(_) => Location::Default,
            DatabaseConfig::Options(o) => o.location,
        }
    }

    pub fn read_only(&self) -> bool {
        matches!(self, DatabaseConfig::Options(o) if o.read_only)
    }

    pub fn create_from_location(&self) -> Option<&str> {
        match self {
            DatabaseConfig::Params(_) => None,
            DatabaseConfig::Options(o) => o.create_from_location.as_deref(),
        }
    }
}
