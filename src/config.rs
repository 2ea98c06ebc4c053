use std::fs;
use std::time::Duration;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{ActionMode, DriverKind, OrganismCode};
use crate::error::KpwdError;

pub const DEFAULT_CONFIG_FILE: &str = "kpwd.json";
pub const DEFAULT_DOWNLOAD_FOLDER: &str = "/data";
pub const DEFAULT_EXTENSION: &str = "xml";
pub const DEFAULT_BASE_URL: &str = "https://rest.kegg.jp";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub org_code: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub map_ids: Option<MapIds>,
    #[serde(default)]
    pub input_file: Option<String>,
    #[serde(default)]
    pub download_folder: Option<String>,
    #[serde(default)]
    pub extension: Option<String>,
    #[serde(default)]
    pub driver: Option<String>,
    #[serde(default)]
    pub max_in_flight: Option<usize>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// `map_ids` may be a comma-separated string or a JSON array.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum MapIds {
    Joined(String),
    Many(Vec<String>),
}

impl MapIds {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            MapIds::Joined(value) => split_map_ids(&value),
            MapIds::Many(values) => values
                .into_iter()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .collect(),
        }
    }
}

/// Values given on the command line. They win over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub action: Option<String>,
    pub org_code: Option<String>,
    pub download_folder: Option<String>,
    pub extension: Option<String>,
    pub driver: Option<DriverKind>,
    pub max_in_flight: Option<usize>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub action: ActionMode,
    pub org: OrganismCode,
    pub topic: Option<String>,
    pub map_ids: Vec<String>,
    pub input_file: Option<String>,
    pub output_dir: Utf8PathBuf,
    pub extension: String,
    pub driver: DriverKind,
    pub max_in_flight: Option<usize>,
    pub base_url: String,
    pub timeout: Duration,
    pub config_dir: Utf8PathBuf,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads the config file and returns it with the directory it lives in.
    ///
    /// An explicit path must exist. Without one, `kpwd.json` in the current
    /// directory is used when present, otherwise every field is defaulted.
    pub fn load(path: Option<&str>) -> Result<(Config, Utf8PathBuf), KpwdError> {
        let config_path = match path {
            Some(path) => Utf8PathBuf::from(path),
            None => Utf8PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.as_std_path().exists() {
            debug!("no {DEFAULT_CONFIG_FILE} found, using defaults");
            return Ok((Config::default(), Utf8PathBuf::from(".")));
        }

        let content = fs::read_to_string(config_path.as_std_path())
            .map_err(|_| KpwdError::ConfigRead(config_path.clone().into_std_path_buf()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| KpwdError::ConfigParse(err.to_string()))?;

        let config_dir = config_path
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .map(|parent| parent.to_path_buf())
            .unwrap_or_else(|| Utf8PathBuf::from("."));
        Ok((config, config_dir))
    }

    pub fn resolve(path: Option<&str>, overrides: Overrides) -> Result<ResolvedConfig, KpwdError> {
        let (config, config_dir) = Self::load(path)?;
        Self::resolve_config(config, overrides, config_dir)
    }

    pub fn resolve_config(
        config: Config,
        overrides: Overrides,
        config_dir: Utf8PathBuf,
    ) -> Result<ResolvedConfig, KpwdError> {
        let action = overrides
            .action
            .or(config.action)
            .filter(|value| !value.trim().is_empty())
            .ok_or(KpwdError::MissingAction)?
            .parse::<ActionMode>()?;

        let org = match overrides.org_code.or(config.org_code) {
            Some(value) => value.parse::<OrganismCode>()?,
            None => OrganismCode::reference(),
        };
        if org.is_reference() {
            debug!("no organism code provided, fetching reference maps");
        } else {
            debug!(org = %org, "using organism code");
        }

        let driver = match (overrides.driver, config.driver) {
            (Some(driver), _) => driver,
            (None, Some(value)) => value.parse::<DriverKind>()?,
            (None, None) => DriverKind::default(),
        };

        let folder = overrides
            .download_folder
            .or(config.download_folder)
            .unwrap_or_else(|| DEFAULT_DOWNLOAD_FOLDER.to_string());
        let output_dir = Utf8PathBuf::from(normalize_output_dir(&folder));
        debug!(output_dir = %output_dir, "using output folder");

        let extension = overrides
            .extension
            .or(config.extension)
            .map(|value| value.trim().trim_start_matches('.').to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());

        let max_in_flight = overrides
            .max_in_flight
            .or(config.max_in_flight)
            .filter(|limit| *limit > 0);

        let base_url = overrides
            .base_url
            .or(config.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(ResolvedConfig {
            action,
            org,
            topic: config
                .topic
                .map(|topic| topic.trim().to_string())
                .filter(|topic| !topic.is_empty()),
            map_ids: config.map_ids.map(MapIds::into_vec).unwrap_or_default(),
            input_file: config.input_file,
            output_dir,
            extension,
            driver,
            max_in_flight,
            base_url,
            timeout: Duration::from_secs(config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            config_dir,
        })
    }
}

pub fn split_map_ids(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Output folders always start with `/` or `./` and end with `/`.
pub fn normalize_output_dir(folder: &str) -> String {
    let folder = folder.trim();
    let folder = if folder.is_empty() {
        DEFAULT_DOWNLOAD_FOLDER
    } else {
        folder
    };
    let mut output = if folder.starts_with('/') || folder.starts_with("./") {
        folder.to_string()
    } else {
        format!("/{folder}")
    };
    if !output.ends_with('/') {
        output.push('/');
    }
    output
}
