//! Request configuration for the NOMADS GFS 0.25° filter service.
//!
//! The filter CGI takes the product name, one `lev_*`/`var_*` switch per
//! requested level and variable, an optional subregion and the cycle
//! directory. [`FetchConfig`] enumerates those knobs and renders the URLs.

use crate::types::dataset::{DatasetId, DatasetTime};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "https://nomads.ncep.noaa.gov/cgi-bin/filter_gfs_0p25.pl";
pub const DEFAULT_DATA_DIR: &str = "data";
/// Read size for streaming downloads and the listing probe (256 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 256 * 1024;

/// Geographic subregion in degrees. Longitudes follow the GFS 0–360 convention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left_lon: f64,
    pub right_lon: f64,
    pub top_lat: f64,
    pub bottom_lat: f64,
}

impl Default for BoundingBox {
    /// The Korean peninsula: 33–38°N, 124–132°E.
    fn default() -> Self {
        Self {
            left_lon: 124.0,
            right_lon: 132.0,
            top_lat: 38.0,
            bottom_lat: 33.0,
        }
    }
}

/// A vertical level as named by the filter service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    /// Isobaric surface in millibar (`lev_500_mb`).
    Isobaric(u32),
    /// Any other surface, by its filter name (`lev_10_m_above_ground`).
    Named(String),
}

impl Level {
    fn query_key(&self) -> String {
        match self {
            Level::Isobaric(mb) => format!("lev_{}_mb", mb),
            Level::Named(name) => format!("lev_{}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelSelection {
    All,
    Only(Vec<Level>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableSelection {
    All,
    /// Filter variable names, e.g. `TMP`, `HGT`.
    Only(Vec<String>),
}

/// What to do when the target file is already in the data directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExistingFilePolicy {
    /// Refuse before any network traffic.
    #[default]
    Fail,
    /// Replace the existing file once the new download has completed.
    Overwrite,
}

/// Everything a fetch needs besides the dataset identifier.
///
/// Two presets exist: [`FetchConfig::curated`] asks for the pressure levels and
/// upper-air variables needed for soundings, [`FetchConfig::all_fields`] asks for
/// every level and variable. Both restrict the grid to [`BoundingBox::default`].
///
/// ```
/// use gfs_profile::{ExistingFilePolicy, FetchConfig};
///
/// let config = FetchConfig::all_fields()
///     .with_data_dir("/tmp/gfs")
///     .with_existing_file(ExistingFilePolicy::Overwrite);
/// assert_eq!(config.data_dir.to_str(), Some("/tmp/gfs"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub base_url: String,
    pub data_dir: PathBuf,
    /// `None` requests the global grid.
    pub bounding_box: Option<BoundingBox>,
    pub levels: LevelSelection,
    pub variables: VariableSelection,
    pub existing_file: ExistingFilePolicy,
    pub chunk_size: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::curated()
    }
}

impl FetchConfig {
    /// Pressure levels 1–1000 mb plus 10 m above ground, and the upper-air
    /// variables ABSV, DZDT, HGT, RH, SPFH, TMP, UGRD, VGRD and VVEL.
    pub fn curated() -> Self {
        let mut levels = Vec::with_capacity(CURATED_LEVELS.len());
        for name in CURATED_LEVELS {
            levels.push(match name.strip_suffix("_mb") {
                Some(mb) => Level::Isobaric(mb.parse().unwrap_or_default()),
                None => Level::Named(name.to_string()),
            });
        }
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            bounding_box: Some(BoundingBox::default()),
            levels: LevelSelection::Only(levels),
            variables: VariableSelection::Only(
                CURATED_VARIABLES.iter().map(|v| v.to_string()).collect(),
            ),
            existing_file: ExistingFilePolicy::Fail,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Every level and variable inside the default subregion.
    pub fn all_fields() -> Self {
        Self {
            levels: LevelSelection::All,
            variables: VariableSelection::All,
            ..Self::curated()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_bounding_box(mut self, bounding_box: Option<BoundingBox>) -> Self {
        self.bounding_box = bounding_box;
        self
    }

    pub fn with_existing_file(mut self, policy: ExistingFilePolicy) -> Self {
        self.existing_file = policy;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Reads a JSON preset. Missing keys fall back to [`FetchConfig::curated`].
    pub fn from_json_file(path: &Path) -> Result<Self, serde_json::Error> {
        let contents = std::fs::read_to_string(path).map_err(serde_json::Error::io)?;
        serde_json::from_str(&contents)
    }

    /// Full filter URL for one product.
    pub fn dataset_url(&self, id: &DatasetId) -> String {
        let mut url = format!("{}?file={}", self.base_url, id.remote_file_name());

        match &self.levels {
            LevelSelection::All => url.push_str("&all_lev=on"),
            LevelSelection::Only(levels) => {
                for level in levels {
                    let _ = write!(url, "&{}=on", level.query_key());
                }
            }
        }
        match &self.variables {
            VariableSelection::All => url.push_str("&all_var=on"),
            VariableSelection::Only(variables) => {
                for variable in variables {
                    let _ = write!(url, "&var_{}=on", variable);
                }
            }
        }
        if let Some(bbox) = &self.bounding_box {
            let _ = write!(
                url,
                "&subregion=&leftlon={}&rightlon={}&toplat={}&bottomlat={}",
                bbox.left_lon, bbox.right_lon, bbox.top_lat, bbox.bottom_lat
            );
        }
        url.push_str(&cycle_dir_param(&id.time));
        url
    }

    /// Directory listing URL used to probe whether a cycle has been published.
    pub fn listing_url(&self, time: &DatasetTime) -> String {
        format!("{}?{}", self.base_url, &cycle_dir_param(time)[1..])
    }
}

fn cycle_dir_param(time: &DatasetTime) -> String {
    format!(
        "&dir=%2Fgfs.{}%2F{}%2Fatmos",
        time.date_string(),
        time.hour_string()
    )
}

const CURATED_LEVELS: [&str; 34] = [
    "1000_mb",
    "100_mb",
    "10_m_above_ground",
    "10_mb",
    "150_mb",
    "15_mb",
    "1_mb",
    "200_mb",
    "20_mb",
    "250_mb",
    "2_mb",
    "300_mb",
    "30_mb",
    "350_mb",
    "3_mb",
    "400_mb",
    "40_mb",
    "450_mb",
    "500_mb",
    "50_mb",
    "550_mb",
    "5_mb",
    "600_mb",
    "650_mb",
    "700_mb",
    "70_mb",
    "750_mb",
    "7_mb",
    "800_mb",
    "850_mb",
    "900_mb",
    "925_mb",
    "950_mb",
    "975_mb",
];

const CURATED_VARIABLES: [&str; 9] = [
    "ABSV", "DZDT", "HGT", "RH", "SPFH", "TMP", "UGRD", "VGRD", "VVEL",
];
