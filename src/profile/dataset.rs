use crate::profile::error::DatasetError;
use crate::profile::grib_loader::{read_isobaric_fields, GridField};
use crate::types::dataset::LatLon;
use log::info;
use ordered_float::OrderedFloat;
use polars::prelude::*;
use std::collections::BTreeSet;
use std::path::Path;

/// Short name of the temperature field.
pub const TEMPERATURE: &str = "t";

/// Temperature at every pressure level of one grid column.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureProfile {
    /// The coordinate that was asked for.
    pub requested: LatLon,
    /// The grid point the profile was taken from.
    pub grid_point: LatLon,
    /// Pressure levels in hPa, highest pressure (closest to the surface) first.
    pub levels_hpa: Vec<f64>,
    /// Temperature in K, aligned with `levels_hpa`.
    pub temperature_k: Vec<f64>,
}

impl TemperatureProfile {
    pub fn len(&self) -> usize {
        self.levels_hpa.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels_hpa.is_empty()
    }

    /// Two columns, `pressure` (hPa) and `temperature` (K).
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        df!(
            "pressure" => self.levels_hpa.as_slice(),
            "temperature" => self.temperature_k.as_slice(),
        )
    }
}

/// The pressure-level content of one GRIB file, held as a long-format polars
/// frame with the columns `variable`, `level` (hPa), `latitude`, `longitude`
/// and `value`.
#[derive(Debug, Clone)]
pub struct IsobaricDataset {
    frame: DataFrame,
    latitudes: Vec<f64>,
    longitudes: Vec<f64>,
    levels: Vec<f64>,
    variables: Vec<String>,
}

impl IsobaricDataset {
    /// Decodes the file at `path` on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// [`DatasetError::Open`] / [`DatasetError::Decode`] for unreadable files,
    /// [`DatasetError::NoIsobaricFields`] when nothing on pressure levels
    /// could be decoded.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref().to_path_buf();
        info!("Opening {}", path.display());
        let fields = tokio::task::spawn_blocking(move || read_isobaric_fields(&path)).await??;
        Self::from_fields(fields)
    }

    pub fn from_fields(fields: Vec<GridField>) -> Result<Self, DatasetError> {
        let capacity: usize = fields.iter().map(GridField::len).sum();
        let mut variable = Vec::with_capacity(capacity);
        let mut level = Vec::with_capacity(capacity);
        let mut latitude = Vec::with_capacity(capacity);
        let mut longitude = Vec::with_capacity(capacity);
        let mut value = Vec::with_capacity(capacity);

        let mut lat_axis = BTreeSet::new();
        let mut lon_axis = BTreeSet::new();
        let mut level_axis = BTreeSet::new();
        let mut variables = BTreeSet::new();

        for field in &fields {
            let points = field
                .latitudes
                .iter()
                .zip(&field.longitudes)
                .zip(&field.values);
            for ((&lat, &lon), &v) in points {
                variable.push(field.variable.clone());
                level.push(field.level_hpa);
                latitude.push(lat);
                longitude.push(lon);
                value.push(v);
                lat_axis.insert(OrderedFloat(lat));
                lon_axis.insert(OrderedFloat(lon));
            }
            if !field.is_empty() {
                level_axis.insert(OrderedFloat(field.level_hpa));
                variables.insert(field.variable.clone());
            }
        }

        if value.is_empty() {
            return Err(DatasetError::EmptyGrid);
        }

        let frame = df!(
            "variable" => variable,
            "level" => level,
            "latitude" => latitude,
            "longitude" => longitude,
            "value" => value,
        )?;

        Ok(Self {
            frame,
            latitudes: lat_axis.into_iter().map(OrderedFloat::into_inner).collect(),
            longitudes: lon_axis.into_iter().map(OrderedFloat::into_inner).collect(),
            levels: level_axis.into_iter().map(OrderedFloat::into_inner).collect(),
            variables: variables.into_iter().collect(),
        })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Distinct latitudes, ascending.
    pub fn latitudes(&self) -> &[f64] {
        &self.latitudes
    }

    /// Distinct longitudes, ascending.
    pub fn longitudes(&self) -> &[f64] {
        &self.longitudes
    }

    /// Distinct pressure levels in hPa, ascending.
    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn has_variable(&self, variable: &str) -> bool {
        self.variables.iter().any(|v| v == variable)
    }

    /// Snaps `point` to the grid, axis by axis. On an exact tie between two
    /// axis values the lower one wins. Points outside the grid snap to its
    /// edge.
    pub fn nearest_point(&self, point: LatLon) -> Result<LatLon, DatasetError> {
        let lat = nearest_on_axis(&self.latitudes, point.0).ok_or(DatasetError::EmptyGrid)?;
        let lon = nearest_on_axis(&self.longitudes, point.1).ok_or(DatasetError::EmptyGrid)?;
        Ok(LatLon(lat, lon))
    }

    /// Rows of `variable` at exactly `grid_point`, as `level` / `value`
    /// columns sorted by level, highest pressure first.
    pub fn profile_frame(
        &self,
        variable: &str,
        grid_point: LatLon,
    ) -> Result<DataFrame, DatasetError> {
        let frame = self
            .frame
            .clone()
            .lazy()
            .filter(
                col("variable")
                    .eq(lit(variable))
                    .and(col("latitude").eq(lit(grid_point.0)))
                    .and(col("longitude").eq(lit(grid_point.1))),
            )
            .select([col("level"), col("value")])
            .sort(
                ["level"],
                SortMultipleOptions::default().with_order_descending(true),
            )
            .collect()?;
        Ok(frame)
    }

    /// Temperature against pressure at the grid point nearest to `point`.
    pub fn temperature_profile(&self, point: LatLon) -> Result<TemperatureProfile, DatasetError> {
        if !self.has_variable(TEMPERATURE) {
            return Err(DatasetError::VariableNotFound {
                variable: TEMPERATURE.to_string(),
            });
        }

        let grid_point = self.nearest_point(point)?;
        let frame = self.profile_frame(TEMPERATURE, grid_point)?;
        let levels_hpa = frame.column("level")?.f64()?.into_no_null_iter().collect();
        let temperature_k = frame.column("value")?.f64()?.into_no_null_iter().collect();

        Ok(TemperatureProfile {
            requested: point,
            grid_point,
            levels_hpa,
            temperature_k,
        })
    }
}

fn nearest_on_axis(axis: &[f64], target: f64) -> Option<f64> {
    axis.iter()
        .copied()
        .min_by_key(|v| OrderedFloat((v - target).abs()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LATS: [f64; 3] = [36.0, 37.0, 38.0];
    const LONS: [f64; 3] = [126.0, 126.5, 127.0];
    const LEVELS: [f64; 4] = [500.0, 1000.0, 850.0, 925.0];

    fn synthetic_value(level: f64, lat: f64, lon: f64) -> f64 {
        200.0 + level / 10.0 + lat / 10.0 + lon / 1000.0
    }

    fn field(variable: &str, level: f64) -> GridField {
        let mut latitudes = Vec::new();
        let mut longitudes = Vec::new();
        let mut values = Vec::new();
        for lat in LATS.iter().rev() {
            for lon in LONS {
                latitudes.push(*lat);
                longitudes.push(lon);
                values.push(synthetic_value(level, *lat, lon));
            }
        }
        GridField {
            variable: variable.to_string(),
            level_hpa: level,
            latitudes,
            longitudes,
            values,
        }
    }

    fn synthetic_dataset() -> IsobaricDataset {
        let mut fields: Vec<GridField> = LEVELS.iter().map(|&l| field("t", l)).collect();
        fields.push(field("gh", 500.0));
        IsobaricDataset::from_fields(fields).unwrap()
    }

    #[test]
    fn test_axes_are_sorted_and_unique() {
        let ds = synthetic_dataset();
        assert_eq!(ds.latitudes(), &LATS);
        assert_eq!(ds.longitudes(), &LONS);
        assert_eq!(ds.levels(), &[500.0, 850.0, 925.0, 1000.0]);
        assert_eq!(ds.variables(), &["gh".to_string(), "t".to_string()]);
        assert_eq!(ds.frame().height(), 5 * 9);
    }

    #[test]
    fn test_default_point_snaps_to_grid() {
        let ds = synthetic_dataset();
        let grid = ds.nearest_point(LatLon(37.25, 126.5)).unwrap();
        assert_eq!(grid, LatLon(37.0, 126.5));
    }

    #[test]
    fn test_tie_prefers_lower_axis_value() {
        let ds = synthetic_dataset();
        let grid = ds.nearest_point(LatLon(36.5, 126.25)).unwrap();
        assert_eq!(grid, LatLon(36.0, 126.0));
    }

    #[test]
    fn test_outside_point_snaps_to_edge() {
        let ds = synthetic_dataset();
        assert_eq!(
            ds.nearest_point(LatLon(-10.0, 180.0)).unwrap(),
            LatLon(36.0, 127.0)
        );
    }

    #[test]
    fn test_temperature_profile_at_nearest_point() {
        let ds = synthetic_dataset();
        let profile = ds.temperature_profile(LatLon(37.25, 126.5)).unwrap();

        assert_eq!(profile.requested, LatLon(37.25, 126.5));
        assert_eq!(profile.grid_point, LatLon(37.0, 126.5));
        assert_eq!(profile.levels_hpa, vec![1000.0, 925.0, 850.0, 500.0]);
        let expected: Vec<f64> = profile
            .levels_hpa
            .iter()
            .map(|&level| synthetic_value(level, 37.0, 126.5))
            .collect();
        assert_eq!(profile.temperature_k, expected);
    }

    #[test]
    fn test_profile_frame_only_holds_requested_variable() -> Result<(), DatasetError> {
        let ds = synthetic_dataset();
        let frame = ds.profile_frame("gh", LatLon(38.0, 127.0))?;
        assert_eq!(frame.height(), 1);
        assert_eq!(frame.column("level")?.f64()?.get(0), Some(500.0));
        Ok(())
    }

    #[test]
    fn test_profile_to_frame() -> Result<(), DatasetError> {
        let ds = synthetic_dataset();
        let frame = ds.temperature_profile(LatLon(36.0, 126.0))?.to_frame()?;
        assert!(frame.column("pressure").is_ok());
        assert!(frame.column("temperature").is_ok());
        assert_eq!(frame.height(), LEVELS.len());
        Ok(())
    }

    #[test]
    fn test_missing_temperature() {
        let ds = IsobaricDataset::from_fields(vec![field("gh", 500.0)]).unwrap();
        let err = ds.temperature_profile(LatLon(37.25, 126.5)).unwrap_err();
        assert!(matches!(err, DatasetError::VariableNotFound { variable } if variable == "t"));
    }

    #[test]
    fn test_empty_fields() {
        let err = IsobaricDataset::from_fields(Vec::new()).unwrap_err();
        assert!(matches!(err, DatasetError::EmptyGrid));
    }

    #[tokio::test]
    async fn test_open_garbage_file_fails() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("2023010100.anl");
        std::fs::write(&path, b"GRIBDATA").unwrap();

        assert!(IsobaricDataset::open(&path).await.is_err());
    }
}
