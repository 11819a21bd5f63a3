//! Reads the pressure-level fields out of a GRIB2 file.

use crate::profile::error::DatasetError;
use log::{debug, warn};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// GRIB2 code table 4.5: isobaric surface, value in Pa.
pub const ISOBARIC_SURFACE_TYPE: u8 = 100;

/// One decoded 2-D field on a single pressure level.
#[derive(Debug, Clone, PartialEq)]
pub struct GridField {
    pub variable: String,
    pub level_hpa: f64,
    pub latitudes: Vec<f64>,
    pub longitudes: Vec<f64>,
    pub values: Vec<f64>,
}

impl GridField {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Decodes every isobaric submessage of the file at `path`.
///
/// Submessages on other surface types are ignored. Submessages whose grid or
/// data section cannot be decoded are skipped with a warning.
pub fn read_isobaric_fields(path: &Path) -> Result<Vec<GridField>, DatasetError> {
    let file = File::open(path).map_err(|e| DatasetError::Open(path.to_path_buf(), e))?;
    let grib2 = grib::from_reader(BufReader::new(file))
        .map_err(|e| DatasetError::Decode(path.to_path_buf(), e))?;

    let mut fields = Vec::new();
    for (index, submsg) in grib2.iter() {
        let discipline = submsg.indicator().discipline;
        let prod_def = submsg.prod_def();
        let level_hpa = prod_def
            .fixed_surfaces()
            .and_then(|(first, _)| isobaric_level_hpa(first.surface_type, first.value()));
        let Some(level_hpa) = level_hpa else {
            continue;
        };
        let variable = short_name(
            discipline,
            prod_def.parameter_category(),
            prod_def.parameter_number(),
        );

        let latlons: Vec<(f32, f32)> = match submsg.latlons() {
            Ok(points) => points.collect(),
            Err(e) => {
                warn!("Skipping {} at {} hPa ({:?}): {}", variable, level_hpa, index, e);
                continue;
            }
        };

        let decoded = grib::Grib2SubmessageDecoder::from(submsg).and_then(|decoder| {
            let values: Vec<f32> = decoder.dispatch()?.collect();
            Ok::<_, grib::GribError>(values)
        });
        let values = match decoded {
            Ok(values) => values,
            Err(e) => {
                warn!("Skipping {} at {} hPa ({:?}): {}", variable, level_hpa, index, e);
                continue;
            }
        };

        if latlons.len() != values.len() {
            warn!(
                "Skipping {} at {} hPa: {} grid points but {} values",
                variable,
                level_hpa,
                latlons.len(),
                values.len()
            );
            continue;
        }

        debug!("Decoded {} at {} hPa, {} points", variable, level_hpa, values.len());
        fields.push(GridField {
            variable,
            level_hpa,
            latitudes: latlons.iter().map(|&(lat, _)| f64::from(lat)).collect(),
            longitudes: latlons.iter().map(|&(_, lon)| f64::from(lon)).collect(),
            values: values.into_iter().map(f64::from).collect(),
        });
    }

    if fields.is_empty() {
        return Err(DatasetError::NoIsobaricFields(path.to_path_buf()));
    }
    Ok(fields)
}

fn isobaric_level_hpa(surface_type: u8, value_pa: f64) -> Option<f64> {
    (surface_type == ISOBARIC_SURFACE_TYPE).then_some(value_pa / 100.0)
}

/// Short variable names for the fields the download presets request.
/// Anything else gets a name derived from its discipline/category/number.
pub fn short_name(discipline: u8, category: Option<u8>, number: Option<u8>) -> String {
    let name = match (discipline, category, number) {
        (0, Some(0), Some(0)) => "t",
        (0, Some(1), Some(0)) => "q",
        (0, Some(1), Some(1)) => "r",
        (0, Some(2), Some(2)) => "u",
        (0, Some(2), Some(3)) => "v",
        (0, Some(2), Some(8)) => "w",
        (0, Some(2), Some(9)) => "wz",
        (0, Some(2), Some(10)) => "absv",
        (0, Some(3), Some(5)) => "gh",
        _ => {
            return format!(
                "unknown_{}_{}_{}",
                discipline,
                category.map_or("x".to_string(), |c| c.to_string()),
                number.map_or("x".to_string(), |n| n.to_string())
            )
        }
    };
    name.to_string()
}
