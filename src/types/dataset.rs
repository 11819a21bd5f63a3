//! Identifiers for GFS datasets: the model cycle ([`DatasetTime`]) and the
//! concrete product inside that cycle ([`DatasetId`]).

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Timelike, Utc};
use std::fmt;
use std::fmt::{Display, Formatter};

/// Hours between two consecutive GFS cycles.
pub const SYNOPTIC_STEP_HOURS: u32 = 6;

/// A GFS model cycle: the UTC date plus the initialization hour.
///
/// Only the synoptic hours 00, 06, 12 and 18 carry data on NOMADS. Other
/// hours are accepted here and rejected by the remote archive.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use gfs_profile::DatasetTime;
///
/// let time = DatasetTime::new(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(), 6);
/// assert_eq!(time.date_string(), "20230101");
/// assert_eq!(time.hour_string(), "06");
/// assert_eq!(time.to_string(), "2023010106");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DatasetTime {
    pub date: NaiveDate,
    pub hour: u32,
}

impl DatasetTime {
    pub fn new(date: NaiveDate, hour: u32) -> Self {
        Self { date, hour }
    }

    /// The most recent cycle that could have started at `now`: the UTC date of
    /// `now` and its hour floored to a multiple of six.
    pub fn floor_to_synoptic(now: DateTime<Utc>) -> Self {
        Self {
            date: now.date_naive(),
            hour: (now.hour() / SYNOPTIC_STEP_HOURS) * SYNOPTIC_STEP_HOURS,
        }
    }

    /// The cycle six hours earlier. Crosses day, month and year boundaries.
    pub fn previous(&self) -> Self {
        let start = self.date.and_time(NaiveTime::MIN) + Duration::hours(i64::from(self.hour));
        let earlier = start - Duration::hours(i64::from(SYNOPTIC_STEP_HOURS));
        Self {
            date: earlier.date(),
            hour: earlier.hour(),
        }
    }

    pub fn is_synoptic(&self) -> bool {
        matches!(self.hour, 0 | 6 | 12 | 18)
    }

    /// `YYYYMMDD`, as used in NOMADS directory names.
    pub fn date_string(&self) -> String {
        self.date.format("%Y%m%d").to_string()
    }

    /// Zero-padded two digit hour.
    pub fn hour_string(&self) -> String {
        format!("{:02}", self.hour)
    }
}

impl Display for DatasetTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:02}", self.date.format("%Y%m%d"), self.hour)
    }
}

/// A single downloadable product: a cycle plus an optional forecast offset.
///
/// `forecast_offset == None` is the analysis snapshot (`anl`), otherwise the
/// forecast `offset` hours ahead of the cycle (`f003`, `f012`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DatasetId {
    pub time: DatasetTime,
    pub forecast_offset: Option<u32>,
}

impl DatasetId {
    pub fn new(time: DatasetTime, forecast_offset: Option<u32>) -> Self {
        Self {
            time,
            forecast_offset,
        }
    }

    pub fn analysis(time: DatasetTime) -> Self {
        Self::new(time, None)
    }

    pub fn is_analysis(&self) -> bool {
        self.forecast_offset.is_none()
    }

    /// `anl` for the analysis, `fNNN` for a forecast offset.
    pub fn extension(&self) -> String {
        match self.forecast_offset {
            Some(offset) => format!("f{:03}", offset),
            None => "anl".to_string(),
        }
    }

    /// Local file name: `{YYYYMMDD}{HH}.{ext}`.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use gfs_profile::{DatasetId, DatasetTime};
    ///
    /// let time = DatasetTime::new(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(), 6);
    /// assert_eq!(DatasetId::new(time, Some(12)).file_name(), "2023010106.f012");
    /// assert_eq!(DatasetId::analysis(time).file_name(), "2023010106.anl");
    /// ```
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.time, self.extension())
    }

    /// Name of the product on the NOMADS side.
    pub fn remote_file_name(&self) -> String {
        format!(
            "gfs.t{}z.pgrb2.0p25.{}",
            self.time.hour_string(),
            self.extension()
        )
    }
}

impl Display for DatasetId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

/// Represents a geographical coordinate using latitude and longitude.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
///
/// # Examples
///
/// ```
/// use gfs_profile::LatLon;
///
/// let seoul = LatLon(37.5665, 126.9780);
/// assert_eq!(seoul.0, 37.5665); // Latitude
/// assert_eq!(seoul.1, 126.9780); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon(pub f64, pub f64);

impl Display for LatLon {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}
