use chrono::NaiveDate;

/// Anything that can name the date of a GFS cycle.
///
/// NOMADS addresses cycles by an 8-digit `YYYYMMDD` date, so besides
/// [`NaiveDate`] this accepts that form as a string or as a plain number.
///
/// ```
/// use chrono::NaiveDate;
/// use gfs_profile::AnyDatasetDate;
///
/// let expected = NaiveDate::from_ymd_opt(2023, 1, 1);
/// assert_eq!("20230101".to_dataset_date(), expected);
/// assert_eq!(20230101u32.to_dataset_date(), expected);
/// assert_eq!("2023-01-01".to_dataset_date(), expected);
/// assert_eq!("2023011".to_dataset_date(), None);
/// ```
pub trait AnyDatasetDate {
    fn to_dataset_date(self) -> Option<NaiveDate>;
}

impl AnyDatasetDate for NaiveDate {
    fn to_dataset_date(self) -> Option<NaiveDate> {
        Some(self)
    }
}

impl AnyDatasetDate for &str {
    fn to_dataset_date(self) -> Option<NaiveDate> {
        let trimmed = self.trim();
        if trimmed.len() == 8 && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return NaiveDate::parse_from_str(trimmed, "%Y%m%d").ok();
        }
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()
    }
}

impl AnyDatasetDate for String {
    fn to_dataset_date(self) -> Option<NaiveDate> {
        self.as_str().to_dataset_date()
    }
}

impl AnyDatasetDate for &String {
    fn to_dataset_date(self) -> Option<NaiveDate> {
        self.as_str().to_dataset_date()
    }
}

impl AnyDatasetDate for u32 {
    fn to_dataset_date(self) -> Option<NaiveDate> {
        format!("{:08}", self).as_str().to_dataset_date()
    }
}

impl AnyDatasetDate for i64 {
    fn to_dataset_date(self) -> Option<NaiveDate> {
        u32::try_from(self).ok()?.to_dataset_date()
    }
}
