use crate::latest::error::ResolveError;
use crate::latest::probe::AvailabilityProbe;
use crate::types::dataset::DatasetTime;
use chrono::{DateTime, Utc};
use log::info;

/// Cycles probed before giving up: the current one and the three before it.
pub const MAX_ATTEMPTS: usize = 4;

/// Finds the most recent GFS cycle the archive has published.
///
/// Starting from the synoptic floor of "now", each attempt asks the probe
/// about one cycle and steps back six hours on a miss.
pub struct LatestResolver<P> {
    probe: P,
    max_attempts: usize,
}

impl<P: AvailabilityProbe> LatestResolver<P> {
    pub fn new(probe: P) -> Self {
        Self {
            probe,
            max_attempts: MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Resolves relative to the current UTC time.
    pub async fn resolve(&self) -> Result<DatasetTime, ResolveError> {
        self.resolve_from(Utc::now()).await
    }

    /// Resolves relative to `now`.
    ///
    /// # Errors
    ///
    /// [`ResolveError::NoRecentData`] when none of the probed cycles is
    /// available. `last_tried` is the oldest cycle that was asked about.
    pub async fn resolve_from(&self, now: DateTime<Utc>) -> Result<DatasetTime, ResolveError> {
        let mut candidate = DatasetTime::floor_to_synoptic(now);
        let mut last_tried = candidate;

        for attempt in 1..=self.max_attempts {
            if self.probe.is_available(candidate).await {
                info!("Latest cycle is {} (attempt {})", candidate, attempt);
                return Ok(candidate);
            }
            last_tried = candidate;
            candidate = candidate.previous();
        }

        Err(ResolveError::NoRecentData {
            attempts: self.max_attempts,
            last_tried,
        })
    }
}
