//! Synthetic signal generation.
//!
//! Every channel is `baseline + uniform noise + slow waveform`, see
//! [`ChannelProfile`]. Backfill uses the historical profile so a day of hourly
//! readings traces a smooth curve; the stream uses the noise-only live profile.

mod profile;

pub use profile::{ChannelProfile, ReadingProfile, Waveform};

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::Reading;

pub struct SignalModel {
    rng: StdRng,
    historical: ReadingProfile,
    live: ReadingProfile,
}

impl SignalModel {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Deterministic noise, for tests and reproducible seeding runs.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng,
            historical: ReadingProfile::historical(),
            live: ReadingProfile::live(),
        }
    }

    pub fn historical_profile(&self) -> &ReadingProfile {
        &self.historical
    }

    pub fn live_profile(&self) -> &ReadingProfile {
        &self.live
    }

    /// Reading for `now - hours_ago`, with the waveform evaluated at `hours_ago`.
    pub fn reading_at(&mut self, now: DateTime<Utc>, hours_ago: u32) -> Reading {
        let profile = self.historical;
        let timestamp = now - Duration::hours(i64::from(hours_ago));
        self.synthesize(&profile, timestamp, f64::from(hours_ago))
    }

    /// Reading stamped `now`, noise only.
    pub fn live_reading(&mut self, now: DateTime<Utc>) -> Reading {
        let profile = self.live;
        self.synthesize(&profile, now, 0.0)
    }

    fn synthesize(
        &mut self,
        profile: &ReadingProfile,
        timestamp: DateTime<Utc>,
        hours_ago: f64,
    ) -> Reading {
        Reading {
            timestamp,
            temperature: profile.temperature.sample(self.rng.gen::<f64>(), hours_ago),
            humidity: profile.humidity.sample(self.rng.gen::<f64>(), hours_ago),
            pressure: profile.pressure.sample(self.rng.gen::<f64>(), hours_ago),
            light: profile.light.sample(self.rng.gen::<f64>(), hours_ago),
        }
    }
}

impl Default for SignalModel {
    fn default() -> Self {
        Self::new()
    }
}
