use std::f64::consts::FRAC_PI_2;

/// Slow periodic drift: `amplitude * sin(hours_ago / period_hours + phase)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waveform {
    pub amplitude: f64,
    pub period_hours: f64,
    /// Radians added after dividing by the period.
    pub phase: f64,
}

impl Waveform {
    pub fn value_at(&self, hours_ago: f64) -> f64 {
        self.amplitude * (hours_ago / self.period_hours + self.phase).sin()
    }
}

/// Shape of one channel: baseline, uniform noise span, optional drift and floor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelProfile {
    pub baseline: f64,
    /// Noise is drawn from `[0, noise_span)` and added to the baseline.
    pub noise_span: f64,
    pub waveform: Option<Waveform>,
    pub floor: Option<f64>,
}

impl ChannelProfile {
    pub const fn noise_only(baseline: f64, noise_span: f64) -> Self {
        Self {
            baseline,
            noise_span,
            waveform: None,
            floor: None,
        }
    }

    pub const fn with_waveform(mut self, amplitude: f64, period_hours: f64, phase: f64) -> Self {
        self.waveform = Some(Waveform {
            amplitude,
            period_hours,
            phase,
        });
        self
    }

    pub const fn with_floor(mut self, floor: f64) -> Self {
        self.floor = Some(floor);
        self
    }

    /// Combine a unit noise draw (`[0, 1)`) with the drift at `hours_ago`.
    pub fn sample(&self, unit_noise: f64, hours_ago: f64) -> f64 {
        let drift = self
            .waveform
            .map(|wave| wave.value_at(hours_ago))
            .unwrap_or(0.0);
        let value = self.baseline + unit_noise * self.noise_span + drift;
        match self.floor {
            Some(floor) => value.max(floor),
            None => value,
        }
    }

    /// Closed interval every sample of this channel falls in.
    pub fn bounds(&self) -> (f64, f64) {
        let amplitude = self.waveform.map(|wave| wave.amplitude.abs()).unwrap_or(0.0);
        let mut low = self.baseline - amplitude;
        let mut high = self.baseline + self.noise_span + amplitude;
        if let Some(floor) = self.floor {
            low = low.max(floor);
            high = high.max(floor);
        }
        (low, high)
    }
}

/// The four channel shapes used to synthesise one reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadingProfile {
    pub temperature: ChannelProfile,
    pub humidity: ChannelProfile,
    pub pressure: ChannelProfile,
    pub light: ChannelProfile,
}

impl ReadingProfile {
    /// Diurnal-looking curves for backfilled history.
    pub fn historical() -> Self {
        Self {
            temperature: ChannelProfile::noise_only(22.0, 8.0).with_waveform(3.0, 4.0, 0.0),
            // cosine
            humidity: ChannelProfile::noise_only(45.0, 20.0).with_waveform(5.0, 4.0, FRAC_PI_2),
            pressure: ChannelProfile::noise_only(1010.0, 10.0).with_waveform(5.0, 6.0, 0.0),
            // peak lags six hours behind temperature
            light: ChannelProfile::noise_only(500.0, 100.0)
                .with_waveform(400.0, 4.0, -1.5)
                .with_floor(0.0),
        }
    }

    /// Noise only, for current readings.
    pub fn live() -> Self {
        Self {
            temperature: ChannelProfile::noise_only(22.0, 8.0),
            humidity: ChannelProfile::noise_only(45.0, 20.0),
            pressure: ChannelProfile::noise_only(1010.0, 10.0),
            light: ChannelProfile::noise_only(300.0, 400.0).with_floor(0.0),
        }
    }
}
