//! Idle/busy load estimate.

/// Ticks between load samples.
pub const SAMPLE_INTERVAL: u32 = 13;
/// Ticks between load reports.
pub const REPORT_INTERVAL: u32 = 47;

/// Share of busy ticks, in percent, rounded down. Zero when nothing was
/// counted.
pub fn load_percent(idle: u16, busy: u16) -> u8 {
    let total = idle as u32 + busy as u32;
    if total == 0 {
        return 0;
    }
    (busy as u32 * 100 / total) as u8
}

/// Accumulates load samples between reports.
///
/// Each sample is taken from the transport's idle/busy counters, which
/// keep counting until the caller resets them when the window closes.
/// Closing the window yields the average and peak of the samples seen
/// since the previous report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadMeter {
    sum: u32,
    peak: u8,
    samples: u16,
    last_average: u8,
}

/// Load figures for one report window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoadReport {
    pub average: u8,
    pub peak: u8,
    pub samples: u16,
}

impl LoadMeter {
    pub const fn new() -> Self {
        Self {
            sum: 0,
            peak: 0,
            samples: 0,
            last_average: 0,
        }
    }

    pub fn sample(&mut self, idle: u16, busy: u16) -> u8 {
        let percent = load_percent(idle, busy);
        self.sum += percent as u32;
        self.peak = self.peak.max(percent);
        self.samples = self.samples.saturating_add(1);
        percent
    }

    /// Average of the last closed window.
    pub fn last_average(&self) -> u8 {
        self.last_average
    }

    /// Report the window and start a new one. An empty window repeats the
    /// previous average.
    pub fn close_window(&mut self) -> LoadReport {
        if self.samples > 0 {
            self.last_average = (self.sum / self.samples as u32) as u8;
        }
        let report = LoadReport {
            average: self.last_average,
            peak: self.peak,
            samples: self.samples,
        };
        self.sum = 0;
        self.peak = 0;
        self.samples = 0;
        report
    }
}
