//! telemetry/timers.rs
//! Wall-clock time per processing stage, reported by the file tools.

use std::collections::{btree_map, BTreeMap};
use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Processing stages in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Read,
    Unpack,
    Compare,
    Encode,
    Transmit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Read => "read",
            Stage::Unpack => "unpack",
            Stage::Compare => "compare",
            Stage::Encode => "encode",
            Stage::Transmit => "transmit",
        })
    }
}

/// Accumulated time per stage; stages never timed are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageTimes(BTreeMap<Stage, Duration>);

impl StageTimes {
    pub fn add(&mut self, stage: Stage, dur: Duration) {
        *self.0.entry(stage).or_default() += dur;
    }

    pub fn get(&self, stage: Stage) -> Duration {
        self.0.get(&stage).copied().unwrap_or_default()
    }

    pub fn total(&self) -> Duration {
        self.0.values().sum()
    }

    /// Timed stages in pipeline order.
    pub fn iter(&self) -> btree_map::Iter<'_, Stage, Duration> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a StageTimes {
    type Item = (&'a Stage, &'a Duration);
    type IntoIter = btree_map::Iter<'a, Stage, Duration>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// `read 0.0120 s, compare 1.3400 s`
impl fmt::Display for StageTimes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (stage, dur)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{stage} {:.4} s", dur.as_secs_f64())?;
        }
        Ok(())
    }
}

/// Run timer with per-stage breakdown.
#[derive(Clone, Debug)]
pub struct TelemetryTimer {
    started: Instant,
    stopped: Option<Instant>,
    pub stage_times: StageTimes,
}

impl Default for TelemetryTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryTimer {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            stopped: None,
            stage_times: StageTimes::default(),
        }
    }

    /// Freeze [`elapsed`](Self::elapsed). Later calls move the stop time.
    pub fn finish(&mut self) {
        self.stopped = Some(Instant::now());
    }

    /// Run `f` and charge its wall time to `stage`.
    pub fn time<T>(&mut self, stage: Stage, f: impl FnOnce() -> T) -> T {
        let t = Instant::now();
        let out = f();
        self.stage_times.add(stage, t.elapsed());
        out
    }

    pub fn elapsed(&self) -> Duration {
        self.stopped.unwrap_or_else(Instant::now).duration_since(self.started)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_accumulate_and_list_in_order() {
        let mut times = StageTimes::default();
        times.add(Stage::Compare, Duration::from_millis(30));
        times.add(Stage::Read, Duration::from_millis(10));
        times.add(Stage::Compare, Duration::from_millis(5));

        assert_eq!(times.get(Stage::Compare), Duration::from_millis(35));
        assert_eq!(times.get(Stage::Encode), Duration::ZERO);
        assert_eq!(times.total(), Duration::from_millis(45));
        let order: Vec<Stage> = times.iter().map(|(s, _)| *s).collect();
        assert_eq!(order, vec![Stage::Read, Stage::Compare]);
        assert_eq!(times.to_string(), "read 0.0100 s, compare 0.0350 s");
    }

    #[test]
    fn timer_returns_closure_value() {
        let mut timer = TelemetryTimer::new();
        let v = timer.time(Stage::Unpack, || 7);
        timer.finish();
        assert_eq!(v, 7);
        assert!(timer.elapsed() >= timer.stage_times.get(Stage::Unpack));
    }
}
