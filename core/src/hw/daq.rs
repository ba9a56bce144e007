//! hw/daq.rs
//! Local DAQ session: configures the board, then drains the last-event FIFO
//! into a spy text file until cancelled.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::hw::poll::{poll_until, CancelToken, PollOutcome, PollPolicy};
use crate::hw::registers::{
    RegisterAccess, DAQ_ENABLE, DAQ_FREEZE_ON_ERROR, DAQ_IGNORE_AMC13, DAQ_INPUT_ENABLE_MASK,
    DAQ_LAST_EVENT_DATA, DAQ_LAST_EVENT_DISABLE, DAQ_LAST_EVENT_EMPTY, DAQ_RESET,
    DAQ_RESET_TILL_RESYNC, DAQ_SPY_EVENTS_SENT, DAQ_SPY_PRESCALE, DAQ_SPY_SKIP_EMPTY_EVENTS,
    DAQ_TTS_STATE, GBE_ENABLE, TTC_L1A_ENABLE, TTC_MODULE_RESET, TTS_ERROR,
};
use crate::stream::SpyTextWriter;
use crate::types::{DaqError, Word};

/// Spy file name for a run started at `now`.
pub fn default_run_filename(now: DateTime<Local>) -> String {
    format!("run_{}.raw", now.format("%Y-%m-%d__%H_%M_%S"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaqConfig {
    /// Bit set per enabled DAQ input.
    pub input_mask: u32,
    pub ignore_amc13: bool,
    /// Hold the DAQ in reset until a resync arrives.
    pub reset_till_resync: bool,
    pub freeze_on_error: bool,
    pub spy_skip_empty_events: bool,
    pub spy_prescale: u32,
    /// Sleep when the FIFO is empty.
    #[serde(with = "millis")]
    pub idle_backoff: Duration,
    /// Re-check interval while the TTS state reports an error.
    #[serde(with = "millis")]
    pub tts_backoff: Duration,
}

impl Default for DaqConfig {
    fn default() -> Self {
        Self {
            input_mask: 0x7efd,
            ignore_amc13: true,
            reset_till_resync: true,
            freeze_on_error: false,
            spy_skip_empty_events: true,
            spy_prescale: 4,
            idle_backoff: Duration::ZERO,
            tts_backoff: Duration::from_millis(100),
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

/// Session totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DaqSummary {
    pub events_read: u64,
    pub words_read: u64,
    pub tts_errors: u64,
    /// Last value of the spy-sent counter register.
    pub spy_events_sent: u32,
    pub spy_path: Option<PathBuf>,
}

/// Explicit DAQ context: register handle, settings and optional spy output.
pub struct DaqSession<R: RegisterAccess> {
    regs: R,
    config: DaqConfig,
    spy: Option<SpyTextWriter<BufWriter<File>>>,
    summary: DaqSummary,
    cancel: Option<CancelToken>,
}

impl<R: RegisterAccess> DaqSession<R> {
    pub fn new(regs: R, config: DaqConfig) -> Self {
        Self {
            regs,
            config,
            spy: None,
            summary: DaqSummary::default(),
            cancel: None,
        }
    }

    /// Read events out locally into `path`. Without a spy file the session
    /// only watches the TTS state.
    pub fn with_spy_file(mut self, path: impl AsRef<Path>) -> Result<Self, DaqError> {
        let path = path.as_ref();
        let file = File::create(path)?;
        self.spy = Some(SpyTextWriter::new(BufWriter::new(file)));
        self.summary.spy_path = Some(path.to_path_buf());
        Ok(self)
    }

    pub fn config(&self) -> &DaqConfig {
        &self.config
    }

    pub fn summary(&self) -> &DaqSummary {
        &self.summary
    }

    /// Reset and enable sequence.
    pub fn start(&mut self) -> Result<(), DaqError> {
        let c = &self.config;
        let sequence: [(&str, u32); 15] = [
            (TTC_MODULE_RESET, 1),
            (TTC_L1A_ENABLE, 0),
            (GBE_ENABLE, 0),
            (DAQ_ENABLE, 0),
            (DAQ_INPUT_ENABLE_MASK, c.input_mask),
            (DAQ_IGNORE_AMC13, u32::from(c.ignore_amc13)),
            (DAQ_FREEZE_ON_ERROR, u32::from(c.freeze_on_error)),
            (DAQ_RESET_TILL_RESYNC, u32::from(c.reset_till_resync)),
            (DAQ_SPY_SKIP_EMPTY_EVENTS, u32::from(c.spy_skip_empty_events)),
            (DAQ_SPY_PRESCALE, c.spy_prescale),
            (DAQ_RESET, 1),
            (DAQ_LAST_EVENT_DISABLE, 0),
            (DAQ_ENABLE, 1),
            (TTC_L1A_ENABLE, 1),
            (DAQ_RESET, 0),
        ];
        for (name, value) in sequence {
            self.regs.write(name, value)?;
        }
        info!(input_mask = c.input_mask, "DAQ started");
        Ok(())
    }

    /// One pass: drain one event (when reading out locally), then check the
    /// TTS state. Returns the drained event's word count.
    pub fn poll_once(&mut self) -> Result<Option<usize>, DaqError> {
        let drained = if self.spy.is_some() { self.drain_event()? } else { None };

        self.summary.spy_events_sent = self.regs.read(DAQ_SPY_EVENTS_SENT)?;
        if self.summary.events_read % 10 == 0 && drained.is_some() {
            debug!(
                read = self.summary.events_read,
                spy_sent = self.summary.spy_events_sent,
                "DAQ progress"
            );
        }

        self.check_tts()?;
        Ok(drained)
    }

    /// Poll until `cancel` is set. Cancellation is checked between events
    /// only, so an event is never left half-written.
    pub fn run(&mut self, cancel: &CancelToken) -> Result<DaqSummary, DaqError> {
        self.cancel = Some(cancel.clone());
        info!("taking data");
        while !cancel.is_cancelled() {
            if self.poll_once()?.is_none() && !self.config.idle_backoff.is_zero() {
                thread::sleep(self.config.idle_backoff);
            }
        }
        info!(events = self.summary.events_read, "DAQ run stopped");
        Ok(self.summary.clone())
    }

    /// Flush and close the spy file.
    pub fn finish(mut self) -> Result<DaqSummary, DaqError> {
        if let Some(mut spy) = self.spy.take() {
            spy.flush()?;
        }
        Ok(std::mem::take(&mut self.summary))
    }

    /// Read one event out of the last-event FIFO. The FIFO is frozen while
    /// reading so the event boundary is known.
    fn drain_event(&mut self) -> Result<Option<usize>, DaqError> {
        if self.regs.read(DAQ_LAST_EVENT_EMPTY)? != 0 {
            return Ok(None);
        }
        let Some(spy) = self.spy.as_mut() else {
            return Ok(None);
        };

        spy.begin_event()?;
        self.regs.write(DAQ_LAST_EVENT_DISABLE, 1)?;

        let mut len = 0usize;
        loop {
            let high = self.regs.read(DAQ_LAST_EVENT_DATA)? as Word;
            let low = self.regs.read(DAQ_LAST_EVENT_DATA)? as Word;
            spy.write_word((high << 32) | low)?;
            len += 1;
            if self.regs.read(DAQ_LAST_EVENT_EMPTY)? != 0 {
                break;
            }
        }

        self.regs.write(DAQ_LAST_EVENT_DISABLE, 0)?;
        spy.end_event(len)?;

        self.summary.events_read += 1;
        self.summary.words_read += len as u64;
        debug!(words = len, "event read from FIFO");
        Ok(Some(len))
    }

    /// Wait out a TTS error state. Not an error for the session.
    fn check_tts(&mut self) -> Result<(), DaqError> {
        let state = self.regs.read(DAQ_TTS_STATE)?;
        if state != TTS_ERROR {
            return Ok(());
        }

        warn!("TTS state = ERROR, waiting for ready state");
        self.summary.tts_errors += 1;

        let policy = PollPolicy::new(None, self.config.tts_backoff);
        let regs = &mut self.regs;
        let outcome = poll_until(&policy, self.cancel.as_ref(), || {
            Ok(regs.read(DAQ_TTS_STATE)? != TTS_ERROR)
        })?;
        if outcome == PollOutcome::Ready {
            info!("TTS state recovered");
        }
        Ok(())
    }
}

impl<R: RegisterAccess> Drop for DaqSession<R> {
    fn drop(&mut self) {
        if let Some(spy) = self.spy.as_mut() {
            if let Err(e) = spy.flush() {
                warn!(error = %e, "failed to flush spy file");
            }
        }
    }
}
