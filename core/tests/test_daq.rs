// Local DAQ session against a register stub: start sequence, FIFO readout
// into a spy file, TTS error handling and cancellation.

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::fs::File;
    use std::io::BufReader;
    use std::time::Duration;

    use chrono::{Local, TimeZone};
    use tempfile::tempdir;

    use cscfed_core::hw::registers::{
        DAQ_INPUT_ENABLE_MASK, DAQ_LAST_EVENT_DATA, DAQ_LAST_EVENT_DISABLE, DAQ_LAST_EVENT_EMPTY,
        DAQ_RESET, DAQ_SPY_EVENTS_SENT, DAQ_TTS_STATE, TTC_MODULE_RESET, TTS_ERROR,
    };
    use cscfed_core::hw::{
        default_run_filename, CancelToken, DaqConfig, DaqSession, HardwareError, RegisterAccess,
    };
    use cscfed_core::stream::SpyTextReader;
    use cscfed_core::types::Word;

    const TTS_READY: u32 = 0x8;

    /// Last-event FIFO model. An event becomes visible when `EMPTY` is read
    /// while the FIFO is not frozen; data comes out as high/low halves.
    #[derive(Default)]
    struct FakeDaq {
        writes: Vec<(String, u32)>,
        pending: VecDeque<Vec<Word>>,
        fifo: VecDeque<u32>,
        frozen: bool,
        tts: VecDeque<u32>,
        tts_reads: usize,
        served: usize,
        cancel_after: Option<(usize, CancelToken)>,
    }

    impl FakeDaq {
        fn with_events(events: &[Vec<Word>]) -> Self {
            Self {
                pending: events.iter().cloned().collect(),
                ..Self::default()
            }
        }
    }

    impl RegisterAccess for FakeDaq {
        fn read(&mut self, name: &str) -> Result<u32, HardwareError> {
            match name {
                DAQ_LAST_EVENT_EMPTY => {
                    if self.fifo.is_empty() && !self.frozen {
                        if let Some(event) = self.pending.pop_front() {
                            for w in event {
                                self.fifo.push_back((w >> 32) as u32);
                                self.fifo.push_back(w as u32);
                            }
                        }
                    }
                    Ok(u32::from(self.fifo.is_empty()))
                }
                DAQ_LAST_EVENT_DATA => Ok(self.fifo.pop_front().unwrap_or(0)),
                DAQ_SPY_EVENTS_SENT => Ok(self.served as u32),
                DAQ_TTS_STATE => {
                    self.tts_reads += 1;
                    Ok(self.tts.pop_front().unwrap_or(TTS_READY))
                }
                _ => Err(HardwareError::UnknownRegister(name.to_string())),
            }
        }

        fn write(&mut self, name: &str, value: u32) -> Result<(), HardwareError> {
            self.writes.push((name.to_string(), value));
            if name == DAQ_LAST_EVENT_DISABLE {
                let was_frozen = self.frozen;
                self.frozen = value == 1;
                if was_frozen && !self.frozen {
                    self.served += 1;
                    if let Some((n, token)) = &self.cancel_after {
                        if self.served >= *n {
                            token.cancel();
                        }
                    }
                }
            }
            Ok(())
        }
    }

    fn config() -> DaqConfig {
        DaqConfig {
            tts_backoff: Duration::ZERO,
            ..DaqConfig::default()
        }
    }

    fn sample_events() -> Vec<Vec<Word>> {
        vec![
            vec![0x5000_0001_7313_4770, 0x8000_0001_8000_0000, 0xdead_beef_0000_0001],
            vec![0x5000_0002_7313_4770],
            vec![0x5000_0003_7313_4770, 0xffff_ffff_ffff_ffff],
        ]
    }

    fn read_spy(path: &std::path::Path) -> Vec<Vec<Word>> {
        let file = File::open(path).unwrap();
        SpyTextReader::new(BufReader::new(file)).collect_events().unwrap()
    }

// # ✅ 1. Start sequence

    #[test]
    fn start_writes_reset_and_enable_sequence() {
        let mut regs = FakeDaq::default();
        DaqSession::new(&mut regs, config()).start().unwrap();

        assert_eq!(regs.writes.len(), 15);
        assert_eq!(regs.writes[0], (TTC_MODULE_RESET.to_string(), 1));
        assert!(regs.writes.contains(&(DAQ_INPUT_ENABLE_MASK.to_string(), 0x7efd)));
        assert_eq!(regs.writes.last().unwrap(), &(DAQ_RESET.to_string(), 0));
    }

// # ✅ 2. Readout

    #[test]
    fn poll_once_drains_one_event_into_spy_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.raw");
        let events = sample_events();
        let mut regs = FakeDaq::with_events(&events);

        let mut session = DaqSession::new(&mut regs, config()).with_spy_file(&path).unwrap();
        assert_eq!(session.poll_once().unwrap(), Some(3));
        let summary = session.finish().unwrap();

        assert_eq!(summary.events_read, 1);
        assert_eq!(summary.words_read, 3);
        assert_eq!(summary.spy_path.as_deref(), Some(path.as_path()));
        assert_eq!(read_spy(&path), vec![events[0].clone()]);
        // FIFO frozen while reading, released afterwards
        let disables: Vec<u32> = regs
            .writes
            .iter()
            .filter(|(n, _)| n == DAQ_LAST_EVENT_DISABLE)
            .map(|(_, v)| *v)
            .collect();
        assert_eq!(disables, vec![1, 0]);
    }

    #[test]
    fn run_reads_until_cancelled() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.raw");
        let events = sample_events();
        let token = CancelToken::new();
        let mut regs = FakeDaq {
            cancel_after: Some((3, token.clone())),
            ..FakeDaq::with_events(&events)
        };

        let mut session = DaqSession::new(&mut regs, config()).with_spy_file(&path).unwrap();
        let summary = session.run(&token).unwrap();
        assert_eq!(summary.events_read, 3);
        assert_eq!(summary.words_read, 6);
        session.finish().unwrap();

        assert_eq!(read_spy(&path), events);
    }

    #[test]
    fn without_spy_file_fifo_is_left_alone() {
        let mut regs = FakeDaq::with_events(&sample_events());
        let mut session = DaqSession::new(&mut regs, config());
        assert_eq!(session.poll_once().unwrap(), None);
        drop(session);
        assert_eq!(regs.pending.len(), 3);
        assert_eq!(regs.tts_reads, 1);
    }

// # ✅ 3. TTS error state

    #[test]
    fn tts_error_is_waited_out() {
        let mut regs = FakeDaq {
            tts: [TTS_ERROR, TTS_ERROR, TTS_ERROR, TTS_READY].into_iter().collect(),
            ..FakeDaq::default()
        };
        let mut session = DaqSession::new(&mut regs, config());
        session.poll_once().unwrap();
        assert_eq!(session.summary().tts_errors, 1);
        drop(session);
        assert_eq!(regs.tts_reads, 4);
    }

// # ✅ 4. Config and naming

    #[test]
    fn default_filename_uses_timestamp() {
        let t = Local.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        assert_eq!(default_run_filename(t), "run_2024-03-05__07_08_09.raw");
    }

    #[test]
    fn config_defaults_and_json_overrides() {
        let d = DaqConfig::default();
        assert_eq!(d.input_mask, 0x7efd);
        assert!(d.ignore_amc13 && d.reset_till_resync && !d.freeze_on_error);

        let c: DaqConfig = serde_json::from_str(r#"{ "input_mask": 1, "tts_backoff": 5 }"#).unwrap();
        assert_eq!(c.input_mask, 1);
        assert_eq!(c.tts_backoff, Duration::from_millis(5));
        assert_eq!(c.spy_prescale, 4);
    }
}
