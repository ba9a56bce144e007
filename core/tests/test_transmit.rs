// GbE transmit path driven through a register stub.

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::time::Duration;

    use cscfed_core::framing::{FrameAssembler, FrameOptions, ReadbackOutcome};
    use cscfed_core::hw::registers::{
        GBE_BUSY, GBE_ENABLE, GBE_IDLE, GBE_MANUAL_READ, GBE_MANUAL_READ_ENABLE, GBE_PUSH_DATA,
        GBE_START_TRANSMIT,
    };
    use cscfed_core::hw::{
        dummy_eth_frame, empty_ddu_frame, CancelToken, GbeTransmitter, HardwareError, PollPolicy, RegisterAccess,
        TransmitOutcome,
    };
    use cscfed_core::types::{DaqError, Word};

    /// Transmit FIFO model. Pushed symbols queue up until a transmit starts or
    /// they are drained through the manual-read port.
    #[derive(Default)]
    struct FakeGbe {
        pushed: Vec<u32>,
        fifo: VecDeque<u32>,
        starts: usize,
        busy_reads: usize,
        busy_for: usize,
        manual_read: bool,
        enabled: bool,
        corrupt_readback_at: Option<usize>,
        fail_push: bool,
    }

    impl RegisterAccess for FakeGbe {
        fn read(&mut self, name: &str) -> Result<u32, HardwareError> {
            match name {
                GBE_BUSY => {
                    self.busy_reads += 1;
                    if self.busy_for > 0 {
                        self.busy_for -= 1;
                        return Ok(0);
                    }
                    Ok(if self.fifo.is_empty() { GBE_IDLE } else { 0 })
                }
                GBE_MANUAL_READ if self.manual_read => Ok(self.fifo.pop_front().unwrap_or(0)),
                _ => Err(HardwareError::UnknownRegister(name.to_string())),
            }
        }

        fn write(&mut self, name: &str, value: u32) -> Result<(), HardwareError> {
            match name {
                GBE_PUSH_DATA => {
                    if self.fail_push {
                        return Err(HardwareError::Bus { name: name.into(), msg: "nack".into() });
                    }
                    let mut v = value;
                    if self.corrupt_readback_at == Some(self.pushed.len()) {
                        v ^= 0x1;
                    }
                    self.pushed.push(value);
                    self.fifo.push_back(v);
                }
                GBE_START_TRANSMIT => {
                    self.starts += 1;
                    self.fifo.clear();
                }
                GBE_MANUAL_READ_ENABLE => self.manual_read = value == 1,
                GBE_ENABLE => self.enabled = value == 1,
                _ => return Err(HardwareError::UnknownRegister(name.to_string())),
            }
            Ok(())
        }
    }

    fn words(n: usize) -> Vec<Word> {
        (0..n as Word).map(|i| (i << 8) | 0x11).collect()
    }

    fn fast() -> PollPolicy {
        PollPolicy::new(None, Duration::ZERO)
    }

    fn expected_symbols(event: &[Word]) -> Vec<u32> {
        let mut asm = FrameAssembler::new(FrameOptions::ddu()).unwrap();
        asm.assemble(event).into_iter().flat_map(|f| f.symbols).collect()
    }

// # ✅ 1. Normal transmission

    #[test]
    fn split_event_polls_only_before_first_fragment() {
        let mut regs = FakeGbe::default();
        let event = words(2000);

        let mut tx = GbeTransmitter::new(&mut regs, FrameOptions::ddu())
            .unwrap()
            .with_poll_policy(fast());
        let outcome = tx.send_event(&event).unwrap();
        assert_eq!(outcome, TransmitOutcome::Sent { frames: 3 });

        let counters = tx.counters().clone();
        assert_eq!(counters.frames, 3);
        assert_eq!(counters.split_events, 1);
        assert_eq!(tx.next_counter(), 3);
        drop(tx);

        assert_eq!(regs.busy_reads, 1);
        assert_eq!(regs.starts, 3);
        assert_eq!(regs.pushed, expected_symbols(&event));
    }

    #[test]
    fn waits_for_idle_path() {
        let mut regs = FakeGbe { busy_for: 5, ..FakeGbe::default() };
        let mut tx = GbeTransmitter::new(&mut regs, FrameOptions::ddu())
            .unwrap()
            .with_poll_policy(fast());
        assert!(tx.send_event(&words(3)).unwrap().is_sent());
        drop(tx);
        assert_eq!(regs.busy_reads, 6);
    }

    #[test]
    fn busy_path_exhausts_bounded_policy() {
        let mut regs = FakeGbe { busy_for: usize::MAX, ..FakeGbe::default() };
        let mut tx = GbeTransmitter::new(&mut regs, FrameOptions::ddu())
            .unwrap()
            .with_poll_policy(fast().with_max_attempts(4));
        assert_eq!(tx.send_event(&words(3)).unwrap(), TransmitOutcome::NotIdle);
        drop(tx);
        assert_eq!(regs.busy_reads, 4);
        assert!(regs.pushed.is_empty());
    }

    #[test]
    fn unsent_event_keeps_fragment_counter() {
        let mut regs = FakeGbe { busy_for: 1, ..FakeGbe::default() };
        let mut tx = GbeTransmitter::new(&mut regs, FrameOptions::ddu())
            .unwrap()
            .with_poll_policy(fast().with_max_attempts(1));
        assert_eq!(tx.send_event(&[1, 2, 3]).unwrap(), TransmitOutcome::NotIdle);
        assert_eq!(tx.next_counter(), 0);
        assert_eq!(tx.counters().frames, 0);

        // path is idle now; the event goes out with counter 0
        assert_eq!(tx.send_event(&[1, 2, 3]).unwrap(), TransmitOutcome::Sent { frames: 1 });
        assert_eq!(tx.next_counter(), 1);
        drop(tx);
        assert_eq!(regs.pushed, expected_symbols(&[1, 2, 3]));
    }

    #[test]
    fn cancelled_wait_keeps_fragment_counter() {
        let token = CancelToken::new();
        token.cancel();
        let mut regs = FakeGbe { busy_for: usize::MAX, ..FakeGbe::default() };
        let mut tx = GbeTransmitter::new(&mut regs, FrameOptions::ddu())
            .unwrap()
            .with_poll_policy(fast())
            .with_cancel(token);
        assert_eq!(tx.send_event(&words(2000)).unwrap(), TransmitOutcome::Cancelled);
        assert_eq!(tx.next_counter(), 0);
    }

    #[test]
    fn cancellation_ends_wait() {
        let token = CancelToken::new();
        token.cancel();
        let mut regs = FakeGbe { busy_for: usize::MAX, ..FakeGbe::default() };
        let mut tx = GbeTransmitter::new(&mut regs, FrameOptions::ddu())
            .unwrap()
            .with_poll_policy(fast())
            .with_cancel(token);
        assert_eq!(tx.send_event(&words(3)).unwrap(), TransmitOutcome::Cancelled);
    }

// # ✅ 2. Readback

    #[test]
    fn readback_matches_without_transmitting() {
        let mut regs = FakeGbe::default();
        let mut tx = GbeTransmitter::new(&mut regs, FrameOptions::ddu())
            .unwrap()
            .with_poll_policy(fast())
            .with_readback(true);
        assert_eq!(tx.send_event(&words(1200)).unwrap(), TransmitOutcome::Sent { frames: 2 });
        drop(tx);
        assert_eq!(regs.starts, 0);
        assert!(!regs.manual_read);
    }

    #[test]
    fn readback_reports_first_differing_symbol() {
        let mut regs = FakeGbe { corrupt_readback_at: Some(5), ..FakeGbe::default() };
        let event = words(3);
        let expected = expected_symbols(&event);
        let mut tx = GbeTransmitter::new(&mut regs, FrameOptions::ddu())
            .unwrap()
            .with_poll_policy(fast())
            .with_readback(true);

        assert_eq!(
            tx.send_event(&event).unwrap(),
            TransmitOutcome::ReadbackMismatch {
                fragment_index: 0,
                outcome: ReadbackOutcome::SymbolMismatch {
                    index: 5,
                    expected: expected[5],
                    read: expected[5] ^ 0x1,
                },
            }
        );
    }

// # ✅ 3. Probe packets

    #[test]
    fn dummy_ddu_packet_is_pushed_and_started() {
        let mut regs = FakeGbe::default();
        GbeTransmitter::new(&mut regs, FrameOptions::default())
            .unwrap()
            .send_dummy_ddu_packet()
            .unwrap();

        let mut expected = empty_ddu_frame().symbols;
        expected.push(0x1_c5bc);
        assert!(regs.enabled);
        assert_eq!(regs.pushed, expected);
        assert_eq!(regs.starts, 1);
    }

    #[test]
    fn dummy_eth_packet_is_pushed_and_started() {
        let mut regs = FakeGbe::default();
        let mut tx = GbeTransmitter::new(&mut regs, FrameOptions::default()).unwrap();
        tx.send_dummy_eth_packet().unwrap();
        assert_eq!(tx.next_counter(), 0);
        drop(tx);

        assert!(regs.enabled);
        assert_eq!(regs.pushed, dummy_eth_frame());
        assert_eq!(regs.starts, 1);
    }

// # ❌ 4. Hardware faults are fatal

    #[test]
    fn register_failure_propagates() {
        let mut regs = FakeGbe { fail_push: true, ..FakeGbe::default() };
        let mut tx = GbeTransmitter::new(&mut regs, FrameOptions::ddu())
            .unwrap()
            .with_poll_policy(fast());
        assert!(matches!(
            tx.send_event(&words(2)),
            Err(DaqError::Hardware(HardwareError::Bus { .. }))
        ));
    }
}
