// Event boundary scanning over raw little-endian word streams:
//
// * header pair detection and trailer handling
// * junk between events
// * truncated captures and partial trailing words
// * scanning for a specific L1A id

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use cscfed_core::stream::{io::words_to_bytes, is_event_start, EventScanner};
    use cscfed_core::types::Word;

    const TRAILER: [Word; 3] = [0x8000_ffff_8000_8000, 0x2010_0000_0000_0000, 0xa000_0006_3a6d_0080];

    fn event(l1a: u32, payload: &[Word]) -> Vec<Word> {
        let mut words = vec![
            0x5000_0000_7313_4770 | ((l1a as Word) << 32),
            0x8000_0001_8000_0000,
            0x7fff_3031_0000_0080,
        ];
        words.extend_from_slice(payload);
        words.extend_from_slice(&TRAILER);
        words
    }

    fn scanner(words: &[Word]) -> EventScanner<Cursor<Vec<u8>>> {
        EventScanner::new(Cursor::new(words_to_bytes(words)))
    }

// # ✅ 1. Header pair recognition

    #[test]
    fn header_pair_is_recognized() {
        assert!(is_event_start(0x5000_04ce_7313_4770, 0x8000_0001_8000_0000));
        // low 16 bits of the second header word are ignored
        assert!(is_event_start(0x5abc_0000_0000_0000, 0x8000_0001_8000_1234));
        assert!(!is_event_start(0x4000_04ce_7313_4770, 0x8000_0001_8000_0000));
        assert!(!is_event_start(0x5000_04ce_7313_4770, 0x8000_0002_8000_0000));
    }

// # ✅ 2. Events separated by junk

    #[test]
    fn finds_events_between_junk() {
        let mut stream = vec![0x1234, 0xdead_beef];
        stream.extend(event(7, &[0x1111, 0x2222]));
        stream.extend([0x5555, 0x6666, 0x7777]);
        stream.extend(event(8, &[]));

        let mut s = scanner(&stream);
        let events = s.collect_events().unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].sequence_id(), Some(7));
        assert_eq!(events[0].len(), 8);
        assert_eq!(events[0].words(), event(7, &[0x1111, 0x2222]).as_slice());
        assert_eq!(events[1].sequence_id(), Some(8));
        assert!(events.iter().all(|e| e.is_complete() && e.has_trailer()));

        let c = s.counters();
        assert_eq!(c.events, 2);
        assert_eq!(c.words, 14);
        assert_eq!(c.truncated, 0);
    }

// # ✅ 3. Empty source

    #[test]
    fn empty_source_yields_nothing() {
        let mut s = scanner(&[]);
        assert!(s.next_event(None).unwrap().is_none());
        assert!(s.collect_events().unwrap().is_empty());
    }

// # ❌ 4. Truncated final event

    #[test]
    fn truncated_event_is_flagged_not_fatal() {
        let mut stream = event(1, &[0x1]);
        let mut cut = event(2, &[0x2, 0x3]);
        cut.truncate(5);
        stream.extend(&cut);

        let mut s = scanner(&stream);
        let first = s.next_event(None).unwrap().unwrap();
        assert!(first.is_complete());

        let second = s.next_event(None).unwrap().unwrap();
        assert!(!second.is_complete());
        assert_eq!(second.words(), cut.as_slice());
        assert_eq!(s.counters().truncated, 1);

        assert!(s.next_event(None).unwrap().is_none());
    }

    #[test]
    fn iterator_stops_at_truncated_event() {
        let mut stream = event(1, &[]);
        stream.extend(&event(2, &[])[..4]);

        let mut s = scanner(&stream);
        let events = s.collect_events().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].sequence_id(), Some(1));
    }

    #[test]
    fn stream_ending_inside_trailer_tail_is_truncated() {
        let mut stream = event(3, &[]);
        stream.pop();

        let mut s = scanner(&stream);
        let e = s.next_event(None).unwrap().unwrap();
        assert!(!e.is_complete());
        assert_eq!(e.len(), 5);
    }

// # ❌ 5. Partial trailing word

    #[test]
    fn partial_tail_bytes_are_counted() {
        let mut bytes = words_to_bytes(&event(4, &[]));
        bytes.extend_from_slice(&[1, 2, 3]);

        let mut s = EventScanner::new(Cursor::new(bytes));
        assert_eq!(s.collect_events().unwrap().len(), 1);
        assert!(s.next_event(None).unwrap().is_none());
        assert_eq!(s.counters().partial_tail_bytes, 3);
    }

// # ✅ 6. Scanning for a wanted id

    #[test]
    fn wanted_id_skips_other_events() {
        let mut stream = event(10, &[0xa]);
        stream.extend(event(11, &[0xb]));
        stream.extend(event(12, &[0xc]));

        let mut s = scanner(&stream);
        let e = s.next_event(Some(12)).unwrap().unwrap();
        assert_eq!(e.sequence_id(), Some(12));
        assert!(s.next_event(None).unwrap().is_none());
    }

    #[test]
    fn missing_wanted_id_consumes_stream() {
        let stream = event(10, &[]);
        let mut s = scanner(&stream);
        assert!(s.next_event(Some(99)).unwrap().is_none());
        assert_eq!(s.words_read(), stream.len() as u64);
    }

// # ✅ 7. Short events are counted but returned

    #[test]
    fn short_event_is_counted() {
        let stream = vec![
            0x5000_0001_0000_0000,
            0x8000_0001_8000_0000,
            TRAILER[0],
            TRAILER[1],
            TRAILER[2],
        ];
        let mut s = scanner(&stream);
        let e = s.next_event(None).unwrap().unwrap();
        assert!(e.is_complete());
        assert!(!e.has_min_len());
        assert_eq!(s.counters().short_events, 1);
    }
}
