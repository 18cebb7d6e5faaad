//! Unit tests for ts-schedule.

use std::ops::ControlFlow;

use ts_core::{Asn, MoteId};

use crate::{EventScheduler, ScheduleError};

/// Drain the scheduler, returning `(asn, label)` in dispatch order.
fn drain(s: &mut EventScheduler<&'static str>) -> Vec<(u64, &'static str)> {
    let mut trace = Vec::new();
    s.run(|_, ev| {
        trace.push((ev.asn().0, ev.action));
        Ok(ControlFlow::Continue(()))
    })
    .unwrap();
    trace
}

#[cfg(test)]
mod ordering {
    use super::*;

    #[test]
    fn earlier_time_dispatches_first_regardless_of_insertion() {
        let mut s = EventScheduler::new();
        s.schedule(Asn(30), MoteId(0), "c").unwrap();
        s.schedule(Asn(10), MoteId(0), "a").unwrap();
        s.schedule(Asn(20), MoteId(0), "b").unwrap();
        assert_eq!(drain(&mut s), vec![(10, "a"), (20, "b"), (30, "c")]);
    }

    #[test]
    fn equal_times_keep_insertion_order() {
        let mut s = EventScheduler::new();
        s.schedule(Asn(5), MoteId(2), "first").unwrap();
        s.schedule(Asn(5), MoteId(1), "second").unwrap();
        s.schedule(Asn(5), MoteId(0), "third").unwrap();
        assert_eq!(drain(&mut s), vec![(5, "first"), (5, "second"), (5, "third")]);
    }

    #[test]
    fn clock_follows_dispatched_event() {
        let mut s = EventScheduler::new();
        s.schedule(Asn(42), MoteId(0), "x").unwrap();
        assert_eq!(s.now(), Asn(0));
        let ev = s.pop_next().unwrap();
        assert_eq!(ev.target, MoteId(0));
        assert_eq!(s.now(), Asn(42));
        assert_eq!(s.dispatched(), 1);
    }

    #[test]
    fn handler_can_schedule_follow_ups() {
        let mut s = EventScheduler::new();
        s.schedule(Asn(1), MoteId(0), "tick").unwrap();
        let mut seen = Vec::new();
        s.run(|sched, ev| {
            seen.push(ev.asn().0);
            if ev.asn().0 < 4 {
                sched.schedule(ev.asn() + 1, ev.target, "tick")?;
            }
            Ok(ControlFlow::Continue(()))
        })
        .unwrap();
        assert_eq!(seen, vec![1, 2, 3, 4]);
    }
}

#[cfg(test)]
mod errors_and_control {
    use super::*;

    #[test]
    fn scheduling_in_the_past_fails() {
        let mut s = EventScheduler::new();
        s.schedule(Asn(10), MoteId(0), "a").unwrap();
        s.pop_next().unwrap();
        let err = s.schedule(Asn(9), MoteId(0), "late").unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::InvalidTime { requested: Asn(9), now: Asn(10) }
        ));
        // Same slot is still allowed.
        s.schedule(Asn(10), MoteId(0), "same-slot").unwrap();
    }

    #[test]
    fn handler_error_aborts_run() {
        let mut s = EventScheduler::new();
        s.schedule(Asn(5), MoteId(0), "a").unwrap();
        s.schedule(Asn(6), MoteId(0), "b").unwrap();
        let result = s.run(|sched, _| {
            sched.schedule(Asn(0), MoteId(0), "bad")?;
            Ok(ControlFlow::Continue(()))
        });
        assert!(result.is_err());
        assert_eq!(s.len(), 1, "second event is left untouched");
    }

    #[test]
    fn break_stops_dispatch() {
        let mut s = EventScheduler::new();
        for t in 1..=5 {
            s.schedule(Asn(t), MoteId(0), "e").unwrap();
        }
        let n = s
            .run(|_, ev| Ok(if ev.asn().0 == 3 { ControlFlow::Break(()) } else { ControlFlow::Continue(()) }))
            .unwrap();
        assert_eq!(n, 3);
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn run_until_leaves_later_events_queued() {
        let mut s = EventScheduler::new();
        s.schedule(Asn(5), MoteId(0), "a").unwrap();
        s.schedule(Asn(50), MoteId(0), "b").unwrap();
        let n = s.run_until(Asn(10), |_, _| Ok(ControlFlow::Continue(()))).unwrap();
        assert_eq!(n, 1);
        assert_eq!(s.now(), Asn(5));
        assert_eq!(s.peek_time(), Some(Asn(50)));
    }

    #[test]
    fn cancelled_event_never_fires() {
        let mut s = EventScheduler::new();
        let k = s.schedule(Asn(5), MoteId(0), "cancelled").unwrap();
        s.schedule(Asn(6), MoteId(0), "kept").unwrap();
        assert!(s.cancel(k));
        assert!(!s.cancel(k));
        assert_eq!(drain(&mut s), vec![(6, "kept")]);
    }

    #[test]
    fn destroy_is_idempotent_and_reusable() {
        let mut s = EventScheduler::new();
        s.schedule(Asn(5), MoteId(0), "a").unwrap();
        s.pop_next();
        s.schedule(Asn(9), MoteId(0), "leftover").unwrap();
        s.destroy();
        s.destroy();
        assert!(s.is_empty());
        assert_eq!(s.now(), Asn(0));
        assert_eq!(s.dispatched(), 0);
        // Past-time check is relative to the rewound clock.
        s.schedule(Asn(1), MoteId(0), "fresh").unwrap();
        assert_eq!(drain(&mut s), vec![(1, "fresh")]);
    }
}

#[cfg(test)]
mod properties {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn dispatch_times_never_decrease(times in proptest::collection::vec(0u64..1_000, 1..64)) {
            let mut s = EventScheduler::new();
            for &t in &times {
                s.schedule(Asn(t), MoteId(0), t).unwrap();
            }
            let mut last = 0;
            let mut count = 0;
            while let Some(ev) = s.pop_next() {
                prop_assert!(ev.asn().0 >= last);
                prop_assert_eq!(ev.action, ev.asn().0);
                last = ev.asn().0;
                count += 1;
            }
            prop_assert_eq!(count, times.len());
        }

        #[test]
        fn identical_calls_give_identical_traces(times in proptest::collection::vec(0u64..50, 1..64)) {
            let trace = |times: &[u64]| {
                let mut s = EventScheduler::new();
                for (i, &t) in times.iter().enumerate() {
                    s.schedule(Asn(t), MoteId(i as u32), i).unwrap();
                }
                std::iter::from_fn(move || s.pop_next().map(|e| (e.key, e.target, e.action)))
                    .collect::<Vec<_>>()
            };
            prop_assert_eq!(trace(&times), trace(&times));
        }
    }
}
