//! Integration tests for ts-sim.

use ts_core::{Asn, MoteId, Settings};
use ts_mote::{Action, PacketEvent, PacketFate, ParentChange};

use crate::{NoopObserver, RunSummary, Sim, SimBuilder, SimObserver};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn test_settings(num_motes: u32, num_channels: u8) -> Settings {
    Settings {
        num_motes,
        num_channels,
        seed: 7,
        slotframe_length: 11,
        num_slotframes_per_run: 2_000,
        eb_period_secs: 1.0,
        dio_period_secs: 1.0,
        app_pk_period_secs: 5.0,
        ..Settings::default()
    }
}

/// Dispatch the boot events, then synchronise every mote off the root.
fn boot_and_sync(sim: &mut Sim) {
    sim.run_until(Asn::ZERO, &mut NoopObserver, |_| false).unwrap();
    for i in 1..sim.motes.len() as u32 {
        assert!(sim.deliver_eb(MoteId::ROOT, MoteId(i)).unwrap());
    }
}

#[derive(Default)]
struct Recorder {
    dispatched: Vec<(u64, u32, Action)>,
    synced:     Vec<MoteId>,
    changes:    Vec<(MoteId, ParentChange)>,
    packets:    Vec<PacketEvent>,
    ended:      Option<RunSummary>,
}

impl SimObserver for Recorder {
    fn on_dispatch(&mut self, asn: Asn, target: MoteId, action: Action) {
        self.dispatched.push((asn.0, target.0, action));
    }
    fn on_sync(&mut self, _asn: Asn, mote: MoteId) {
        self.synced.push(mote);
    }
    fn on_parent_change(&mut self, _asn: Asn, mote: MoteId, change: &ParentChange) {
        self.changes.push((mote, *change));
    }
    fn on_packet(&mut self, event: &PacketEvent) {
        self.packets.push(*event);
    }
    fn on_run_end(&mut self, summary: &RunSummary) {
        self.ended = Some(summary.clone());
    }
}

// ── SimBuilder validation ─────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use ts_core::{CoreError, MoteId};
    use ts_net::{ConnectivityMatrix, NetError};

    use super::*;
    use crate::SimError;

    #[test]
    fn builds_with_defaults() {
        let sim = SimBuilder::new(test_settings(5, 4)).build().unwrap();
        assert_eq!(sim.motes.len(), 5);
        assert_eq!(sim.scheduler.len(), 5, "one boot event per mote");
        assert_eq!(sim.connectivity.baseline(), 1.0);
        assert_eq!(sim.topology.num_motes(), 5);
    }

    #[test]
    fn unsupported_topology_is_rejected() {
        let settings = Settings { topology: "LINE".into(), ..test_settings(4, 1) };
        assert!(matches!(
            SimBuilder::new(settings).build(),
            Err(SimError::Net(NetError::UnsupportedTopology("LINE")))
        ));
    }

    #[test]
    fn unknown_names_are_rejected() {
        let settings = Settings { topology: "STAR".into(), ..test_settings(4, 1) };
        assert!(matches!(
            SimBuilder::new(settings).build(),
            Err(SimError::Net(NetError::UnknownTopology(_)))
        ));
        let settings = Settings { objective_function: "MRHOF".into(), ..test_settings(4, 1) };
        assert!(matches!(SimBuilder::new(settings).build(), Err(SimError::Mote(_))));
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let settings = Settings { num_motes: 0, ..test_settings(4, 1) };
        assert!(matches!(
            SimBuilder::new(settings).build(),
            Err(SimError::Settings(CoreError::InvalidSetting { field: "num_motes", .. }))
        ));
    }

    #[test]
    fn connectivity_must_match_run() {
        let result = SimBuilder::new(test_settings(4, 1))
            .connectivity(ConnectivityMatrix::fully_connected(3, 1))
            .build();
        assert!(matches!(result, Err(SimError::MoteCountMismatch { expected: 4, got: 3, .. })));

        let result = SimBuilder::new(test_settings(4, 1))
            .connectivity(ConnectivityMatrix::fully_connected(4, 2))
            .build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn positions_are_applied() {
        let sim = SimBuilder::new(test_settings(2, 1))
            .positions(vec![(0.0, 0.0), (3.0, 4.0)])
            .build()
            .unwrap();
        assert_eq!(sim.mote(MoteId(1)).unwrap().position, (3.0, 4.0));
        assert!(SimBuilder::new(test_settings(2, 1)).positions(vec![]).build().is_err());
    }
}

// ── Parent selection through the run context ──────────────────────────────────

#[cfg(test)]
mod routing {
    use ts_core::MoteId;
    use ts_mote::{ACCEPTABLE_LOWEST_PDR, Dio, Rank};
    use ts_net::ConnectivityMatrix;

    use super::*;

    #[test]
    fn four_mote_full_mesh() {
        let mut links = ConnectivityMatrix::fully_connected(4, 1);
        links.set_link(MoteId(0), MoteId(3), 0.0).unwrap();
        links.set_link(MoteId(0), MoteId(2), ACCEPTABLE_LOWEST_PDR).unwrap();
        links.set_link(MoteId(1), MoteId(3), ACCEPTABLE_LOWEST_PDR).unwrap();
        let mut sim = SimBuilder::new(test_settings(4, 1)).connectivity(links).build().unwrap();
        boot_and_sync(&mut sim);

        for (src, dst) in [(0, 1), (0, 2), (1, 2), (2, 1), (1, 3), (2, 3)] {
            sim.deliver_dio(MoteId(src), MoteId(dst)).unwrap();
        }
        for rank in [0, 256, 300] {
            let forged = Dio::new(Rank(rank)).addressed(MoteId(3).mac(), MoteId(2).mac());
            assert_eq!(sim.inject_dio(MoteId(2), forged).unwrap(), None, "rank {rank}");
        }

        assert_eq!(sim.preferred_parent(MoteId(1)), Some(MoteId(0)));
        assert_eq!(sim.preferred_parent(MoteId(2)), Some(MoteId(1)));
        assert_eq!(sim.preferred_parent(MoteId(3)), Some(MoteId(2)));
        assert_eq!(sim.preferred_parent(MoteId(0)), None);
    }

    #[test]
    fn two_mote_degrade_and_restore() {
        let mut sim = SimBuilder::new(test_settings(2, 1)).build().unwrap();
        boot_and_sync(&mut sim);
        sim.deliver_dio(MoteId(0), MoteId(1)).unwrap();
        assert_eq!(sim.preferred_parent(MoteId(1)), Some(MoteId(0)));

        sim.connectivity
            .set_link(MoteId(0), MoteId(1), ACCEPTABLE_LOWEST_PDR * 0.99)
            .unwrap();
        sim.update_etx(MoteId(1), MoteId(0), false).unwrap();
        assert_eq!(sim.preferred_parent(MoteId(1)), None);

        sim.connectivity.set_link(MoteId(0), MoteId(1), 1.0).unwrap();
        sim.update_etx(MoteId(1), MoteId(0), false).unwrap();
        assert_eq!(sim.preferred_parent(MoteId(1)), Some(MoteId(0)));
    }

    #[test]
    fn unsynchronised_mote_ignores_dio() {
        let mut sim = SimBuilder::new(test_settings(2, 1)).build().unwrap();
        sim.run_until(Asn::ZERO, &mut NoopObserver, |_| false).unwrap();
        assert_eq!(sim.deliver_dio(MoteId(0), MoteId(1)).unwrap(), None);
        assert_eq!(sim.preferred_parent(MoteId(1)), None);
    }

    #[test]
    fn helpers_reject_unknown_motes() {
        let mut sim = SimBuilder::new(test_settings(2, 1)).build().unwrap();
        assert!(sim.deliver_eb(MoteId(0), MoteId(9)).is_err());
        assert!(sim.deliver_dio(MoteId(9), MoteId(1)).is_err());
        assert!(sim.update_etx(MoteId(9), MoteId(0), true).is_err());
        assert!(sim.deactivate_mote(MoteId(9)).is_err());
    }
}

// ── Full runs ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod runs {
    use ts_core::MoteId;
    use ts_mote::Mote;

    use super::*;

    #[test]
    fn perfect_links_join_and_deliver() {
        let mut sim = SimBuilder::new(test_settings(5, 4)).build().unwrap();
        let mut rec = Recorder::default();
        let summary = sim.run(&mut rec).unwrap();

        assert_eq!(summary.joined, 5);
        assert!(summary.generated > 0);
        assert!(summary.delivered > 0);
        assert_eq!(rec.synced.len(), 5);
        assert!(rec.changes.len() >= 4);
        assert!(rec.packets.iter().any(|p| p.fate == PacketFate::Delivered));
        assert_eq!(rec.ended.as_ref(), Some(&summary));
        for i in 1..5 {
            assert_eq!(sim.preferred_parent(MoteId(i)), Some(MoteId::ROOT));
        }
    }

    #[test]
    fn same_seed_same_trace() {
        let trace = || {
            let mut sim = SimBuilder::new(test_settings(6, 4)).build().unwrap();
            sim.connectivity.set_link(MoteId(0), MoteId(5), 0.6).unwrap();
            let mut rec = Recorder::default();
            sim.run(&mut rec).unwrap();
            (rec.dispatched, rec.packets)
        };
        let (first, packets) = trace();
        assert!(!first.is_empty());
        assert!(first.windows(2).all(|w| w[0].0 <= w[1].0), "dispatch time never decreases");
        assert_eq!(trace(), (first, packets));
    }

    #[test]
    fn stop_condition_ends_run_early() {
        let mut sim = SimBuilder::new(test_settings(4, 4)).build().unwrap();
        let summary = sim
            .run_until(Asn(u64::MAX), &mut NoopObserver, |s| s.motes.iter().all(Mote::is_joined))
            .unwrap();
        assert_eq!(summary.joined, 4);
        assert!(summary.end < Asn(sim.settings.run_length_slots()));
        assert!(!sim.scheduler.is_empty());
    }

    #[test]
    fn deactivated_mote_events_are_noops() {
        let mut sim = SimBuilder::new(test_settings(4, 2)).build().unwrap();
        sim.deactivate_mote(MoteId(2)).unwrap();
        let summary = sim.run(&mut NoopObserver).unwrap();

        let dead = &summary.motes[2];
        assert!(!dead.active);
        assert!(!dead.synchronized);
        assert_eq!(dead.stats.generated, 0);
        assert_eq!(summary.joined, 3);
    }

    #[test]
    fn event_for_unknown_mote_is_a_noop() {
        let mut sim = SimBuilder::new(test_settings(2, 1)).build().unwrap();
        sim.scheduler.schedule(Asn(3), MoteId(42), Action::SendEb).unwrap();
        let summary = sim.run_until(Asn(3), &mut NoopObserver, |_| false).unwrap();
        assert_eq!(summary.end, Asn(3));
    }

    #[test]
    fn teardown_is_idempotent_and_reusable() {
        let mut sim = SimBuilder::new(test_settings(3, 2)).build().unwrap();
        sim.run_until(Asn(500), &mut NoopObserver, |_| false).unwrap();

        sim.teardown();
        sim.teardown();
        assert!(sim.scheduler.is_empty());
        assert_eq!(sim.scheduler.now(), Asn::ZERO);
        assert!(sim.motes.is_empty());
        assert_eq!(sim.topology.num_motes(), 0);

        sim.scheduler.schedule(Asn(1), MoteId(0), Action::Boot).unwrap();
        let summary = sim.run(&mut NoopObserver).unwrap();
        assert_eq!(summary.events, 1);
        assert_eq!(summary.joined, 0);
    }
}
