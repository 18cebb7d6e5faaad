//! Unit tests for ts-core primitives.

#[cfg(test)]
mod ids {
    use crate::{Channel, MacAddr, MoteId};

    #[test]
    fn mac_roundtrips_to_mote_id() {
        let id = MoteId(42);
        assert_eq!(id.mac().mote_id(), Some(id));
        assert_eq!(MacAddr::from(MoteId(0)).mote_id(), Some(MoteId::ROOT));
    }

    #[test]
    fn broadcast_has_no_mote() {
        assert!(MacAddr::BROADCAST.is_broadcast());
        assert_eq!(MacAddr::BROADCAST.mote_id(), None);
        assert_eq!(MacAddr(7).mote_id(), None);
    }

    #[test]
    fn mac_display_and_parse() {
        let mac = MoteId(3).mac();
        assert_eq!(mac.to_string(), "00:12:4b:00:00:00:00:03");
        assert_eq!("00:12:4b:00:00:00:00:03".parse::<MacAddr>().unwrap(), mac);
        assert!("00:12".parse::<MacAddr>().is_err());
        assert!("zz:12:4b:00:00:00:00:03".parse::<MacAddr>().is_err());
    }

    #[test]
    fn mac_serialises_as_string() {
        let json = serde_json::to_string(&MoteId(1).mac()).unwrap();
        assert_eq!(json, "\"00:12:4b:00:00:00:00:01\"");
    }

    #[test]
    fn channel_hopping_cycles() {
        assert_eq!(Channel::hop(0, 0, 16), Channel(0));
        assert_eq!(Channel::hop(17, 0, 16), Channel(1));
        assert_eq!(Channel::hop(5, 2, 4), Channel(3));
        assert_eq!(Channel::hop(99, 0, 1), Channel(0));
    }
}

#[cfg(test)]
mod time {
    use crate::{Asn, SlotClock};

    #[test]
    fn asn_arithmetic() {
        assert_eq!(Asn(10) + 5, Asn(15));
        assert_eq!(Asn(15).since(Asn(10)), 5);
        assert_eq!(Asn(3).since(Asn(10)), 0);
    }

    #[test]
    fn slots_for_secs_rounds_up() {
        let clock = SlotClock::new(0.010, 101);
        assert_eq!(clock.slots_for_secs(1.0), 100);
        assert_eq!(clock.slots_for_secs(0.015), 2);
        assert_eq!(clock.slots_for_secs(0.0), 1);
    }

    #[test]
    fn shared_cells_are_slotframe_aligned() {
        let clock = SlotClock::new(0.010, 101);
        assert_eq!(clock.next_shared_cell(Asn(0)), Asn(101));
        assert_eq!(clock.next_shared_cell(Asn(100)), Asn(101));
        assert_eq!(clock.next_shared_cell(Asn(101)), Asn(202));
        assert_eq!(clock.shared_cell_at_or_after(Asn(202)), Asn(202));
        assert_eq!(clock.shared_cell_at_or_after(Asn(203)), Asn(303));
    }
}

#[cfg(test)]
mod rng {
    use crate::{MoteId, MoteRng, SimRng};

    #[test]
    fn mote_rngs_are_reproducible() {
        let mut a = MoteRng::new(7, MoteId(3));
        let mut b = MoteRng::new(7, MoteId(3));
        let xs: Vec<u32> = (0..8).map(|_| a.gen_range(0..1000)).collect();
        let ys: Vec<u32> = (0..8).map(|_| b.gen_range(0..1000)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn mote_rngs_differ_between_motes() {
        let mut a = MoteRng::new(7, MoteId(1));
        let mut b = MoteRng::new(7, MoteId(2));
        let xs: Vec<u32> = (0..8).map(|_| a.gen_range(0..1_000_000)).collect();
        let ys: Vec<u32> = (0..8).map(|_| b.gen_range(0..1_000_000)).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn jitter_stays_within_spread() {
        let mut rng = MoteRng::new(1, MoteId(0));
        for _ in 0..100 {
            let v = rng.jitter(100.0, 0.1);
            assert!((90.0..=110.0).contains(&v), "got {v}");
        }
        assert_eq!(rng.jitter(100.0, 0.0), 100.0);
    }

    #[test]
    fn gen_bool_extremes() {
        let mut rng = SimRng::new(5);
        assert!((0..50).all(|_| rng.gen_bool(1.0)));
        assert!((0..50).all(|_| !rng.gen_bool(0.0)));
        assert!(!rng.gen_bool(f64::NAN));
    }
}

#[cfg(test)]
mod settings {
    use crate::{ConfigFile, CoreError, Settings};

    #[test]
    fn defaults_validate() {
        Settings::default().validate().unwrap();
    }

    #[test]
    fn rejects_zero_channels() {
        let s = Settings { num_channels: 0, ..Settings::default() };
        assert!(matches!(
            s.validate(),
            Err(CoreError::InvalidSetting { field: "num_channels", .. })
        ));
    }

    #[test]
    fn rejects_out_of_range_baseline() {
        let s = Settings { baseline_pdr: 1.5, ..Settings::default() };
        assert!(s.validate().is_err());
    }

    #[test]
    fn run_length_is_frames_times_length() {
        let s = Settings { num_slotframes_per_run: 10, slotframe_length: 101, ..Settings::default() };
        assert_eq!(s.run_length_slots(), 1010);
    }

    #[test]
    fn no_axes_yields_single_default_combination() {
        let cfg = ConfigFile::from_json_str(r#"{"settings":{"regular":{"num_motes":4}}}"#).unwrap();
        let combos = cfg.expand().unwrap();
        assert_eq!(combos.len(), 1);
        assert_eq!(combos[0].id, "default");
        assert_eq!(combos[0].settings.num_motes, 4);
        assert_eq!(combos[0].settings.num_channels, 16);
    }

    #[test]
    fn cartesian_product_in_key_order() {
        let cfg = ConfigFile::from_json_str(
            r#"{"settings":{
                "regular":{"num_motes":5},
                "combination":{"topology":["RANDOM","BINARY_TREE"],"num_channels":[1,16]}
            }}"#,
        )
        .unwrap();
        let combos = cfg.expand().unwrap();
        let ids: Vec<&str> = combos.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(
            ids,
            [
                "num_channels=1_topology=RANDOM",
                "num_channels=1_topology=BINARY_TREE",
                "num_channels=16_topology=RANDOM",
                "num_channels=16_topology=BINARY_TREE",
            ]
        );
        assert!(combos.iter().all(|c| c.settings.num_motes == 5));
        assert_eq!(combos[3].settings.topology, "BINARY_TREE");
    }

    #[test]
    fn unknown_field_is_rejected() {
        let cfg = ConfigFile::from_json_str(r#"{"settings":{"regular":{"numMotes":4}}}"#).unwrap();
        assert!(matches!(cfg.expand(), Err(CoreError::Parse(_))));
    }

    #[test]
    fn empty_axis_is_rejected() {
        let cfg =
            ConfigFile::from_json_str(r#"{"settings":{"combination":{"num_motes":[]}}}"#).unwrap();
        assert!(matches!(cfg.expand(), Err(CoreError::Config(_))));
    }
}
