//! Unit tests for ts-net.

#[cfg(test)]
mod connectivity {
    use ts_core::{Channel, MoteId, SimRng};

    use crate::{ConnectivityMatrix, LinkQuality, NetError};

    #[test]
    fn unset_links_use_baseline() {
        let m = ConnectivityMatrix::new(3, 2, 0.7).unwrap();
        assert_eq!(m.get_pdr(MoteId(0), MoteId(1), Channel(1)), 0.7);
        assert_eq!(m.get_pdr(MoteId(1), MoteId(1), Channel(0)), 0.0);
    }

    #[test]
    fn directions_are_independent() {
        let mut m = ConnectivityMatrix::fully_connected(2, 1);
        m.set_pdr(MoteId(0), MoteId(1), Channel(0), 0.4).unwrap();
        assert_eq!(m.get_pdr(MoteId(0), MoteId(1), Channel(0)), 0.4);
        assert_eq!(m.get_pdr(MoteId(1), MoteId(0), Channel(0)), 1.0);
    }

    #[test]
    fn both_directions_are_equal_after_symmetric_set() {
        let mut m = ConnectivityMatrix::fully_connected(4, 2);
        m.set_pdr_both_directions(MoteId(1), MoteId(3), Channel(1), 0.25).unwrap();
        assert_eq!(m.get_pdr(MoteId(1), MoteId(3), Channel(1)), 0.25);
        assert_eq!(m.get_pdr(MoteId(3), MoteId(1), Channel(1)), 0.25);
        // Other channel untouched.
        assert_eq!(m.get_pdr(MoteId(1), MoteId(3), Channel(0)), 1.0);
        assert_eq!(m.link_pdr(MoteId(3), MoteId(1), Channel(1)), 0.25);
    }

    #[test]
    fn set_link_covers_every_channel() {
        let mut m = ConnectivityMatrix::fully_connected(2, 3);
        m.set_link(MoteId(0), MoteId(1), 0.0).unwrap();
        for ch in 0..3 {
            assert_eq!(m.get_pdr(MoteId(1), MoteId(0), Channel(ch)), 0.0);
        }
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let mut m = ConnectivityMatrix::fully_connected(2, 1);
        assert!(matches!(
            m.set_pdr(MoteId(0), MoteId(1), Channel(0), 1.01),
            Err(NetError::InvalidPdr(_))
        ));
        assert!(m.set_pdr(MoteId(0), MoteId(1), Channel(0), f64::NAN).is_err());
        assert!(m.set_pdr(MoteId(0), MoteId(1), Channel(0), -0.1).is_err());
        assert!(ConnectivityMatrix::new(2, 1, 2.0).is_err());
    }

    #[test]
    fn bad_endpoints_are_rejected() {
        let mut m = ConnectivityMatrix::fully_connected(2, 1);
        assert!(matches!(
            m.set_pdr(MoteId(0), MoteId(0), Channel(0), 0.5),
            Err(NetError::SelfLink(_))
        ));
        assert!(matches!(
            m.set_pdr(MoteId(0), MoteId(5), Channel(0), 0.5),
            Err(NetError::UnknownMote(MoteId(5)))
        ));
        assert!(matches!(
            m.set_pdr(MoteId(0), MoteId(1), Channel(3), 0.5),
            Err(NetError::UnknownChannel(Channel(3)))
        ));
    }

    #[test]
    fn transmit_respects_extreme_pdrs() {
        let mut m = ConnectivityMatrix::fully_connected(3, 1);
        m.set_pdr(MoteId(0), MoteId(2), Channel(0), 0.0).unwrap();
        let mut rng = SimRng::new(9);
        assert!((0..100).all(|_| m.transmit(&mut rng, MoteId(0), MoteId(1), Channel(0))));
        assert!((0..100).all(|_| !m.transmit(&mut rng, MoteId(0), MoteId(2), Channel(0))));
    }

    #[test]
    fn transmit_rate_tracks_pdr() {
        let mut m = ConnectivityMatrix::fully_connected(2, 1);
        m.set_pdr(MoteId(0), MoteId(1), Channel(0), 0.5).unwrap();
        let mut rng = SimRng::new(1234);
        let hits = (0..10_000)
            .filter(|_| m.transmit(&mut rng, MoteId(0), MoteId(1), Channel(0)))
            .count();
        assert!((4_500..5_500).contains(&hits), "got {hits}");
    }

    #[test]
    fn reset_restores_baseline() {
        let mut m = ConnectivityMatrix::new(2, 1, 0.9).unwrap();
        m.set_pdr(MoteId(0), MoteId(1), Channel(0), 0.1).unwrap();
        m.reset();
        assert_eq!(m.get_pdr(MoteId(0), MoteId(1), Channel(0)), 0.9);
    }
}

#[cfg(test)]
mod pdr_properties {
    use proptest::prelude::*;
    use ts_core::{Channel, MoteId};

    use crate::ConnectivityMatrix;

    proptest! {
        #[test]
        fn pdr_always_in_unit_interval(
            a in 0u32..8, b in 0u32..8, ch in 0u8..4, v in -2.0f64..2.0,
        ) {
            let mut m = ConnectivityMatrix::fully_connected(8, 4);
            let _ = m.set_pdr(MoteId(a), MoteId(b), Channel(ch), v);
            let pdr = m.get_pdr(MoteId(a), MoteId(b), Channel(ch));
            prop_assert!((0.0..=1.0).contains(&pdr));
        }

        #[test]
        fn symmetric_set_reads_back_both_ways(
            a in 0u32..8, b in 0u32..8, ch in 0u8..4, v in 0.0f64..=1.0,
        ) {
            prop_assume!(a != b);
            let mut m = ConnectivityMatrix::fully_connected(8, 4);
            m.set_pdr_both_directions(MoteId(a), MoteId(b), Channel(ch), v).unwrap();
            prop_assert_eq!(m.get_pdr(MoteId(a), MoteId(b), Channel(ch)), v);
            prop_assert_eq!(m.get_pdr(MoteId(b), MoteId(a), Channel(ch)), v);
        }
    }
}

#[cfg(test)]
mod topology {
    use ts_core::{MoteId, SimRng};

    use crate::{NetError, Topology, TopologyKind};

    fn build(kind: TopologyKind, n: u32) -> Topology {
        Topology::create(kind, n, &mut SimRng::new(42)).unwrap()
    }

    #[test]
    fn names_parse() {
        assert_eq!("RANDOM".parse::<TopologyKind>().unwrap(), TopologyKind::Random);
        assert_eq!("BINARY_TREE".parse::<TopologyKind>().unwrap(), TopologyKind::BinaryTree);
        assert_eq!(TopologyKind::FullMesh.to_string(), "FULL_MESH");
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert!(matches!(
            "STAR".parse::<TopologyKind>(),
            Err(NetError::UnknownTopology(name)) if name == "STAR"
        ));
    }

    #[test]
    fn recognised_but_unimplemented_modes_name_themselves() {
        for name in ["LINE", "LATTICE", "MIN_DISTANCE"] {
            match TopologyKind::parse_supported(name) {
                Err(NetError::UnsupportedTopology(n)) => assert_eq!(n, name),
                other => panic!("expected unsupported error for {name}, got {other:?}"),
            }
            let kind: TopologyKind = name.parse().unwrap();
            let err = Topology::create(kind, 4, &mut SimRng::new(0)).unwrap_err();
            assert!(err.to_string().contains(name));
        }
    }

    #[test]
    fn full_mesh_pairs_every_ordered_pair() {
        let t = build(TopologyKind::FullMesh, 4);
        assert_eq!(t.pairs().count(), 12);
        assert_eq!(t.peers(MoteId(2)), &[MoteId(0), MoteId(1), MoteId(3)]);
        assert!(t.pairs().all(|(a, b)| a != b));
    }

    #[test]
    fn random_pairs_each_mote_with_one_other() {
        for seed in 0..20 {
            let t = Topology::create(TopologyKind::Random, 6, &mut SimRng::new(seed)).unwrap();
            for i in 0..6 {
                let peers = t.peers(MoteId(i));
                assert_eq!(peers.len(), 1);
                assert_ne!(peers[0], MoteId(i));
                assert!(peers[0].0 < 6);
            }
        }
    }

    #[test]
    fn random_is_reproducible_per_seed() {
        let a = Topology::create(TopologyKind::Random, 10, &mut SimRng::new(5)).unwrap();
        let b = Topology::create(TopologyKind::Random, 10, &mut SimRng::new(5)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn single_mote_random_has_no_peer() {
        let t = build(TopologyKind::Random, 1);
        assert!(t.peers(MoteId(0)).is_empty());
    }

    #[test]
    fn binary_tree_children_follow_heap_layout() {
        for n in 1..=16u32 {
            let t = build(TopologyKind::BinaryTree, n);
            for i in 0..n {
                let children = t.tree_children(MoteId(i));
                assert_eq!(children.contains(&MoteId(2 * i + 1)), 2 * i + 1 < n, "n={n} i={i}");
                assert_eq!(children.contains(&MoteId(2 * i + 2)), 2 * i + 2 < n, "n={n} i={i}");
            }
        }
    }

    #[test]
    fn binary_tree_gives_each_non_root_exactly_one_parent() {
        let n = 11;
        let t = build(TopologyKind::BinaryTree, n);
        assert_eq!(t.tree_parent(MoteId(0)), None);
        for i in 1..n {
            assert_eq!(t.tree_parent(MoteId(i)), Some(MoteId((i - 1) / 2)));
            let parent_edges = (0..n).filter(|&p| t.tree_children(MoteId(p)).contains(&MoteId(i))).count();
            assert_eq!(parent_edges, 1);
        }
    }

    #[test]
    fn binary_tree_edges_are_bidirectional() {
        let t = build(TopologyKind::BinaryTree, 7);
        assert_eq!(t.peers(MoteId(1)), &[MoteId(0), MoteId(3), MoteId(4)]);
        for (a, b) in t.pairs() {
            assert!(t.peers(b).contains(&a));
        }
    }
}
