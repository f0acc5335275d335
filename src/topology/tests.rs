use super::*;
use crate::test_utils::*;
use itertools::Itertools;

#[test]
fn test_derived_counts() {
    for depth in 1..=6u32 {
        let params = TreeParams {
            depth,
            ..default_params()
        };
        let topology = Topology::generate(&params).unwrap();
        let servers = 1 << depth;
        assert_eq!(topology.servers, servers);
        assert_eq!(topology.switches, servers - 1);
        assert_eq!(topology.vms, servers);
        assert_eq!(topology.flows, servers / 2);
        assert_eq!(topology.nodes, 2 * servers - 1);
        assert_eq!(topology.link_endpoints.len(), topology.links);
    }
}

#[test]
fn test_depth_one() {
    let params = TreeParams {
        depth: 1,
        ..default_params()
    };
    let topology = Topology::generate(&params).unwrap();
    assert_eq!(topology.servers, 2);
    assert_eq!(topology.switches, 1);
    assert_eq!(topology.vms, 2);
    assert_eq!(topology.flows, 1);
    assert_eq!(topology.nodes, 3);
    assert_eq!(topology.links, 2);
    // The single switch is wired to both servers.
    assert_eq!(topology.neighbors(0), &[1, 2]);
    assert!(topology.adjacency[(0, 1)]);
    assert!(topology.adjacency[(0, 2)]);
    assert!(!topology.adjacency[(1, 2)]);
    // One flow pairing the two vms.
    assert_eq!(topology.src_dst, vec![(0, 1)]);
}

#[test]
fn test_depth_two() {
    let topology = Topology::generate(&default_params()).unwrap();
    assert_eq!(topology.servers, 4);
    assert_eq!(topology.switches, 3);
    assert_eq!(topology.flows, 2);
    assert_eq!(topology.nodes, 7);
    assert_eq!(topology.links, 6);
    // Root switch 0 over leaf switches 1 and 2, two servers per leaf.
    assert_eq!(topology.neighbors(0), &[1, 2]);
    assert_eq!(topology.neighbors(1), &[0, 3, 4]);
    assert_eq!(topology.neighbors(2), &[0, 5, 6]);
    assert_eq!(topology.neighbors(3), &[1]);
    assert_eq!(
        topology.link_endpoints,
        vec![(0, 1), (0, 2), (1, 3), (1, 4), (2, 5), (2, 6)]
    );
    assert_eq!(topology.src_dst, vec![(0, 1), (2, 3)]);
}

#[test]
fn test_capacity_power_gradients() {
    // Base values 10/5/10/2 at depth 2, stepped down per level towards
    // the leaves.
    let topology = Topology::generate(&default_params()).unwrap();
    assert_eq!(
        topology.link_capacity.to_vec(),
        vec![10.0, 10.0, 8.0, 8.0, 8.0, 8.0]
    );
    assert_eq!(
        topology.idle_power.to_vec(),
        vec![20.0, 15.0, 15.0, 10.0, 10.0, 10.0, 10.0]
    );
    assert_eq!(
        topology.dyn_power.to_vec(),
        vec![4.0, 3.0, 3.0, 2.0, 2.0, 2.0, 2.0]
    );
    assert_eq!(topology.server_capacity.to_vec(), vec![10.0; 4]);
    assert_eq!(topology.cpu_util.to_vec(), vec![6.0; 4]);
    assert_eq!(topology.data_rate.to_vec(), vec![4.0; 2]);
}

#[test]
fn test_adjacency_symmetric_zero_diagonal() {
    let params = TreeParams {
        depth: 4,
        ..default_params()
    };
    let topology = Topology::generate(&params).unwrap();
    for a in 0..topology.nodes {
        assert!(!topology.adjacency[(a, a)]);
        for b in 0..topology.nodes {
            assert_eq!(topology.adjacency[(a, b)], topology.adjacency[(b, a)]);
        }
    }
}

#[test]
fn test_link_index_bijection() {
    let params = TreeParams {
        depth: 3,
        ..default_params()
    };
    let topology = Topology::generate(&params).unwrap();
    let mut seen = topology.link_index.values().copied().unique().collect_vec();
    seen.sort_unstable();
    assert_eq!(seen, (0..topology.links).collect_vec());
    for a in 0..topology.nodes {
        for b in 0..topology.nodes {
            assert_eq!(
                topology.adjacency[(a, b)],
                topology.link_index.contains_key(&(a, b))
            );
            if topology.adjacency[(a, b)] {
                assert_eq!(
                    topology.link_index[&(a, b)],
                    topology.link_index[&(b, a)]
                );
            }
        }
    }
    for (l, &(n1, n2)) in topology.link_endpoints.iter().enumerate() {
        assert!(n1 < n2);
        assert!(topology.is_switch(n1));
        assert_eq!(topology.link_index[&(n1, n2)], l);
    }
}

#[test]
fn test_neighbor_lists_match_adjacency() {
    let params = TreeParams {
        depth: 3,
        ..default_params()
    };
    let topology = Topology::generate(&params).unwrap();
    for n in 0..topology.nodes {
        let from_matrix = (0..topology.nodes)
            .filter(|&m| topology.adjacency[(n, m)])
            .collect_vec();
        assert_eq!(topology.neighbors(n), from_matrix.as_slice());
    }
}

#[test]
fn test_src_dst_partitions_vms() {
    for params in [default_params(), randomized_params(3, 7)] {
        let topology = Topology::generate(&params).unwrap();
        let mut vms = topology
            .src_dst
            .iter()
            .flat_map(|&(src, dst)| [src, dst])
            .collect_vec();
        vms.sort_unstable();
        assert_eq!(vms, (0..topology.vms).collect_vec());
    }
}

#[test]
fn test_randomized_values_within_bands() {
    let topology = Topology::generate(&randomized_params(3, 3)).unwrap();
    // cpu in [cap/2 + 1, cap - 1], rate in [avg - 1, avg + 1]
    assert!(topology.cpu_util.iter().all(|&u| (6.0..=9.0).contains(&u)));
    assert!(topology.data_rate.iter().all(|&r| (3.0..=5.0).contains(&r)));
}

#[test]
fn test_randomization_is_seeded() {
    let a = Topology::generate(&randomized_params(3, 42)).unwrap();
    let b = Topology::generate(&randomized_params(3, 42)).unwrap();
    assert_eq!(a.cpu_util, b.cpu_util);
    assert_eq!(a.data_rate, b.data_rate);
    assert_eq!(a.src_dst, b.src_dst);
    let c = Topology::generate(&randomized_params(3, 43)).unwrap();
    assert!(
        a.cpu_util != c.cpu_util
            || a.data_rate != c.data_rate
            || a.src_dst != c.src_dst
    );
}

#[test]
fn test_unrandomized_ignores_seed() {
    let a = Topology::generate(&TreeParams {
        seed: 1,
        ..default_params()
    })
    .unwrap();
    let b = Topology::generate(&TreeParams {
        seed: 2,
        ..default_params()
    })
    .unwrap();
    assert_eq!(a.cpu_util, b.cpu_util);
    assert_eq!(a.src_dst, b.src_dst);
}

#[test]
fn test_node_helpers() {
    let topology = Topology::generate(&default_params()).unwrap();
    assert!(topology.is_switch(0));
    assert!(topology.is_switch(2));
    assert!(!topology.is_switch(3));
    assert_eq!(topology.node_of_server(0), 3);
    assert_eq!(topology.server_of_node(6), 3);
    assert_eq!(topology.server_nodes().collect_vec(), vec![3, 4, 5, 6]);
    assert_eq!(level_range(0), 0..1);
    assert_eq!(level_range(1), 1..3);
    assert_eq!(level_range(2), 3..7);
}

#[test]
fn test_invalid_parameters() {
    let cases = [
        TreeParams {
            depth: 0,
            ..default_params()
        },
        TreeParams {
            server_capacity: 0,
            ..default_params()
        },
        TreeParams {
            link_capacity: 0,
            ..default_params()
        },
        TreeParams {
            avg_data_rate: 0,
            ..default_params()
        },
        // randomized cpu band [cap/2 + 1, cap - 1] is empty
        TreeParams {
            server_capacity: 2,
            randomize: true,
            ..default_params()
        },
        // link capacity gradient 3 - 2 * 2 would go negative
        TreeParams {
            depth: 3,
            link_capacity: 1,
            ..default_params()
        },
        // idle power gradient 4 * depth - 5 * depth would go negative
        TreeParams {
            idle_power: 4,
            ..default_params()
        },
    ];
    for params in cases {
        assert!(matches!(
            Topology::generate(&params),
            Err(Error::InvalidParameter(_))
        ));
    }
}

#[test]
fn test_large_base_values_do_not_overflow() {
    // base * depth exceeds u32::MAX but is fine as a float table entry.
    let params = TreeParams {
        link_capacity: 1 << 31,
        idle_power: 1 << 31,
        ..default_params()
    };
    let topology = Topology::generate(&params).unwrap();
    assert_eq!(topology.link_capacity[0], 2.0 * f64::from(1u32 << 31));
    assert_eq!(
        topology.link_capacity[topology.links - 1],
        2.0 * f64::from(1u32 << 31) - 2.0
    );
    assert_eq!(topology.idle_power[0], 2.0 * f64::from(1u32 << 31));
}

#[test]
fn test_lowest_idle_power_of_zero_is_allowed() {
    let params = TreeParams {
        idle_power: 5,
        ..default_params()
    };
    let topology = Topology::generate(&params).unwrap();
    assert_eq!(topology.idle_power[topology.nodes - 1], 0.0);
}
