use fabric_models::datastructures::TreeParams;
use fabric_models::topology::Topology;

#[test]
fn test_counts_depth_one() {
    let params = TreeParams {
        depth: 1,
        ..TreeParams::default()
    };
    let topology = Topology::generate(&params).unwrap();
    assert_eq!(
        (
            topology.servers,
            topology.switches,
            topology.vms,
            topology.flows,
            topology.nodes,
            topology.links
        ),
        (2, 1, 2, 1, 3, 2)
    );
}

#[test]
fn test_counts_depth_two() {
    let topology = Topology::generate(&TreeParams::default()).unwrap();
    assert_eq!(
        (
            topology.servers,
            topology.switches,
            topology.vms,
            topology.flows,
            topology.nodes,
            topology.links
        ),
        (4, 3, 4, 2, 7, 6)
    );
}

#[test]
fn test_counts_follow_formulas() {
    for depth in 1..=7u32 {
        let params = TreeParams {
            depth,
            ..TreeParams::default()
        };
        let topology = Topology::generate(&params).unwrap();
        let servers = 2usize.pow(depth);
        let expected_links = (0..depth.saturating_sub(1))
            .map(|l| 2usize.pow(l) * 2usize.pow(l + 1))
            .sum::<usize>()
            + 2 * 2usize.pow(depth - 1);
        assert_eq!(topology.servers, servers);
        assert_eq!(topology.switches, servers - 1);
        assert_eq!(topology.vms, topology.servers);
        assert_eq!(topology.flows, topology.vms / 2);
        assert_eq!(topology.nodes, topology.servers + topology.switches);
        assert_eq!(topology.links, expected_links);
    }
}
