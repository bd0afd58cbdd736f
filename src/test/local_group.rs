use crate::net::{Group, GroupError, LocalMesh, MeshError, run_workers};

#[test]
fn mesh_needs_at_least_one_host() {
    assert_eq!(LocalMesh::new(0).unwrap_err(), MeshError::EmptyGroup);
    let mesh = LocalMesh::new(3).expect("mesh");
    assert_eq!(mesh.num_hosts(), 3);
    let hosts = mesh.into_hosts();
    for (rank, host) in hosts.iter().enumerate() {
        assert_eq!(host.my_host_rank(), rank);
        assert_eq!(host.num_hosts(), 3);
    }
}

#[test]
fn messages_between_a_pair_stay_in_order() {
    let mut hosts = LocalMesh::new(2).expect("mesh").into_hosts();
    let mut h1 = hosts.pop().expect("host 1");
    let mut h0 = hosts.pop().expect("host 0");

    for i in 0..5u32 {
        h0.send_to(1, &i).expect("send");
    }
    h0.send_to(1, &"done".to_string()).expect("send");

    let got: Vec<u32> = (0..5).map(|_| h1.receive_from(0).expect("recv")).collect();
    assert_eq!(got, vec![0, 1, 2, 3, 4]);
    let tail: String = h1.receive_from(0).expect("recv");
    assert_eq!(tail, "done");

    assert_eq!(h0.stats().sent_msgs, 6);
    assert_eq!(h0.stats().sent_to.get(&1), Some(&6));
    assert_eq!(h1.stats().received_msgs, 6);
    assert_eq!(h1.stats().received_bytes, h0.stats().sent_bytes);

    h1.reset_stats();
    assert_eq!(h1.stats().total_msgs(), 0);
}

#[test]
fn connection_is_keyed_by_peer() {
    let mut hosts = LocalMesh::new(3).expect("mesh").into_hosts();
    let (left, right) = hosts.split_at_mut(2);
    let h0 = &mut left[0];
    let h2 = &mut right[0];

    let mut conn = h0.connection(2);
    assert_eq!(conn.peer(), 2);
    conn.send(&vec![1i64, 2, 3]).expect("send");

    let got: Vec<i64> = h2.connection(0).receive().expect("recv");
    assert_eq!(got, vec![1, 2, 3]);
}

#[test]
fn bad_peers_are_rejected() {
    let mut hosts = LocalMesh::new(2).expect("mesh").into_hosts();
    let h0 = &mut hosts[0];

    assert!(matches!(
        h0.send_to(0, &1u8),
        Err(GroupError::SelfMessage { rank: 0 })
    ));
    assert!(matches!(
        h0.send_to(5, &1u8),
        Err(GroupError::InvalidPeer { peer: 5, num_hosts: 2 })
    ));
    assert!(matches!(
        h0.receive_from::<u8>(2),
        Err(GroupError::InvalidPeer { peer: 2, num_hosts: 2 })
    ));
    assert_eq!(h0.stats().total_msgs(), 0);
}

#[test]
fn dropped_peer_disconnects() {
    let mut hosts = LocalMesh::new(2).expect("mesh").into_hosts();
    let h1 = hosts.pop().expect("host 1");
    drop(h1);
    let h0 = &mut hosts[0];
    assert!(matches!(
        h0.send_to(1, &1u8),
        Err(GroupError::Disconnected { peer: 1 })
    ));
    assert!(matches!(
        h0.receive_from::<u8>(1),
        Err(GroupError::Disconnected { peer: 1 })
    ));
}

#[test]
fn mismatched_message_type_is_a_decode_error() {
    let mut hosts = LocalMesh::new(2).expect("mesh").into_hosts();
    let mut h1 = hosts.pop().expect("host 1");
    let mut h0 = hosts.pop().expect("host 0");
    h0.send_to(1, &"text".to_string()).expect("send");
    assert!(matches!(
        h1.receive_from::<u64>(0),
        Err(GroupError::Decode { peer: 0, .. })
    ));
}

#[test]
fn run_workers_orders_results_by_rank() {
    let out = run_workers(4, |g| g.my_host_rank() * 10).expect("workers");
    assert_eq!(out, vec![0, 10, 20, 30]);
}

#[test]
fn run_workers_reports_panics() {
    let err = run_workers(3, |g| {
        if g.my_host_rank() == 2 {
            panic!("boom");
        }
        g.my_host_rank()
    })
    .unwrap_err();
    assert_eq!(err, MeshError::WorkerPanicked { rank: 2 });
}
