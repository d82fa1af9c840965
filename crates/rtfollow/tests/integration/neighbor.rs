//! Neighbor entry round trips.

use std::net::Ipv4Addr;

use crate::common::TestNamespace;

#[tokio::test]
async fn neighbor_add_update_probe_delete() {
    require_root!();
    let ns = TestNamespace::new("neigh");
    let conn = ns.connection();
    let ifindex = ns.add_dummy(&conn, "dm0").await;
    conn.add_address(ifindex, Ipv4Addr::new(10, 50, 0, 1), 24)
        .await
        .unwrap();

    let peer = Ipv4Addr::new(10, 50, 0, 2);
    conn.add_neighbor(ifindex, peer, [0x02, 0, 0, 0, 0, 0x2a])
        .await
        .unwrap();
    conn.update_neighbor(ifindex, peer).await.unwrap();
    conn.probe_neighbor(ifindex, Ipv4Addr::new(10, 50, 0, 3))
        .await
        .unwrap();

    conn.delete_neighbor(ifindex, peer).await.unwrap();
    let err = conn
        .delete_neighbor(ifindex, Ipv4Addr::new(10, 50, 0, 99))
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "{err}");
}

#[tokio::test]
async fn stale_flush_gets_a_kernel_verdict() {
    require_root!();
    let ns = TestNamespace::new("stale");
    let conn = ns.connection();
    let ifindex = ns.add_dummy(&conn, "dm0").await;

    // kernels that require a destination on delete refuse the flush with
    // EINVAL; the request must come back with a verdict either way
    for target in [ifindex, 0] {
        match conn.flush_stale_neighbors(target).await {
            Ok(()) => {}
            Err(e) => assert_eq!(e.errno(), Some(libc::EINVAL), "{e}"),
        }
    }
}
