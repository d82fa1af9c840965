//! VRF device lifecycle.

use rtfollow::VrfLink;

use crate::common::TestNamespace;

#[tokio::test]
async fn vrf_create_lookup_enslave_delete() {
    require_root!();
    let ns = TestNamespace::new("vrf");
    let conn = ns.connection();

    let vrf = VrfLink::new("vrf-blue", 1042).up();
    conn.create_vrf(&vrf).await.unwrap();

    let vrf_index = conn.link_index_by_name("vrf-blue").await.unwrap();
    assert_ne!(vrf_index, 0);
    assert_eq!(conn.vrf_table_by_name("vrf-blue").await.unwrap(), 1042);

    // creating the same device again must be refused
    let err = conn.create_vrf(&vrf).await.unwrap_err();
    assert!(err.is_already_exists(), "{err}");

    // a dummy is not a vrf, its table lookup fails
    let ifindex = ns.add_dummy(&conn, "dm0").await;
    assert!(conn.vrf_table_by_name("dm0").await.is_err());

    conn.set_link_master(ifindex, vrf_index).await.unwrap();
    conn.set_link_master(ifindex, 0).await.unwrap();

    conn.delete_link(vrf_index).await.unwrap();
    let err = conn.link_index_by_name("vrf-blue").await.unwrap_err();
    assert!(err.is_not_found(), "{err}");
}

#[tokio::test]
async fn link_state_follows_requests() {
    require_root!();
    let ns = TestNamespace::new("state");
    let conn = ns.connection();

    let ifindex = ns.add_dummy(&conn, "dm0").await;
    conn.set_link_state(ifindex, false).await.unwrap();
    conn.set_link_state(ifindex, true).await.unwrap();

    let err = conn.link_index_by_name("no-such-dev").await.unwrap_err();
    assert!(err.is_not_found(), "{err}");
}
