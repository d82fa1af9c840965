//! Address assignment on a live interface.

use std::net::Ipv4Addr;

use rtfollow::Error;

use crate::common::TestNamespace;

#[tokio::test]
async fn secondary_address_round_trip() {
    require_root!();
    let ns = TestNamespace::new("addr");
    let conn = ns.connection();
    let ifindex = ns.add_dummy(&conn, "dm0").await;

    let address = Ipv4Addr::new(100, 100, 100, 1);
    conn.add_address(ifindex, address, 24).await.unwrap();

    let err = conn.add_address(ifindex, address, 24).await.unwrap_err();
    assert!(err.is_already_exists(), "{err}");
}

#[tokio::test]
async fn bad_arguments_never_reach_the_kernel() {
    require_root!();
    let ns = TestNamespace::new("addrval");
    let conn = ns.connection();

    let address = Ipv4Addr::new(100, 100, 100, 1);
    assert!(matches!(
        conn.add_address(0, address, 24).await,
        Err(Error::IfindexRequired)
    ));
    assert!(matches!(
        conn.add_address(1, address, 32).await,
        Err(Error::PrefixLength { prefix_len: 32 })
    ));
}
