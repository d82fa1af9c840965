//! Route installation and per-table dump round trips.

use std::net::Ipv4Addr;

use rtfollow::{Route, RouteSpec, RouteStatus, TableManager};

use crate::common::TestNamespace;

const TABLE: u32 = 1_111_111;
const GATEWAY: Ipv4Addr = Ipv4Addr::new(100, 100, 100, 100);

#[tokio::test]
async fn installed_route_comes_back_in_the_table_dump() {
    require_root!();
    let ns = TestNamespace::new("route");
    let conn = ns.connection();
    let ifindex = ns.add_dummy(&conn, "dm0").await;
    conn.add_address(ifindex, Ipv4Addr::new(100, 100, 100, 1), 24)
        .await
        .unwrap();

    let spec = RouteSpec::new(Ipv4Addr::new(192, 168, 1, 0), 24, GATEWAY)
        .oif(ifindex)
        .table(TABLE);
    conn.add_route(&spec).await.unwrap();

    let mut manager = TableManager::new(conn);
    manager.follow(TABLE, "test");
    assert_eq!(manager.refresh(TABLE).await.unwrap(), 1);

    let table = manager.get(TABLE).unwrap();
    assert_eq!(table.len(), 1);

    let route = &table.routes()[0];
    assert_eq!(route.destination, Some(Ipv4Addr::new(192, 168, 1, 0).into()));
    assert_eq!(route.gateway, Some(GATEWAY.into()));
    assert_eq!(route.prefix_len, 24);
    assert_eq!(route.table, TABLE);
    assert_eq!(route.oif, ifindex);
    assert_eq!(route.status, RouteStatus::Announced);
}

#[tokio::test]
async fn one_route_per_protocol_id_all_survive_a_refresh() {
    require_root!();
    let ns = TestNamespace::new("sweep");
    let conn = ns.connection();
    let ifindex = ns.add_dummy(&conn, "dm0").await;
    conn.add_address(ifindex, Ipv4Addr::new(100, 100, 100, 1), 24)
        .await
        .unwrap();

    for protocol in 1..=254u8 {
        let spec = RouteSpec::new(Ipv4Addr::new(10, 20, protocol, 0), 24, GATEWAY)
            .oif(ifindex)
            .table(TABLE)
            .protocol(protocol);
        conn.add_route(&spec).await.unwrap();
    }

    let mut manager = TableManager::new(conn);
    manager.follow(TABLE, "sweep");
    assert_eq!(manager.refresh(TABLE).await.unwrap(), 254);

    let table = manager.get(TABLE).unwrap();
    assert_eq!(table.len(), 254);
    let mut protocols: Vec<u8> = table.routes().iter().map(|route| route.protocol).collect();
    protocols.sort_unstable();
    assert_eq!(protocols, (1..=254u8).collect::<Vec<_>>());
}

#[tokio::test]
async fn never_populated_table_dumps_empty() {
    require_root!();
    let ns = TestNamespace::new("empty");
    let conn = ns.connection();

    // without NETLINK_GET_STRICT_CHK the kernel ignores the TABLE filter
    // and enumerates every table, so only assert that nothing in the raw
    // dump belongs to the asked-for table
    let dump = conn.dump_routes(4_242_424).await.unwrap();
    for item in dump.messages() {
        let (header, payload) = item.unwrap();
        if let Some(route) = Route::from_message(header, payload).unwrap() {
            assert_ne!(route.table, 4_242_424);
        }
    }

    let mut manager = TableManager::new(conn);
    manager.follow(4_242_424, "empty");
    assert_eq!(manager.refresh(4_242_424).await.unwrap(), 0);
    assert!(manager.get(4_242_424).unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_install_is_reported_by_the_kernel() {
    require_root!();
    let ns = TestNamespace::new("dup");
    let conn = ns.connection();
    let ifindex = ns.add_dummy(&conn, "dm0").await;
    conn.add_address(ifindex, Ipv4Addr::new(100, 100, 100, 1), 24)
        .await
        .unwrap();

    let spec = RouteSpec::new(Ipv4Addr::new(192, 168, 9, 0), 24, GATEWAY)
        .oif(ifindex)
        .table(TABLE);
    conn.add_route(&spec).await.unwrap();

    let err = conn.add_route(&spec).await.unwrap_err();
    assert!(err.is_already_exists(), "{err}");
}
