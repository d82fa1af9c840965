//! Manager end-to-end: follow, refresh, live updates.

use std::net::Ipv4Addr;
use std::time::Duration;

use tokio_stream::StreamExt;

use rtfollow::netlink::groups;
use rtfollow::{RouteStatus, RouteUpdates, TableManager};

use crate::common::TestNamespace;

const MAIN: u32 = 254;

#[tokio::test]
async fn live_updates_reconcile_into_the_followed_table() {
    require_root!();
    let ns = TestNamespace::new("mgr");
    let mut conn = ns.connection();
    let ifindex = ns.add_dummy(&conn, "dm0").await;
    conn.add_address(ifindex, Ipv4Addr::new(100, 64, 0, 1), 24)
        .await
        .unwrap();

    // subscribe only once the scaffolding is quiet
    conn.subscribe(groups::IPV4_ROUTE).unwrap();

    let mut manager = TableManager::new(conn);
    manager.follow(MAIN, "main");
    manager.refresh(MAIN).await.unwrap();
    assert!(manager.is_dirty());
    let baseline = manager.get(MAIN).unwrap().len();
    assert!(!manager.is_dirty());

    ns.exec(&[
        "ip", "route", "add", "192.168.77.0/24", "via", "100.64.0.2",
    ]);
    let announced = manager
        .wait_for_update(Duration::from_secs(5))
        .await
        .unwrap()
        .expect("a route event");
    assert_eq!(announced.status, RouteStatus::Announced);
    assert_eq!(announced.table, MAIN);
    manager.apply(announced).unwrap();
    assert!(manager.is_dirty());
    assert_eq!(manager.get(MAIN).unwrap().len(), baseline + 1);

    ns.exec(&[
        "ip", "route", "del", "192.168.77.0/24", "via", "100.64.0.2",
    ]);
    let withdrawn = manager
        .wait_for_update(Duration::from_secs(5))
        .await
        .unwrap()
        .expect("a route event");
    assert_eq!(withdrawn.status, RouteStatus::Withdrawn);
    manager.apply(withdrawn).unwrap();
    assert_eq!(manager.get(MAIN).unwrap().len(), baseline);
}

#[tokio::test]
async fn waiting_with_nothing_subscribed_times_out() {
    require_root!();
    let ns = TestNamespace::new("quiet");
    let manager = TableManager::new(ns.connection());

    let err = manager
        .wait_for_update(Duration::from_millis(200))
        .await
        .unwrap_err();
    assert!(err.is_timeout(), "{err}");
}

#[tokio::test]
async fn update_stream_yields_parsed_routes() {
    require_root!();
    let ns = TestNamespace::new("stream");
    let mut conn = ns.connection();
    let ifindex = ns.add_dummy(&conn, "dm0").await;
    conn.add_address(ifindex, Ipv4Addr::new(100, 64, 1, 1), 24)
        .await
        .unwrap();
    conn.subscribe(groups::IPV4_ROUTE).unwrap();

    let mut updates = RouteUpdates::new(conn);
    ns.exec(&["ip", "route", "add", "192.168.88.0/24", "via", "100.64.1.2"]);

    let route = tokio::time::timeout(Duration::from_secs(5), updates.next())
        .await
        .expect("an update before the deadline")
        .expect("stream stays open")
        .unwrap();
    assert_eq!(route.status, RouteStatus::Announced);
    assert_eq!(
        route.destination,
        Some(Ipv4Addr::new(192, 168, 88, 0).into())
    );
}
