//! Followed-table bookkeeping and the manager that keeps it current.

use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

use crate::netlink::message::MessageIter;
use crate::netlink::socket::groups;
use crate::netlink::{Connection, Error, Result};

use super::route::Route;
use super::table::RoutingTable;

/// Pure bookkeeping for a set of followed tables: membership, per-table
/// contents, external fib ids, and the shared change flag.
///
/// The registry never touches a socket, so everything observable about the
/// follow/apply/get cycle is decided here.
#[derive(Debug, Default)]
pub struct TableRegistry {
    tables: HashMap<u32, RoutingTable>,
    fib_ids: HashMap<u32, u32>,
    dirty: bool,
}

impl TableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start following a table. Following one that is already followed
    /// changes nothing, neither its contents nor its first-given name.
    pub fn follow(&mut self, table: u32, name: impl Into<String>) {
        self.tables
            .entry(table)
            .or_insert_with(|| RoutingTable::new(table, name));
    }

    pub fn is_followed(&self, table: u32) -> bool {
        self.tables.contains_key(&table)
    }

    /// Ids of every followed table, in no particular order.
    pub fn followed(&self) -> impl Iterator<Item = u32> + '_ {
        self.tables.keys().copied()
    }

    /// Name given to a table when it was first followed.
    pub fn name(&self, table: u32) -> Option<&str> {
        self.tables.get(&table).map(RoutingTable::name)
    }

    /// Record an external fib id for a table.
    pub fn set_fib_id(&mut self, table: u32, fib_id: u32) {
        self.fib_ids.insert(table, fib_id);
    }

    pub fn fib_id(&self, table: u32) -> Option<u32> {
        self.fib_ids.get(&table).copied()
    }

    /// Table id behind an external fib id.
    pub fn table_by_fib_id(&self, fib_id: u32) -> Option<u32> {
        self.fib_ids
            .iter()
            .find(|&(_, &known)| known == fib_id)
            .map(|(&table, _)| table)
    }

    /// Fold one route event into its table, duplicate-checked.
    ///
    /// The change flag is raised only when the table actually changed; a
    /// rejected event leaves both the table and the flag alone.
    pub fn apply(&mut self, route: Route) -> Result<()> {
        let id = route.table;
        let status = route.status;
        let table = self
            .tables
            .get_mut(&id)
            .ok_or(Error::NotFollowed { table: id })?;

        if table.reconcile(route, true) {
            self.dirty = true;
            Ok(())
        } else {
            Err(match status {
                super::route::RouteStatus::Announced => Error::RouteExists { table: id },
                super::route::RouteStatus::Withdrawn => Error::RouteMissing { table: id },
            })
        }
    }

    /// Swap in a freshly built table. The previous contents are discarded
    /// and the change flag is raised.
    pub fn install(&mut self, table: RoutingTable) -> Result<()> {
        if !self.is_followed(table.id()) {
            return Err(Error::NotFollowed { table: table.id() });
        }
        self.tables.insert(table.id(), table);
        self.dirty = true;
        Ok(())
    }

    /// Read a followed table, clearing the change flag.
    ///
    /// The flag clears even when the table is unknown: the caller has seen
    /// the current state either way.
    pub fn get(&mut self, table: u32) -> Option<&RoutingTable> {
        self.dirty = false;
        self.tables.get(&table)
    }

    /// True when some table changed since the last [`get`](Self::get).
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

/// A [`TableRegistry`] wired to a kernel connection: refreshes come from
/// route dumps and updates from the route multicast groups.
pub struct TableManager {
    conn: Connection,
    registry: TableRegistry,
}

impl TableManager {
    /// Manage tables over an existing connection. Subscribe the connection
    /// to the route groups first if live updates are wanted.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            registry: TableRegistry::new(),
        }
    }

    /// Open a connection subscribed to the IPv4 and IPv6 route groups.
    pub fn connect() -> Result<Self> {
        let conn = Connection::with_groups(&[groups::IPV4_ROUTE, groups::IPV6_ROUTE])?;
        Ok(Self::new(conn))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn registry(&self) -> &TableRegistry {
        &self.registry
    }

    pub fn follow(&mut self, table: u32, name: impl Into<String>) {
        self.registry.follow(table, name);
    }

    pub fn is_followed(&self, table: u32) -> bool {
        self.registry.is_followed(table)
    }

    pub fn name(&self, table: u32) -> Option<&str> {
        self.registry.name(table)
    }

    pub fn set_fib_id(&mut self, table: u32, fib_id: u32) {
        self.registry.set_fib_id(table, fib_id);
    }

    pub fn fib_id(&self, table: u32) -> Option<u32> {
        self.registry.fib_id(table)
    }

    pub fn apply(&mut self, route: Route) -> Result<()> {
        self.registry.apply(route)
    }

    pub fn get(&mut self, table: u32) -> Option<&RoutingTable> {
        self.registry.get(table)
    }

    pub fn is_dirty(&self) -> bool {
        self.registry.is_dirty()
    }

    /// Rebuild one followed table from a full kernel dump, returning the
    /// number of records taken from it.
    ///
    /// The table is replaced wholesale; on any failure it is left as it
    /// was, change flag included.
    pub async fn refresh(&mut self, table: u32) -> Result<usize> {
        let name = self
            .registry
            .name(table)
            .ok_or(Error::NotFollowed { table })?
            .to_owned();

        let dump = self.conn.dump_routes(table).await?;

        let mut fresh = RoutingTable::new(table, name);
        for item in dump.messages() {
            let (header, payload) = item?;
            if let Some(route) = Route::from_message(header, payload)? {
                // without strict checking the kernel dumps every table
                if route.table == table {
                    fresh.reconcile(route, false);
                }
            }
        }

        let taken = fresh.len();
        debug!(table, routes = taken, "table refreshed");
        self.registry.install(fresh)?;
        Ok(taken)
    }

    /// Wait for the next route announcement or withdrawal on the
    /// subscribed groups.
    ///
    /// Returns `Ok(None)` when the kernel sent a dump terminator instead of
    /// a route, and times out after `wait` if nothing relevant arrives.
    pub async fn wait_for_update(&self, wait: Duration) -> Result<Option<Route>> {
        let next = async {
            loop {
                let data = self.conn.recv_event().await?;
                for item in MessageIter::new(&data) {
                    let (header, payload) = item?;
                    if header.is_done() {
                        return Ok(None);
                    }
                    if let Some(route) = Route::from_message(header, payload)? {
                        return Ok(Some(route));
                    }
                }
            }
        };
        match tokio::time::timeout(wait, next).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout { waited: wait }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fib::route::RouteStatus;
    use std::net::Ipv4Addr;

    fn route(table: u32, last_octet: u8, status: RouteStatus) -> Route {
        Route {
            destination: Some(Ipv4Addr::new(10, 0, last_octet, 0).into()),
            source: None,
            gateway: None,
            prefix_len: 24,
            priority: 0,
            metric: 0,
            protocol: 3,
            table,
            oif: 2,
            status,
        }
    }

    #[test]
    fn apply_to_an_unfollowed_table_is_rejected_without_a_trace() {
        let mut registry = TableRegistry::new();
        registry.follow(100, "followed");

        let err = registry.apply(route(200, 1, RouteStatus::Announced)).unwrap_err();
        assert!(matches!(err, Error::NotFollowed { table: 200 }));

        assert!(!registry.is_followed(200));
        assert!(!registry.is_dirty());
        assert_eq!(registry.followed().collect::<Vec<_>>(), vec![100]);
    }

    #[test]
    fn apply_raises_the_change_flag_only_on_success() {
        let mut registry = TableRegistry::new();
        registry.follow(100, "t");

        registry.apply(route(100, 1, RouteStatus::Announced)).unwrap();
        assert!(registry.is_dirty());

        assert_eq!(registry.get(100).map(RoutingTable::len), Some(1));
        assert!(!registry.is_dirty());

        // a duplicate is rejected and leaves the flag down
        let err = registry.apply(route(100, 1, RouteStatus::Announced)).unwrap_err();
        assert!(matches!(err, Error::RouteExists { table: 100 }));
        assert!(!registry.is_dirty());

        // withdrawing something unknown is the other rejection
        let err = registry.apply(route(100, 9, RouteStatus::Withdrawn)).unwrap_err();
        assert!(matches!(err, Error::RouteMissing { table: 100 }));
    }

    #[test]
    fn get_clears_the_change_flag_even_for_unknown_tables() {
        let mut registry = TableRegistry::new();
        registry.follow(100, "t");
        registry.apply(route(100, 1, RouteStatus::Announced)).unwrap();
        assert!(registry.is_dirty());

        assert!(registry.get(999).is_none());
        assert!(!registry.is_dirty());
    }

    #[test]
    fn follow_is_idempotent_and_keeps_the_first_name() {
        let mut registry = TableRegistry::new();
        registry.follow(100, "first");
        registry.apply(route(100, 1, RouteStatus::Announced)).unwrap();

        registry.follow(100, "second");
        assert_eq!(registry.name(100), Some("first"));
        assert_eq!(registry.get(100).map(RoutingTable::len), Some(1));
    }

    #[test]
    fn install_replaces_wholesale_and_respects_membership() {
        let mut registry = TableRegistry::new();
        registry.follow(100, "t");
        registry.apply(route(100, 1, RouteStatus::Announced)).unwrap();
        let _ = registry.get(100);

        let mut fresh = RoutingTable::new(100, "t");
        fresh.reconcile(route(100, 8, RouteStatus::Announced), false);
        fresh.reconcile(route(100, 9, RouteStatus::Announced), false);
        registry.install(fresh).unwrap();

        assert!(registry.is_dirty());
        let table = registry.get(100).unwrap();
        assert_eq!(table.len(), 2);
        assert!(!table.contains(&route(100, 1, RouteStatus::Announced)));

        let stray = RoutingTable::new(300, "stray");
        assert!(matches!(
            registry.install(stray),
            Err(Error::NotFollowed { table: 300 })
        ));
    }

    #[test]
    fn fib_ids_map_both_ways() {
        let mut registry = TableRegistry::new();
        registry.follow(100, "t");
        assert_eq!(registry.fib_id(100), None);

        registry.set_fib_id(100, 555);
        assert_eq!(registry.fib_id(100), Some(555));
        assert_eq!(registry.table_by_fib_id(555), Some(100));
        assert_eq!(registry.table_by_fib_id(556), None);
    }
}
