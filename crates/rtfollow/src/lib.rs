//! Follow Linux kernel routing tables over raw rtnetlink.
//!
//! The crate speaks the rtnetlink wire protocol itself, netlink-sys only
//! supplies the socket. On top of the protocol layer sit the operations a
//! routing daemon needs around its tables: installing routes, creating VRF
//! devices bound to a table, assigning addresses, driving neighbor
//! entries, and a manager that mirrors whole kernel tables and folds live
//! announcements and withdrawals into them.
//!
//! ```no_run
//! use std::time::Duration;
//! use rtfollow::TableManager;
//!
//! # async fn example() -> rtfollow::Result<()> {
//! let mut manager = TableManager::connect()?;
//! manager.follow(254, "main");
//! manager.refresh(254).await?;
//!
//! while let Some(route) = manager.wait_for_update(Duration::from_secs(60)).await? {
//!     println!("{route}");
//!     let _ = manager.apply(route);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Requests and dumps need a live NETLINK_ROUTE socket; mutating the
//! kernel's state additionally needs CAP_NET_ADMIN.

pub mod fib;
pub mod netlink;

pub use fib::{Route, RouteStatus, RouteUpdates, RoutingTable, TableManager, TableRegistry};
pub use netlink::{Connection, DumpBuffer, Error, Result, RouteSpec, VrfLink};
