//! Routing-table state: canonical route records, per-table reconciliation,
//! and the manager that keeps followed tables in step with the kernel.

pub mod manager;
pub mod route;
pub mod stream;
pub mod table;

pub use manager::{TableManager, TableRegistry};
pub use route::{Route, RouteStatus};
pub use stream::RouteUpdates;
pub use table::RoutingTable;
