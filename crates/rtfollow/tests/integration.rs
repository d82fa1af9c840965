//! End-to-end tests against a live kernel.
//!
//! Each test creates its own network namespace and tears it down again,
//! which needs root and the `ip` tool; tests skip themselves otherwise.

#[macro_use]
#[path = "common/mod.rs"]
mod common;

#[path = "integration/address.rs"]
mod address;
#[path = "integration/manager.rs"]
mod manager;
#[path = "integration/neighbor.rs"]
mod neighbor;
#[path = "integration/route.rs"]
mod route;
#[path = "integration/vrf.rs"]
mod vrf;
