//! One followed routing table.

use super::route::{Route, RouteStatus};

/// In-memory copy of a kernel routing table: the records most recently
/// reconciled into it, in arrival order.
#[derive(Debug, Clone)]
pub struct RoutingTable {
    id: u32,
    name: String,
    routes: Vec<Route>,
}

impl RoutingTable {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            routes: Vec::new(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn contains(&self, route: &Route) -> bool {
        self.routes.iter().any(|known| known == route)
    }

    /// Fold one route event into the table.
    ///
    /// With `check_duplicates`, an announcement inserts only when the route
    /// is new and a withdrawal removes only when it is present; anything
    /// else is rejected with `false`. Without it, announcements append
    /// unconditionally, the fast path for trusted full dumps, and
    /// withdrawals are always rejected.
    pub fn reconcile(&mut self, route: Route, check_duplicates: bool) -> bool {
        if !check_duplicates {
            return match route.status {
                RouteStatus::Announced => {
                    self.routes.push(route);
                    true
                }
                RouteStatus::Withdrawn => false,
            };
        }

        let position = self.routes.iter().position(|known| *known == route);
        match (route.status, position) {
            (RouteStatus::Announced, None) => {
                self.routes.push(route);
                true
            }
            (RouteStatus::Withdrawn, Some(at)) => {
                self.routes.remove(at);
                true
            }
            _ => false,
        }
    }

    /// Append the announced records of a trusted dump, returning how many
    /// were taken.
    pub fn load<I: IntoIterator<Item = Route>>(&mut self, routes: I) -> usize {
        let mut taken = 0;
        for route in routes {
            if self.reconcile(route, false) {
                taken += 1;
            }
        }
        taken
    }
}
