//! Hop-by-hop packet forwarding across a set of named routers.
//!
//! Each router owns an IPv4 [`RouteTable`] whose values are [`NextHop`]s. A
//! packet is looked up at its source router, then handed to whichever router
//! the matched route names, until a route says [`NextHop::Local`] or the
//! packet is dropped.

use std::fmt;
use std::net::Ipv4Addr;

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::error::{ForwardError, NetworkError};
use crate::ipv4::{Ipv4Prefix, RouteTable};

const DEFAULT_MAX_HOPS: usize = 50;

/// Where a matched route sends the packet.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NextHop {
    /// Deliver at this router.
    Local,
    /// Forward to the router with this name.
    Router(String),
}

impl NextHop {
    pub const LOCAL: &'static str = "LOCAL";
}

impl From<&str> for NextHop {
    /// `"LOCAL"` is local delivery; anything else names a router.
    fn from(s: &str) -> Self {
        if s == Self::LOCAL {
            NextHop::Local
        } else {
            NextHop::Router(s.to_string())
        }
    }
}

impl fmt::Display for NextHop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NextHop::Local => f.write_str(Self::LOCAL),
            NextHop::Router(name) => f.write_str(name),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ForwardingConfig {
    /// Lookups allowed per packet before it is treated as looping.
    pub max_hops: usize,
}

impl Default for ForwardingConfig {
    fn default() -> Self {
        Self {
            max_hops: DEFAULT_MAX_HOPS,
        }
    }
}

impl ForwardingConfig {
    /// Sets the number of lookups a packet may take before it is dropped.
    pub fn max_hops(mut self, max_hops: usize) -> Self {
        self.max_hops = max_hops;
        self
    }
}

/// A named router and its forwarding table.
#[derive(Clone, Debug)]
pub struct Router {
    name: String,
    table: RouteTable<NextHop>,
}

impl Router {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: RouteTable::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &RouteTable<NextHop> {
        &self.table
    }

    /// Adds `prefix -> next_hop`, e.g. `("10.0.0.0/8", "B")`.
    pub fn add_route(
        &mut self,
        prefix: &str,
        next_hop: impl Into<NextHop>,
    ) -> Result<(), NetworkError> {
        let prefix: Ipv4Prefix = prefix.parse()?;
        self.table
            .insert(prefix, next_hop.into())
            .map_err(|_| NetworkError::DuplicateRoute {
                router: self.name.clone(),
                prefix: prefix.to_string(),
            })
    }

    pub fn next_hop(&self, dst: Ipv4Addr) -> Option<&NextHop> {
        self.table.lookup(dst)
    }
}

/// Outcome of a successful delivery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delivery {
    /// Routers visited, from the source to the delivering router.
    pub path: Vec<String>,
}

impl Delivery {
    pub fn delivered_at(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }

    /// Number of forwards between routers.
    pub fn hops(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

/// Routers by name.
#[derive(Default)]
pub struct Network {
    routers: FxHashMap<String, Router>,
    config: ForwardingConfig,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ForwardingConfig) -> Self {
        Self {
            routers: FxHashMap::default(),
            config,
        }
    }

    pub fn config(&self) -> &ForwardingConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ForwardingConfig) {
        self.config = config;
    }

    pub fn add_router(&mut self, name: &str) -> Result<&mut Router, NetworkError> {
        if self.routers.contains_key(name) {
            return Err(NetworkError::DuplicateRouter(name.to_string()));
        }
        Ok(self
            .routers
            .entry(name.to_string())
            .or_insert_with(|| Router::new(name)))
    }

    pub fn router(&self, name: &str) -> Option<&Router> {
        self.routers.get(name)
    }

    pub fn add_route(
        &mut self,
        router: &str,
        prefix: &str,
        next_hop: impl Into<NextHop>,
    ) -> Result<(), NetworkError> {
        self.routers
            .get_mut(router)
            .ok_or_else(|| NetworkError::UnknownRouter(router.to_string()))?
            .add_route(prefix, next_hop)
    }

    /// Routers sorted by name.
    pub fn routers(&self) -> Vec<&Router> {
        let mut routers: Vec<_> = self.routers.values().collect();
        routers.sort_by(|a, b| a.name.cmp(&b.name));
        routers
    }

    pub fn len(&self) -> usize {
        self.routers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routers.is_empty()
    }

    /// Forwards a packet for `dst` starting at router `src`.
    pub fn route_packet(&self, src: &str, dst: Ipv4Addr) -> Result<Delivery, ForwardError> {
        let mut current = self
            .routers
            .get(src)
            .ok_or_else(|| ForwardError::UnknownRouter(src.to_string()))?;
        let mut path = vec![current.name.clone()];
        debug!(%dst, src, "routing packet");

        for _ in 0..self.config.max_hops {
            let Some(next_hop) = current.next_hop(dst) else {
                warn!(router = %current.name, %dst, "no route, packet dropped");
                return Err(ForwardError::NoRoute {
                    router: current.name.clone(),
                });
            };
            debug!(router = %current.name, %next_hop, "next hop");

            let name = match next_hop {
                NextHop::Local => {
                    debug!(router = %current.name, %dst, "delivered locally");
                    return Ok(Delivery { path });
                }
                NextHop::Router(name) => name,
            };

            let Some(next) = self.routers.get(name) else {
                warn!(
                    router = %current.name,
                    next_hop = %name,
                    "next hop not found, packet dropped"
                );
                return Err(ForwardError::UnknownNextHop {
                    router: current.name.clone(),
                    next_hop: name.clone(),
                });
            };
            if next.name == current.name {
                warn!(router = %current.name, "loop detected");
                return Err(ForwardError::SelfLoop {
                    router: current.name.clone(),
                });
            }

            current = next;
            path.push(current.name.clone());
        }

        warn!(max_hops = self.config.max_hops, %dst, "hop limit exceeded");
        Err(ForwardError::HopLimitExceeded {
            max_hops: self.config.max_hops,
            path,
        })
    }

    /// Four routers A to D:
    ///
    /// | router | routes |
    /// |--------|--------|
    /// | A | 10/8 -> B, 192.168/16 -> C, default -> B |
    /// | B | 192.168.1/24 -> LOCAL, 10/8 -> C, default -> C |
    /// | C | 10/8 -> D, 172.16/12 -> LOCAL, default -> D |
    /// | D | 10/8 -> LOCAL |
    pub fn four_router_demo() -> Result<Self, NetworkError> {
        let mut net = Network::new();
        for name in ["A", "B", "C", "D"] {
            net.add_router(name)?;
        }
        let routes = [
            ("A", "10.0.0.0/8", "B"),
            ("A", "192.168.0.0/16", "C"),
            ("A", "0.0.0.0/0", "B"),
            ("B", "192.168.1.0/24", NextHop::LOCAL),
            ("B", "10.0.0.0/8", "C"),
            ("B", "0.0.0.0/0", "C"),
            ("C", "10.0.0.0/8", "D"),
            ("C", "172.16.0.0/12", NextHop::LOCAL),
            ("C", "0.0.0.0/0", "D"),
            ("D", "10.0.0.0/8", NextHop::LOCAL),
        ];
        for (router, prefix, next_hop) in routes {
            net.add_route(router, prefix, next_hop)?;
        }
        Ok(net)
    }
}

impl fmt::Debug for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Network")
            .field("routers", &self.routers())
            .field("config", &self.config)
            .finish()
    }
}
