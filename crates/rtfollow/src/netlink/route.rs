//! Route installation and per-table dumps.

use std::net::Ipv4Addr;

use super::builder::MessageBuilder;
use super::connection::Connection;
use super::dump::DumpBuffer;
use super::error::{Error, Result};
use super::message::{rtm, NLM_F_ACK, NLM_F_CREATE, NLM_F_DUMP, NLM_F_REQUEST};
use super::types::route::{rt_table, rta, rtn, rtprot, scope, RtMsg};
use super::types::AF_INET;

/// An IPv4 route to install: the destination network, the gateway, and its
/// placement (table, priority, outgoing interface, origin protocol).
#[derive(Debug, Clone)]
pub struct RouteSpec {
    destination: Ipv4Addr,
    prefix_len: u8,
    gateway: Ipv4Addr,
    priority: u32,
    oif: u32,
    table: u32,
    protocol: u8,
}

impl RouteSpec {
    pub fn new(destination: Ipv4Addr, prefix_len: u8, gateway: Ipv4Addr) -> Self {
        Self {
            destination,
            prefix_len,
            gateway,
            priority: 0,
            oif: 0,
            table: rt_table::MAIN as u32,
            protocol: rtprot::BOOT,
        }
    }

    pub fn priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    /// Outgoing interface index.
    pub fn oif(mut self, ifindex: u32) -> Self {
        self.oif = ifindex;
        self
    }

    /// Target routing table; ids above 255 travel as an attribute.
    pub fn table(mut self, table: u32) -> Self {
        self.table = table;
        self
    }

    /// Origin protocol recorded with the route.
    pub fn protocol(mut self, protocol: u8) -> Self {
        self.protocol = protocol;
        self
    }

    /// Reject bad prefixes before anything touches the socket.
    pub fn validate(&self) -> Result<()> {
        if self.prefix_len == 0 || self.prefix_len >= 32 {
            return Err(Error::PrefixLength {
                prefix_len: self.prefix_len,
            });
        }
        let mask = !0u32 << (32 - self.prefix_len);
        if u32::from(self.destination) & !mask != 0 {
            return Err(Error::HostBits {
                destination: self.destination,
                prefix_len: self.prefix_len,
            });
        }
        Ok(())
    }

    pub(crate) fn build(&self) -> Result<MessageBuilder> {
        self.validate()?;

        let mut builder =
            MessageBuilder::new(rtm::NEWROUTE, NLM_F_REQUEST | NLM_F_ACK | NLM_F_CREATE);

        let mut body = RtMsg::new()
            .with_family(AF_INET)
            .with_table(rt_table::UNSPEC)
            .with_protocol(self.protocol)
            .with_scope(scope::UNIVERSE)
            .with_type(rtn::UNICAST);
        if self.destination != Ipv4Addr::UNSPECIFIED {
            body = body.with_dst_len(self.prefix_len).with_scope(scope::LINK);
        }
        builder.body(&body);

        // placement attributes are always written, in this order
        builder.attr(rta::GATEWAY, &self.gateway.octets());
        builder.attr(rta::DST, &self.destination.octets());
        builder.attr_u32(rta::PRIORITY, self.priority);
        builder.attr_u32(rta::OIF, self.oif);
        builder.attr_u32(rta::TABLE, self.table);
        Ok(builder)
    }
}

pub(crate) fn table_dump(table: u32) -> MessageBuilder {
    let mut builder = MessageBuilder::new(rtm::GETROUTE, NLM_F_REQUEST | NLM_F_DUMP);
    builder.body(&RtMsg::new().with_family(AF_INET));
    builder.attr_u32(rta::TABLE, table);
    builder
}

impl Connection {
    /// Install a route.
    pub async fn add_route(&self, route: &RouteSpec) -> Result<()> {
        self.request_ack(route.build()?).await
    }

    /// Dump every route in one kernel table into a single buffer.
    pub async fn dump_routes(&self, table: u32) -> Result<DumpBuffer> {
        self.dump(table_dump(table)).await
    }
}
