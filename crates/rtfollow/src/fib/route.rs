//! The canonical route record and its parser.

use std::fmt;
use std::net::IpAddr;

use crate::netlink::attr::{payload, AttrIter};
use crate::netlink::message::{rtm, NlMsgHdr};
use crate::netlink::types::route::{rta, RtMsg};
use crate::netlink::Result;

/// Whether the kernel was announcing or withdrawing the route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RouteStatus {
    Announced,
    Withdrawn,
}

/// One route as the kernel reported it.
///
/// Addresses are `None` when the message carried no bytes for them; the
/// metric is the leading word of the metrics block, when one is attached.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Route {
    pub destination: Option<IpAddr>,
    pub source: Option<IpAddr>,
    pub gateway: Option<IpAddr>,
    pub prefix_len: u8,
    pub priority: u32,
    pub metric: u32,
    pub protocol: u8,
    pub table: u32,
    pub oif: u32,
    pub status: RouteStatus,
}

impl PartialEq for Route {
    /// Identity excludes the status tag, so an announce and a withdrawal of
    /// the same route compare equal and reconciliation can pair them up.
    fn eq(&self, other: &Self) -> bool {
        self.prefix_len == other.prefix_len
            && self.protocol == other.protocol
            && self.table == other.table
            && self.oif == other.oif
            && self.priority == other.priority
            && self.metric == other.metric
            && self.destination == other.destination
            && self.source == other.source
            && self.gateway == other.gateway
    }
}

impl Eq for Route {}

impl Route {
    /// Parse one netlink message into a route record.
    ///
    /// Returns `None` for any message that is not a route announcement or
    /// withdrawal; there is no route without a status.
    pub fn from_message(header: &NlMsgHdr, data: &[u8]) -> Result<Option<Self>> {
        let status = match header.nlmsg_type {
            rtm::NEWROUTE => RouteStatus::Announced,
            rtm::DELROUTE => RouteStatus::Withdrawn,
            _ => return Ok(None),
        };

        let (body, attrs) = RtMsg::from_bytes(data)?;
        let mut route = Route {
            destination: None,
            source: None,
            gateway: None,
            prefix_len: body.rtm_dst_len,
            priority: 0,
            metric: 0,
            protocol: body.rtm_protocol,
            table: body.rtm_table as u32,
            oif: 0,
            status,
        };

        for (code, data) in AttrIter::new(attrs) {
            match code {
                rta::DST => route.destination = Some(payload::ip(data, body.rtm_family)?),
                rta::GATEWAY => route.gateway = Some(payload::ip(data, body.rtm_family)?),
                // the attribute form wins over the one-byte body field
                rta::TABLE => route.table = payload::u32_ne(data)?,
                rta::PRIORITY => route.priority = payload::u32_ne(data)?,
                rta::OIF => route.oif = payload::u32_ne(data)?,
                rta::METRICS => {
                    if let Some(word) = data.first_chunk::<4>() {
                        route.metric = u32::from_ne_bytes(*word);
                    }
                }
                _ => {}
            }
        }

        Ok(Some(route))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            RouteStatus::Announced => write!(f, "add ")?,
            RouteStatus::Withdrawn => write!(f, "del ")?,
        }
        match self.destination {
            Some(destination) => write!(f, "{}/{}", destination, self.prefix_len)?,
            None => write!(f, "default")?,
        }
        if let Some(gateway) = self.gateway {
            write!(f, " via {gateway}")?;
        }
        if self.oif != 0 {
            write!(f, " dev {}", self.oif)?;
        }
        write!(f, " table {} proto {}", self.table, self.protocol)?;
        if self.priority != 0 {
            write!(f, " prio {}", self.priority)?;
        }
        Ok(())
    }
}
