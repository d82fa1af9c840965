//! Neighbor table entries.
//!
//! Entries are installed in probe state on behalf of the interface itself
//! (NTF_SELF). An add carries the link-layer address, an update leaves it
//! to the kernel to resolve, and a probe installs the broadcast address to
//! force resolution. A flush asks for the removal of stale entries on one
//! interface, or on all of them, in a single request.

use std::net::Ipv4Addr;

use zerocopy::IntoBytes;

use super::builder::MessageBuilder;
use super::connection::Connection;
use super::error::Result;
use super::message::{rtm, NLM_F_ACK, NLM_F_CREATE, NLM_F_REQUEST};
use super::types::neigh::{nda, ntf, nud, NdCacheInfo, NdMsg};
use super::types::route::rtn;
use super::types::AF_INET;

/// Link-layer broadcast address.
pub const LLADDR_BROADCAST: [u8; 6] = [0xff; 6];

fn neigh_request(msg_type: u16, flags: u16, ifindex: u32) -> MessageBuilder {
    let mut builder = MessageBuilder::new(msg_type, flags);
    builder.body(
        &NdMsg::new()
            .with_family(AF_INET)
            .with_ifindex(ifindex as i32)
            .with_state(nud::PROBE)
            .with_flags(ntf::SELF)
            .with_type(rtn::UNICAST),
    );
    builder
}

fn flush_stale(ifindex: u32) -> MessageBuilder {
    let mut builder = MessageBuilder::new(rtm::DELNEIGH, NLM_F_REQUEST | NLM_F_ACK);
    builder.body(
        &NdMsg::new()
            .with_family(AF_INET)
            .with_ifindex(ifindex as i32)
            .with_state(nud::STALE)
            .with_type(rtn::UNICAST),
    );
    builder
}

fn new_neigh(ifindex: u32, destination: Ipv4Addr, lladdr: Option<[u8; 6]>) -> MessageBuilder {
    let mut builder = neigh_request(
        rtm::NEWNEIGH,
        NLM_F_REQUEST | NLM_F_ACK | NLM_F_CREATE,
        ifindex,
    );
    builder.attr(nda::DST, &destination.octets());
    if let Some(lladdr) = lladdr {
        builder.attr(nda::LLADDR, &lladdr);
    }
    builder.attr_u32(nda::PROBES, 0);
    let cache = NdCacheInfo {
        ndm_refcnt: 1,
        ..Default::default()
    };
    builder.attr(nda::CACHEINFO, cache.as_bytes());
    builder
}

impl Connection {
    /// Install a neighbor entry with a known link-layer address.
    pub async fn add_neighbor(
        &self,
        ifindex: u32,
        destination: Ipv4Addr,
        lladdr: [u8; 6],
    ) -> Result<()> {
        self.request_ack(new_neigh(ifindex, destination, Some(lladdr)))
            .await
    }

    /// Refresh an entry without supplying a link-layer address.
    pub async fn update_neighbor(&self, ifindex: u32, destination: Ipv4Addr) -> Result<()> {
        self.request_ack(new_neigh(ifindex, destination, None))
            .await
    }

    /// Force resolution by installing a probe entry with the broadcast
    /// link-layer address.
    pub async fn probe_neighbor(&self, ifindex: u32, destination: Ipv4Addr) -> Result<()> {
        self.request_ack(new_neigh(ifindex, destination, Some(LLADDR_BROADCAST)))
            .await
    }

    /// Remove a neighbor entry.
    pub async fn delete_neighbor(&self, ifindex: u32, destination: Ipv4Addr) -> Result<()> {
        let mut builder = neigh_request(rtm::DELNEIGH, NLM_F_REQUEST | NLM_F_ACK, ifindex);
        builder.attr(nda::DST, &destination.octets());
        self.request_ack(builder).await
    }

    /// Ask the kernel to drop stale entries; an ifindex of 0 addresses
    /// every interface. Kernels that insist on a destination refuse the
    /// request with EINVAL.
    pub async fn flush_stale_neighbors(&self, ifindex: u32) -> Result<()> {
        self.request_ack(flush_stale(ifindex)).await
    }
}
