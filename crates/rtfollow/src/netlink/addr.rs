//! Address assignment.

use std::net::Ipv4Addr;

use super::builder::MessageBuilder;
use super::connection::Connection;
use super::error::{Error, Result};
use super::message::{rtm, NLM_F_ACK, NLM_F_REQUEST};
use super::types::addr::{ifa, ifa_flags, IfAddrMsg};
use super::types::AF_INET;

pub(crate) fn address_request(
    ifindex: u32,
    address: Ipv4Addr,
    prefix_len: u8,
) -> Result<MessageBuilder> {
    if ifindex == 0 {
        return Err(Error::IfindexRequired);
    }
    if prefix_len == 0 || prefix_len >= 32 {
        return Err(Error::PrefixLength { prefix_len });
    }

    let body = IfAddrMsg::new()
        .with_family(AF_INET)
        .with_prefixlen(prefix_len)
        .with_flags(ifa_flags::SECONDARY)
        .with_index(ifindex);

    let mut builder = MessageBuilder::new(rtm::NEWADDR, NLM_F_REQUEST | NLM_F_ACK);
    builder.body(&body);
    builder.attr(ifa::LOCAL, &address.octets());
    Ok(builder)
}

impl Connection {
    /// Add a secondary IPv4 address to an interface.
    pub async fn add_address(&self, ifindex: u32, address: Ipv4Addr, prefix_len: u8) -> Result<()> {
        self.request_ack(address_request(ifindex, address, prefix_len)?)
            .await
    }
}
