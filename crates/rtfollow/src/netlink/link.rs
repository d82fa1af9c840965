//! Link operations: name lookup, admin state, VRF devices, master binding.

use super::attr::{payload, AttrIter};
use super::builder::MessageBuilder;
use super::connection::Connection;
use super::error::{Error, Result};
use super::message::{rtm, NLMSG_HDRLEN, NLM_F_ACK, NLM_F_CREATE, NLM_F_EXCL, NLM_F_REQUEST};
use super::types::link::{ifla, ifla_info, ifla_vrf, iff, IfInfoMsg};
use super::types::AF_LOCAL;

/// A VRF device to create. Routes pointed at the device resolve against
/// the bound kernel routing table instead of the main one.
#[derive(Debug, Clone)]
pub struct VrfLink {
    name: String,
    table: u32,
    up: bool,
}

impl VrfLink {
    pub fn new(name: impl Into<String>, table: u32) -> Self {
        Self {
            name: name.into(),
            table,
            up: false,
        }
    }

    /// Bring the device up as part of creation.
    pub fn up(mut self) -> Self {
        self.up = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> u32 {
        self.table
    }

    pub(crate) fn build(&self) -> MessageBuilder {
        let mut builder = MessageBuilder::new(
            rtm::NEWLINK,
            NLM_F_REQUEST | NLM_F_ACK | NLM_F_CREATE | NLM_F_EXCL,
        );

        let mut body = IfInfoMsg::new().with_family(AF_LOCAL);
        body.ifi_flags = iff::NOARP | iff::MASTER;
        if self.up {
            body.ifi_flags |= iff::UP | iff::RUNNING;
        }
        body.ifi_change = !0;
        builder.body(&body);

        builder.attr_str(ifla::IFNAME, &self.name);
        let linkinfo = builder.nest_start(ifla::LINKINFO);
        builder.attr_str(ifla_info::KIND, "vrf");
        let data = builder.nest_start(ifla_info::DATA);
        builder.attr_u32(ifla_vrf::TABLE, self.table);
        builder.nest_end(data);
        builder.nest_end(linkinfo);
        builder
    }
}

fn link_query(name: &str) -> MessageBuilder {
    let mut builder = MessageBuilder::new(rtm::GETLINK, NLM_F_REQUEST);
    builder.body(&IfInfoMsg::new());
    builder.attr_str(ifla::IFNAME, name);
    builder
}

fn named(err: Error, name: &str) -> Error {
    if err.is_not_found() {
        Error::InterfaceNotFound {
            name: name.to_owned(),
        }
    } else {
        err
    }
}

/// Index out of a link reply, but only when the reply really describes the
/// asked-for name; a stray same-sequence reply must not resolve.
fn index_from_reply(name: &str, reply: &[u8]) -> Result<u32> {
    let (body, attrs) = IfInfoMsg::from_bytes(&reply[NLMSG_HDRLEN..])?;
    let reply_name = AttrIter::new(attrs)
        .find(ifla::IFNAME)
        .map(payload::string)
        .transpose()?;
    if reply_name.as_deref() != Some(name) {
        return Err(Error::InterfaceNotFound {
            name: name.to_owned(),
        });
    }
    Ok(body.ifi_index as u32)
}

impl Connection {
    /// Resolve an interface name to its kernel index.
    pub async fn link_index_by_name(&self, name: &str) -> Result<u32> {
        let reply = self
            .request(link_query(name))
            .await
            .map_err(|e| named(e, name))?;
        index_from_reply(name, &reply)
    }

    /// Kernel routing table bound to a VRF device.
    pub async fn vrf_table_by_name(&self, name: &str) -> Result<u32> {
        let reply = self
            .request(link_query(name))
            .await
            .map_err(|e| named(e, name))?;
        let (_, attrs) = IfInfoMsg::from_bytes(&reply[NLMSG_HDRLEN..])?;

        let linkinfo = AttrIter::new(attrs).find(ifla::LINKINFO).ok_or_else(|| {
            Error::InvalidMessage(format!("{name} carries no link info"))
        })?;

        let mut kind = None;
        let mut table = None;
        for (code, data) in AttrIter::new(linkinfo) {
            match code {
                ifla_info::KIND => kind = Some(payload::string(data)?),
                ifla_info::DATA => {
                    for (vrf_code, vrf_data) in AttrIter::new(data) {
                        if vrf_code == ifla_vrf::TABLE {
                            table = Some(payload::u32_ne(vrf_data)?);
                        }
                    }
                }
                _ => {}
            }
        }

        if kind.as_deref() != Some("vrf") {
            return Err(Error::InvalidMessage(format!("{name} is not a vrf device")));
        }
        table.ok_or_else(|| Error::InvalidAttribute("vrf device carries no table id".to_owned()))
    }

    /// Create a VRF device.
    pub async fn create_vrf(&self, vrf: &VrfLink) -> Result<()> {
        self.request_ack(vrf.build()).await
    }

    /// Bring an interface up or down.
    pub async fn set_link_state(&self, ifindex: u32, up: bool) -> Result<()> {
        let mut body = IfInfoMsg::new().with_index(ifindex as i32);
        body.ifi_change = iff::UP | iff::RUNNING;
        if up {
            body.ifi_flags = iff::UP | iff::RUNNING;
        }
        let mut builder = MessageBuilder::new(rtm::NEWLINK, NLM_F_REQUEST | NLM_F_ACK);
        builder.body(&body);
        self.request_ack(builder).await
    }

    /// Delete an interface by index.
    pub async fn delete_link(&self, ifindex: u32) -> Result<()> {
        let mut builder = MessageBuilder::new(rtm::DELLINK, NLM_F_REQUEST | NLM_F_ACK);
        builder.body(&IfInfoMsg::new().with_index(ifindex as i32));
        self.request_ack(builder).await
    }

    /// Enslave an interface to a master device; a master of 0 releases it.
    pub async fn set_link_master(&self, ifindex: u32, master: u32) -> Result<()> {
        let mut builder = MessageBuilder::new(rtm::NEWLINK, NLM_F_REQUEST | NLM_F_ACK);
        builder.body(&IfInfoMsg::new().with_index(ifindex as i32));
        builder.attr_u32(ifla::MASTER, master);
        self.request_ack(builder).await
    }
}
