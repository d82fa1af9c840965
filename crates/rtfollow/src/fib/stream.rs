//! Live route traffic as a stream.

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio_stream::Stream;

use crate::netlink::message::MessageIter;
use crate::netlink::{Connection, Result};

use super::route::Route;

/// Multicast route traffic parsed into [`Route`] records.
///
/// The connection must be subscribed to the route groups. One datagram may
/// carry several route messages; they are queued and yielded one at a time.
/// Datagrams carrying no route message are consumed and skipped.
pub struct RouteUpdates {
    conn: Connection,
    pending: VecDeque<Route>,
}

impl RouteUpdates {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            pending: VecDeque::new(),
        }
    }

    /// Hand the connection back.
    pub fn into_connection(self) -> Connection {
        self.conn
    }

    fn queue_datagram(&mut self, data: &[u8]) -> Result<()> {
        for item in MessageIter::new(data) {
            let (header, payload) = item?;
            if let Some(route) = Route::from_message(header, payload)? {
                self.pending.push_back(route);
            }
        }
        Ok(())
    }
}

impl Stream for RouteUpdates {
    type Item = Result<Route>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if let Some(route) = this.pending.pop_front() {
                return Poll::Ready(Some(Ok(route)));
            }
            match this.conn.poll_recv_event(cx) {
                Poll::Ready(Ok(data)) => {
                    if let Err(e) = this.queue_datagram(&data) {
                        return Poll::Ready(Some(Err(e)));
                    }
                }
                Poll::Ready(Err(e)) => return Poll::Ready(Some(Err(e))),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
