//! `NotificationHub`: the in-memory subscription registry for the
//! order-id-keyed WebSocket fan-out (§4.4).
//!
//! Grounded on `StreamingHub`'s `Connect`/`Disconnect`/`BroadcastMessage`
//! actor shape (`examples/.../streaming_websocket.rs`), but keyed by an
//! order id string instead of a stream uuid, and dropping `StreamingHub`'s
//! explicit session-id bookkeeping: `Addr::connected()` plays the role the
//! original gateway's `weak_ptr::lock()` sweep plays in
//! `notification_manager.cpp`'s `notify()` — a subscriber that dropped
//! without sending `Disconnect` is pruned the next time its order id is
//! notified, not immediately.

use std::collections::HashMap;

use actix::prelude::*;
use uuid::Uuid;

use crate::models::OrderUpdateFrame;
use crate::session::WebSocketSession;

#[derive(Message)]
#[rtype(result = "()")]
pub struct Connect {
    pub order_id: String,
    pub session_id: Uuid,
    pub addr: Addr<WebSocketSession>,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Disconnect {
    pub order_id: String,
    pub session_id: Uuid,
}

#[derive(Clone, Message)]
#[rtype(result = "()")]
pub struct Notify {
    pub order_id: String,
    pub frame: OrderUpdateFrame,
}

/// Deliver a pre-built frame to a single session.
#[derive(Clone, Message)]
#[rtype(result = "()")]
pub struct Deliver(pub OrderUpdateFrame);

pub struct NotificationHub {
    subscribers: HashMap<String, Vec<(Uuid, Addr<WebSocketSession>)>>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self { subscribers: HashMap::new() }
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}

impl Actor for NotificationHub {
    type Context = Context<Self>;
}

impl Handler<Connect> for NotificationHub {
    type Result = ();

    fn handle(&mut self, msg: Connect, _ctx: &mut Self::Context) {
        self.subscribers
            .entry(msg.order_id)
            .or_default()
            .push((msg.session_id, msg.addr));
    }
}

impl Handler<Disconnect> for NotificationHub {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, _ctx: &mut Self::Context) {
        if let Some(entries) = self.subscribers.get_mut(&msg.order_id) {
            entries.retain(|(id, _)| id != &msg.session_id);
            if entries.is_empty() {
                self.subscribers.remove(&msg.order_id);
            }
        }
    }
}

impl Handler<Notify> for NotificationHub {
    type Result = ();

    fn handle(&mut self, msg: Notify, _ctx: &mut Self::Context) {
        let Some(entries) = self.subscribers.get_mut(&msg.order_id) else {
            return;
        };

        entries.retain(|(_, addr)| {
            if addr.connected() {
                addr.do_send(Deliver(msg.frame.clone()));
                true
            } else {
                false
            }
        });

        if entries.is_empty() {
            self.subscribers.remove(&msg.order_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hub_starts_empty() {
        let hub = NotificationHub::new();
        assert!(hub.subscribers.is_empty());
    }
}
