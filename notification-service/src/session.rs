//! `WebSocketSession`: per-connection actor for the order-status WebSocket
//! endpoint (§4.4).
//!
//! Grounded on `StreamChatActor`'s full `StreamHandler` match over every
//! `ws::Message` variant (`examples/.../services/streaming/ws.rs`), and on
//! `websocket_server.cpp`'s subscribe-frame protocol: a client subscribes by
//! sending `{"type": "subscribe", "order_id": "..."}` after the connection
//! is already open (there is no `order_id` in the upgrade URL), and any
//! frame that doesn't parse as a subscribe request is silently ignored.

use actix::prelude::*;
use actix_web_actors::ws;
use uuid::Uuid;

use crate::hub::{Connect, Deliver, Disconnect, NotificationHub};
use crate::models::{SubscribeFrame, SubscribedFrame};

pub struct WebSocketSession {
    hub: Addr<NotificationHub>,
    order_id: Option<String>,
    session_id: Uuid,
}

impl WebSocketSession {
    pub fn new(hub: Addr<NotificationHub>) -> Self {
        Self { hub, order_id: None, session_id: Uuid::new_v4() }
    }
}

impl Actor for WebSocketSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        crate::metrics::record_ws_connected();
    }

    fn stopped(&mut self, ctx: &mut Self::Context) {
        if let Some(order_id) = self.order_id.take() {
            self.hub.do_send(Disconnect { order_id, session_id: self.session_id });
        }
        crate::metrics::record_ws_disconnected();
    }
}

impl Handler<Deliver> for WebSocketSession {
    type Result = ();

    fn handle(&mut self, msg: Deliver, ctx: &mut Self::Context) {
        match serde_json::to_string(&msg.0) {
            Ok(text) => ctx.text(text),
            Err(e) => tracing::warn!(error = %e, "failed to serialize order update frame"),
        }
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WebSocketSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Text(text)) => {
                let Ok(frame) = serde_json::from_str::<SubscribeFrame>(&text) else {
                    tracing::debug!("ignoring frame that is not a valid subscribe request");
                    return;
                };

                if frame.frame_type != "subscribe" || frame.order_id.is_empty() {
                    return;
                }

                if let Some(previous) = self.order_id.take() {
                    self.hub.do_send(Disconnect { order_id: previous, session_id: self.session_id });
                }

                self.order_id = Some(frame.order_id.clone());
                self.hub.do_send(Connect {
                    order_id: frame.order_id.clone(),
                    session_id: self.session_id,
                    addr: ctx.address(),
                });

                if let Ok(text) = serde_json::to_string(&SubscribedFrame::new(frame.order_id)) {
                    ctx.text(text);
                }
            }
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Pong(_)) => {}
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) => ctx.stop(),
            Ok(ws::Message::Binary(_)) => {}
            Ok(ws::Message::Nop) => {}
            Err(e) => {
                tracing::error!(error = %e, "websocket protocol error");
                ctx.stop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_frame_roundtrip_shape() {
        let json = r#"{"type": "subscribe", "order_id": "abc-123"}"#;
        let frame: SubscribeFrame = serde_json::from_str(json).unwrap();
        assert_eq!(frame.order_id, "abc-123");

        let ack = SubscribedFrame::new(frame.order_id.clone());
        let ack_json = serde_json::to_string(&ack).unwrap();
        assert!(ack_json.contains("\"subscribed\""));
        assert!(ack_json.contains("abc-123"));
    }
}
