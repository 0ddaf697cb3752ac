//! HTTP routes: the WebSocket upgrade endpoint plus `/health`/`/metrics`
//! parity with the other two services (§5).

use actix::Addr;
use actix_web::{web, HttpRequest, HttpResponse};
use actix_web_actors::ws;

use crate::hub::NotificationHub;
use crate::session::WebSocketSession;

pub async fn ws_connect(
    req: HttpRequest,
    stream: web::Payload,
    hub: web::Data<Addr<NotificationHub>>,
) -> Result<HttpResponse, actix_web::Error> {
    ws::start(WebSocketSession::new(hub.get_ref().clone()), &req, stream)
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().body("OK")
}
