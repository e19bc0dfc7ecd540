//! WebSocket upgrade handler for live auction subscriptions.
//!
//! The thin transport seam in front of the auction core:
//! 1. Parse and validate the auction id
//! 2. Authenticate the caller (bearer token)
//! 3. Confirm the auction exists in the catalog
//! 4. Upgrade to WebSocket and hand the connection to the lobby
//!
//! Every failure is surfaced before the upgrade; the core never sees an
//! unauthenticated or unvalidated connection.

use std::sync::Arc;

use axum::{
    extract::{ws::WebSocketUpgrade, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use crate::adapters::websocket::lobby::AuctionLobby;
use crate::domain::foundation::AuctionId;
use crate::ports::{Identity, IdentityError, ProductCatalog};

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct WebSocketState {
    pub lobby: Arc<AuctionLobby>,
    pub catalog: Arc<dyn ProductCatalog>,
    pub identity: Arc<dyn Identity>,
}

impl WebSocketState {
    pub fn new(
        lobby: Arc<AuctionLobby>,
        catalog: Arc<dyn ProductCatalog>,
        identity: Arc<dyn Identity>,
    ) -> Self {
        Self { lobby, catalog, identity }
    }
}

/// Handle WebSocket upgrade requests for an auction room.
///
/// Route: `GET /auctions/:auction_id/ws`
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(auction_id): Path<String>,
    State(state): State<WebSocketState>,
    headers: HeaderMap,
) -> Response {
    let auction_id: AuctionId = match auction_id.parse() {
        Ok(id) => id,
        Err(_) => {
            return (StatusCode::BAD_REQUEST, "invalid auction id - must be a valid uuid")
                .into_response();
        }
    };

    let Some(token) = bearer_token(&headers) else {
        return (StatusCode::UNAUTHORIZED, "missing bearer token").into_response();
    };
    let user_id = match state.identity.authenticate(token).await {
        Ok(user_id) => user_id,
        Err(IdentityError::Unauthenticated) => {
            return (StatusCode::UNAUTHORIZED, "unauthenticated").into_response();
        }
        Err(err) => {
            tracing::error!(error = %err, "identity provider failure");
            return (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response();
        }
    };

    let auction = match state.catalog.find_auction(auction_id).await {
        Ok(Some(auction)) => auction,
        Ok(None) => return (StatusCode::NOT_FOUND, "auction not found").into_response(),
        Err(err) => {
            tracing::error!(error = %err, "product catalog failure");
            return (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response();
        }
    };

    let max_frame = state.lobby.config().max_frame_bytes;
    ws.max_message_size(max_frame).on_upgrade(move |socket| async move {
        if let Err(err) = state.lobby.subscribe(auction, user_id, socket).await {
            tracing::debug!(%auction_id, %user_id, error = %err, "subscription refused");
        }
    })
}

/// Extract the token from an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Create the axum router for the auction WebSocket endpoint.
pub fn websocket_router() -> axum::Router<WebSocketState> {
    use axum::routing::get;

    axum::Router::new().route("/auctions/:auction_id/ws", get(ws_handler))
}
