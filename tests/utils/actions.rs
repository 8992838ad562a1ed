#![allow(dead_code)] // Test utilities may not all be used in every test

use boardroom::websockets::{MessageHandler, WebSocketMessage};

use super::setup::TestSetup;

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    /// Send a raw text frame as if it arrived on the player's socket
    pub async fn send_raw(&self, player: &str, text: &str) {
        let client = self.client(player);
        self.dispatcher
            .handle_message(&client.connection, text)
            .await;
    }

    /// Send a WebSocket message on the player's connection
    pub async fn send_message(&self, player: &str, message: WebSocketMessage) {
        let message_json = message.to_json().unwrap();
        self.send_raw(player, &message_json).await;
    }

    /// Clear every recorded message, players and directory viewer alike
    pub async fn clear_messages(&self) {
        for client in self.clients.values() {
            client.drain_messages().await;
        }
        self.viewer.drain_messages().await;
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    pub async fn send_ready(&self, player: &str) {
        self.send_message(player, WebSocketMessage::ready(true)).await;
    }

    pub async fn send_not_ready(&self, player: &str) {
        self.send_message(player, WebSocketMessage::ready(false))
            .await;
    }

    pub async fn send_end_turn(&self, player: &str) {
        self.send_message(player, WebSocketMessage::end_turn()).await;
    }

    /// Ready every player in join order, then forget the resulting traffic
    pub async fn start_game(&self) {
        for player in &self.players {
            self.send_ready(player).await;
        }
        self.clear_messages().await;
    }
}
