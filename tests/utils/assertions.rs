//! Test assertion helpers - fluent API for verifying test expectations
#![allow(dead_code)] // Test utilities may not all be used in every test

use serde_json::Value;

use boardroom::websockets::{MessageType, WebSocketMessage};

use super::setup::TestSetup;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct MessageAssertion<'a> {
    setup: &'a TestSetup,
    players: Vec<&'a str>,
}

impl<'a> MessageAssertion<'a> {
    /// Create an assertion for all players in the setup
    pub fn for_all_players(setup: &'a TestSetup) -> Self {
        let players = setup.players.iter().map(|s| s.as_str()).collect();
        Self { setup, players }
    }

    /// Create an assertion for specific players
    pub fn for_players(setup: &'a TestSetup, players: Vec<&'a str>) -> Self {
        Self { setup, players }
    }

    /// Assert that players received a specific message type (consumes the message from queue)
    ///
    /// Room broadcasts are identical for every receiver, so payloads are compared too.
    pub async fn received_message_type(self, expected_type: MessageType) -> MessageContent {
        let mut messages = vec![];

        for player in &self.players {
            let message = self.setup.client(player).consume_message().await;
            assert!(
                message.is_some(),
                "{} should have received a message",
                player
            );

            let msg: WebSocketMessage = serde_json::from_str(&message.unwrap()).unwrap();
            assert_eq!(
                msg.message_type, expected_type,
                "{} received wrong message type",
                player
            );
            messages.push(msg);
        }

        for (i, msg) in messages.iter().enumerate().skip(1) {
            assert_eq!(
                msg.payload, messages[0].payload,
                "Player {} payload differs from player {}",
                self.players[i], self.players[0]
            );
        }

        MessageContent {
            payload: messages[0].payload.clone(),
        }
    }

    /// Assert that players have nothing queued
    pub async fn received_no_messages(self) {
        for player in &self.players {
            let messages = self.setup.client(player).drain_messages().await;
            assert!(
                messages.is_empty(),
                "{} should not have received any messages, got {:?}",
                player,
                messages
            );
        }
    }

    /// Assert that players received a sequence of message types in order (consumes them)
    pub async fn received_message_sequence(
        self,
        expected_types: Vec<MessageType>,
    ) -> Vec<MessageContent> {
        let mut result_messages = vec![];

        for player in &self.players {
            let player_messages = self.setup.client(player).drain_messages().await;
            assert_eq!(
                player_messages.len(),
                expected_types.len(),
                "{} should have received {} messages, got {:?}",
                player,
                expected_types.len(),
                player_messages
            );

            for (i, expected_type) in expected_types.iter().enumerate() {
                let msg: WebSocketMessage = serde_json::from_str(&player_messages[i])
                    .unwrap_or_else(|e| {
                        panic!("Failed to parse message {} for {}: {}", i, player, e)
                    });

                assert_eq!(
                    msg.message_type, *expected_type,
                    "{} message {} has wrong type: expected {:?}, got {:?}",
                    player, i, expected_type, msg.message_type
                );

                // Only collect messages from the first player to avoid duplicates
                if player == &self.players[0] {
                    result_messages.push(MessageContent {
                        payload: msg.payload,
                    });
                }
            }
        }

        result_messages
    }
}

// ============================================================================
// Message Content Assertions
// ============================================================================

pub struct MessageContent {
    payload: Value,
}

impl MessageContent {
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Assert the message names the current turn holder
    pub fn with_current_player(self, expected_player: &str) -> Self {
        assert_eq!(self.payload["currentPlayerId"], expected_player);
        self
    }

    /// Assert the message names the previous turn holder
    pub fn with_previous_player(self, expected_player: &str) -> Self {
        assert_eq!(self.payload["previousPlayerId"], expected_player);
        self
    }

    /// Assert a readiness change for a specific player
    pub fn with_readiness(self, expected_player: &str, expected_ready: bool) -> Self {
        assert_eq!(self.payload["userId"], expected_player);
        assert_eq!(self.payload["isReady"], expected_ready);
        self
    }

    /// Assert a join notification for a specific player and join order
    pub fn with_joined_player(self, expected_player: &str, expected_order: i64) -> Self {
        assert_eq!(self.payload["player"]["userId"], expected_player);
        assert_eq!(self.payload["player"]["order"], expected_order);
        self
    }

    /// Assert the private error text
    pub fn with_error(self, expected_message: &str) -> Self {
        assert_eq!(self.payload["message"], expected_message);
        self
    }
}

// ============================================================================
// Directory Assertions
// ============================================================================

pub struct DirectoryAssertion<'a> {
    setup: &'a TestSetup,
}

impl<'a> DirectoryAssertion<'a> {
    pub fn for_viewer(setup: &'a TestSetup) -> Self {
        Self { setup }
    }

    /// Assert the viewer got exactly `count` snapshots; returns the newest listing
    pub async fn received_snapshots(self, count: usize) -> Vec<Value> {
        let frames = self.setup.viewer.drain_messages().await;
        assert_eq!(
            frames.len(),
            count,
            "viewer should have received {} snapshots, got {:?}",
            count,
            frames
        );

        let mut listing = vec![];
        for frame in frames {
            let msg: WebSocketMessage = serde_json::from_str(&frame).unwrap();
            assert_eq!(msg.message_type, MessageType::GamesUpdate);
            listing = msg.payload.as_array().cloned().unwrap_or_default();
        }
        listing
    }
}
