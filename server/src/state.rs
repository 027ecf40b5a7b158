//! Shared server state: the `World` plus the socket-id <-> player-id
//! session table, both mutated only by the gateway handlers and the tick
//! task under one `RwLock` — mirrors the teacher's `SharedState`/`SharedEngine`
//! pattern (a single `Arc<RwLock<T>>` threaded into every handler).

use std::collections::HashMap;
use std::sync::Arc;

use game_world::{EntityId, World};
use socketioxide::extract::SocketRef;
use socketioxide::socket::Sid;
use tokio::sync::RwLock;

/// Bidirectional socket <-> player-id lookup plus the claimed-name set used
/// for the case-insensitive duplicate-name check in `setPlayerName`. Holds
/// each session's `SocketRef` so the tick task can emit targeted messages
/// (`missionComplete`, `transactionResult`) without a broadcast room.
#[derive(Default)]
pub struct SessionTable {
    by_socket: HashMap<Sid, EntityId>,
    sockets: HashMap<EntityId, SocketRef>,
    names_lower: HashMap<String, EntityId>,
}

impl SessionTable {
    pub fn len(&self) -> usize {
        self.by_socket.len()
    }

    pub fn insert(&mut self, socket: SocketRef, player: EntityId, name: &str) {
        self.by_socket.insert(socket.id, player);
        self.sockets.insert(player, socket);
        self.names_lower.insert(name.to_lowercase(), player);
    }

    pub fn player_for(&self, socket_id: Sid) -> Option<EntityId> {
        self.by_socket.get(&socket_id).copied()
    }

    pub fn socket_for(&self, player: EntityId) -> Option<&SocketRef> {
        self.sockets.get(&player)
    }

    pub fn name_taken(&self, name: &str) -> bool {
        self.names_lower.contains_key(&name.to_lowercase())
    }

    pub fn remove_socket(&mut self, socket_id: Sid) -> Option<EntityId> {
        let player = self.by_socket.remove(&socket_id)?;
        self.sockets.remove(&player);
        self.names_lower.retain(|_, id| *id != player);
        Some(player)
    }
}

pub struct ServerState {
    pub world: World,
    pub sessions: SessionTable,
}

impl ServerState {
    pub fn new(world: World) -> Self {
        Self { world, sessions: SessionTable::default() }
    }
}

pub type SharedState = Arc<RwLock<ServerState>>;
