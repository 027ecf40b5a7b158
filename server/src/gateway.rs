//! Session gateway: the only place that talks Socket.IO. Validates names,
//! routes input messages into `World`, and leaves broadcasting the
//! per-tick snapshot to the tick task (`crate::tick`). Mirrors the
//! teacher's `on_connect`/`socket.on(...)` handler shape.

use game_types::{DebugTeleport, InputMessage, MapData, NameRejected, ServerFull, SetPlayerName, SwitchFlagship};
use game_world::EntityId;
use serde_json::json;
use socketioxide::extract::{Data, SocketRef};
use tracing::info;

use crate::state::SharedState;

pub fn register(socket: SocketRef, shared: SharedState) {
    info!(socket = %socket.id, "client connected");

    socket.on_disconnect({
        let shared = shared.clone();
        move |s: SocketRef| async move {
            let mut state = shared.write().await;
            if let Some(player) = state.sessions.remove_socket(s.id) {
                state.world.remove_player(player);
                info!(socket = %s.id, player = %player, "client disconnected");
            }
        }
    });

    socket.on("setPlayerName", {
        let shared = shared.clone();
        move |s: SocketRef, Data::<SetPlayerName>(msg)| {
            let shared = shared.clone();
            async move { on_set_player_name(s, shared, msg).await }
        }
    });

    socket.on("input", {
        let shared = shared.clone();
        move |s: SocketRef, Data::<InputMessage>(msg)| {
            let shared = shared.clone();
            async move {
                let mut state = shared.write().await;
                if let Some(player) = state.sessions.player_for(s.id) {
                    state.world.set_input(player, msg);
                }
            }
        }
    });

    socket.on("enterHarbor", {
        let shared = shared.clone();
        move |s: SocketRef, Data::<serde_json::Value>(_data)| {
            let shared = shared.clone();
            async move { on_enter_harbor(s, shared).await }
        }
    });

    socket.on("closeHarbor", {
        let shared = shared.clone();
        move |s: SocketRef, Data::<serde_json::Value>(_data)| {
            let shared = shared.clone();
            async move {
                let mut state = shared.write().await;
                if let Some(player) = state.sessions.player_for(s.id) {
                    if state.world.close_harbor(player) {
                        let _ = s.emit("harborClosed", &json!({}));
                    }
                }
            }
        }
    });

    socket.on("repairShip", {
        let shared = shared.clone();
        move |s: SocketRef, Data::<serde_json::Value>(_data)| {
            let shared = shared.clone();
            async move {
                let mut state = shared.write().await;
                if let Some(player) = state.sessions.player_for(s.id) {
                    state.world.repair_ship(player);
                }
            }
        }
    });

    socket.on("switchFlagship", {
        let shared = shared.clone();
        move |s: SocketRef, Data::<SwitchFlagship>(msg)| {
            let shared = shared.clone();
            async move {
                let mut state = shared.write().await;
                if let Some(player) = state.sessions.player_for(s.id) {
                    state.world.switch_flagship(player, &msg.ship_class);
                }
            }
        }
    });

    socket.on("debug_teleport", {
        let shared = shared.clone();
        move |s: SocketRef, Data::<DebugTeleport>(msg)| {
            let shared = shared.clone();
            async move {
                let mut state = shared.write().await;
                if let Some(player) = state.sessions.player_for(s.id) {
                    state.world.debug_teleport(player, game_types::Vec2::new(msg.x, msg.y));
                }
            }
        }
    });
}

async fn on_set_player_name(socket: SocketRef, shared: SharedState, msg: SetPlayerName) {
    let mut state = shared.write().await;

    let max_players = state.world.cfg.session.max_players as usize;
    if state.sessions.len() >= max_players {
        let _ = socket.emit(
            "server_full",
            &ServerFull { message: "server is full".into(), max_players: max_players as u32 },
        );
        let _ = socket.disconnect();
        return;
    }

    let name = msg.name.trim().to_string();
    let (min_len, max_len) = (state.world.cfg.session.name_min_len, state.world.cfg.session.name_max_len);
    let reject = if name.len() < min_len || name.len() > max_len {
        Some(format!("name must be {min_len}-{max_len} characters"))
    } else if !name.chars().all(|c| c.is_alphanumeric() || c == ' ') {
        Some("name must be alphanumeric or spaces".to_string())
    } else if state.sessions.name_taken(&name) {
        Some("name already taken".to_string())
    } else {
        None
    };

    if let Some(reason) = reject {
        let _ = socket.emit("nameRejected", &NameRejected { reason });
        let _ = socket.disconnect();
        return;
    }

    let default_ship_class = match state.world.classes.iter().next() {
        Some(c) => c.id.clone(),
        None => {
            let _ = socket.emit("nameRejected", &NameRejected { reason: "no ship classes configured".into() });
            let _ = socket.disconnect();
            return;
        }
    };

    let around = msg.spawn.unwrap_or_else(|| {
        state
            .world
            .harbors
            .iter()
            .next()
            .map(|h| h.pos)
            .unwrap_or_else(|| game_types::Vec2::new(
                state.world.terrain.world_width() / 2.0,
                state.world.terrain.world_height() / 2.0,
            ))
    });
    let spawn_pos = state.world.find_safe_spawn(around).unwrap_or(around);

    let player: EntityId = state.world.add_player(&name, spawn_pos, &default_ship_class);
    state.sessions.insert(socket.clone(), player, &name);

    let map_data: MapData = state.world.map_data();
    let _ = socket.emit("map_data", &map_data);

    info!(player = %player, name = %name, "player joined");
}

async fn on_enter_harbor(socket: SocketRef, shared: SharedState) {
    let mut state = shared.write().await;
    let Some(player) = state.sessions.player_for(socket.id) else { return };
    if !state.world.enter_harbor(player) {
        return;
    }
    let Some(entity) = state.world.get_entity(player) else { return };
    let Some(harbor_id) = entity.harbor.docked_harbor_id else { return };
    if let Some(harbor) = state.world.harbors.get(harbor_id) {
        let info = game_types::HarborInfo {
            id: harbor.id.0,
            x: harbor.pos.x,
            y: harbor.pos.y,
            radius: harbor.radius,
            name: harbor.name.clone(),
            island_id: harbor.island_id,
            exit_direction: Some(harbor.exit_direction),
            rotation: None,
        };
        let _ = socket.emit("harborData", &info);
    }
}
