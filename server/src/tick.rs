//! The fixed-rate tick task: the one logical simulation writer. Sleeps
//! between steps targeting `1000/TICK_RATE` ms; each tick uses the wall
//! `dt` since the previous tick (no catch-up), clamped to a sane upper
//! bound so a stalled process doesn't take one giant simulation step.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use game_world::WorldEvent;
use socketioxide::SocketIo;
use tracing::warn;

use crate::state::SharedState;

/// Hard ceiling on a single tick's `dt`, independent of the configured tick
/// rate — protects the simulation from a pathological step after a stall
/// (GC pause, debugger attach, overloaded host).
const MAX_DT_S: f64 = 0.25;

/// Trailing window, in wall-clock seconds, over which the average tick
/// duration is checked against the configured budget.
const PERF_WINDOW_S: f64 = 10.0;

pub async fn run(shared: SharedState, io: SocketIo) {
    let tick_rate = shared.read().await.world.cfg.session.tick_rate;
    let tick_budget_ms = shared.read().await.world.cfg.session.tick_budget_ms;
    let period = Duration::from_millis((1000 / tick_rate.max(1)) as u64);

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let mut last = Instant::now();
    let mut durations: VecDeque<(Instant, Duration)> = VecDeque::new();

    loop {
        interval.tick().await;

        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f64().min(MAX_DT_S);
        last = now;

        let step_started = Instant::now();
        let (events, snapshot) = {
            let mut state = shared.write().await;
            let events = state.world.tick(dt);
            let snapshot = state.world.snapshot();
            (events, snapshot)
        };
        let step_duration = step_started.elapsed();

        durations.push_back((now, step_duration));
        while durations
            .front()
            .map(|(at, _)| now.duration_since(*at).as_secs_f64() > PERF_WINDOW_S)
            .unwrap_or(false)
        {
            durations.pop_front();
        }
        let avg_ms = if durations.is_empty() {
            0.0
        } else {
            durations.iter().map(|(_, d)| d.as_secs_f64() * 1000.0).sum::<f64>() / durations.len() as f64
        };
        if avg_ms > tick_budget_ms {
            warn!(avg_ms, tick_budget_ms, "tick duration over budget (trailing {PERF_WINDOW_S}s average)");
        }

        let _ = io.emit("gamestate_update", &snapshot);

        for event in events {
            dispatch_event(&shared, &io, event).await;
        }
    }
}

async fn dispatch_event(shared: &SharedState, io: &SocketIo, event: WorldEvent) {
    match event {
        WorldEvent::MissionComplete { player, gold, xp } => {
            let state = shared.read().await;
            if let Some(socket) = state.sessions.socket_for(player) {
                let _ = socket.emit("missionComplete", &game_types::MissionComplete { gold, xp });
            }
        }
        WorldEvent::Reward { player, result } => {
            let state = shared.read().await;
            if let Some(socket) = state.sessions.socket_for(player) {
                let _ = socket.emit("transactionResult", &result);
            }
        }
        WorldEvent::NpcDespawned(_) | WorldEvent::WreckCreated(_) => {
            // Both are fully represented by their absence/presence in the
            // next `gamestate_update` snapshot; no per-event message needed.
            let _ = io;
        }
    }
}
