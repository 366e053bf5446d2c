//! Demo game logic for the runtime.
//!
//! A `Player` wanders an unbounded 2D plane: it idles for a fixed time, picks
//! a random direction, walks for a random duration, and idles again. The two
//! states exercise the runtime end to end — owner access, auxiliary data,
//! timed transitions, and manager-driven ticking.

use std::cell::RefCell;
use std::f32::consts::TAU;
use std::rc::Rc;

use log::{info, warn};

use crate::error::FsmError;
use crate::fsm::machine::Fsm;
use crate::fsm::manager::FsmManager;
use crate::fsm::state::{FsmState, StateKey};
use crate::fsm::variable::Var;

/// Name of the demo player machine in the manager.
pub const PLAYER_FSM_NAME: &str = "main";

/// Data key counting completed walks.
pub const TRIPS_DATA: &str = "trips";

/// The wandering entity the demo machine is bound to.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub x: f32,
    pub y: f32,
}

impl Player {
    pub fn new() -> Self {
        Player { x: 0.0, y: 0.0 }
    }
}

/// State keys of the player machine.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PlayerStateKey {
    Idle,
    Moving,
}

impl StateKey for PlayerStateKey {
    fn name(&self) -> &'static str {
        match self {
            PlayerStateKey::Idle => "Idle",
            PlayerStateKey::Moving => "Moving",
        }
    }
}

/// Stands still, then requests a walk.
pub struct IdleState {
    /// Seconds to stand still before moving again.
    pub wait: f32,
}

impl FsmState<Player, PlayerStateKey> for IdleState {
    fn key(&self) -> PlayerStateKey {
        PlayerStateKey::Idle
    }

    fn on_init(&mut self, fsm: &mut Fsm<Player, PlayerStateKey>) {
        if let Err(e) = fsm.set_data(TRIPS_DATA, Var::new(0u32)) {
            warn!("could not seed '{}' data: {}", TRIPS_DATA, e);
        }
    }

    fn on_enter(&mut self, fsm: &mut Fsm<Player, PlayerStateKey>) {
        let trips = fsm
            .data::<Var<u32>>(TRIPS_DATA)
            .ok()
            .flatten()
            .map(|v| *v.get())
            .unwrap_or(0);
        info!("player idling (trips so far: {})", trips);
    }

    fn on_update(&mut self, fsm: &mut Fsm<Player, PlayerStateKey>, _elapsed: f32, _real: f32) {
        if fsm.current_state_time() >= self.wait {
            if let Err(e) = fsm.change_state(PlayerStateKey::Moving) {
                warn!("idle -> moving failed: {}", e);
            }
        }
    }
}

/// Walks in a random direction for a random duration.
pub struct MovingState {
    /// Units per second.
    pub speed: f32,
    dir: (f32, f32),
    duration: f32,
}

impl MovingState {
    pub fn new(speed: f32) -> Self {
        MovingState {
            speed,
            dir: (0.0, 0.0),
            duration: 0.0,
        }
    }
}

impl FsmState<Player, PlayerStateKey> for MovingState {
    fn key(&self) -> PlayerStateKey {
        PlayerStateKey::Moving
    }

    fn on_enter(&mut self, fsm: &mut Fsm<Player, PlayerStateKey>) {
        let angle = fastrand::f32() * TAU;
        self.dir = (angle.cos(), angle.sin());
        self.duration = 0.5 + fastrand::f32() * 1.5;
        if let Some(owner) = fsm.owner() {
            let p = owner.borrow();
            info!(
                "player walking for {:.2}s from ({:.1}, {:.1})",
                self.duration, p.x, p.y
            );
        }
    }

    fn on_update(&mut self, fsm: &mut Fsm<Player, PlayerStateKey>, elapsed: f32, _real: f32) {
        if let Some(owner) = fsm.owner() {
            let mut p = owner.borrow_mut();
            p.x += self.dir.0 * self.speed * elapsed;
            p.y += self.dir.1 * self.speed * elapsed;
        }
        if fsm.current_state_time() >= self.duration {
            if let Err(e) = fsm.change_state(PlayerStateKey::Idle) {
                warn!("moving -> idle failed: {}", e);
            }
        }
    }

    fn on_leave(&mut self, fsm: &mut Fsm<Player, PlayerStateKey>, is_shutdown: bool) {
        if is_shutdown {
            return;
        }
        if let Ok(Some(trips)) = fsm.data_mut::<Var<u32>>(TRIPS_DATA) {
            let done = *trips.get() + 1;
            trips.set(done);
        }
    }
}

/// Build the demo player machine and register it with the manager.
pub fn create_player_fsm(
    manager: &mut FsmManager,
    player: &Rc<RefCell<Player>>,
) -> Result<Rc<RefCell<Fsm<Player, PlayerStateKey>>>, FsmError> {
    let states: Vec<Box<dyn FsmState<Player, PlayerStateKey>>> = vec![
        Box::new(IdleState { wait: 1.0 }),
        Box::new(MovingState::new(32.0)),
    ];
    manager.create_fsm(PLAYER_FSM_NAME, player, states)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-6;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn player() -> Rc<RefCell<Player>> {
        Rc::new(RefCell::new(Player::new()))
    }

    #[test]
    fn test_idle_waits_then_walks() {
        let mut manager = FsmManager::new();
        let player = player();
        let fsm = create_player_fsm(&mut manager, &player).unwrap();
        fsm.borrow_mut().start(PlayerStateKey::Idle).unwrap();

        let mut fsm = fsm.borrow_mut();
        fsm.update(0.5, 0.5);
        assert_eq!(fsm.current_state(), Some(PlayerStateKey::Idle));

        fsm.update(0.5, 0.5);
        assert_eq!(fsm.current_state(), Some(PlayerStateKey::Moving));
        assert!(approx_eq(fsm.current_state_time(), 0.0));
    }

    #[test]
    fn test_walk_moves_player_and_returns_to_idle() {
        let mut manager = FsmManager::new();
        let player = player();
        let fsm = create_player_fsm(&mut manager, &player).unwrap();
        fsm.borrow_mut().start(PlayerStateKey::Moving).unwrap();

        let mut fsm = fsm.borrow_mut();
        // Longest possible walk is 2.0s; tick until the walk finishes.
        for _ in 0..25 {
            if fsm.current_state() == Some(PlayerStateKey::Idle) {
                break;
            }
            fsm.update(0.1, 0.1);
        }

        assert_eq!(fsm.current_state(), Some(PlayerStateKey::Idle));
        let p = player.borrow();
        let travelled = (p.x * p.x + p.y * p.y).sqrt();
        assert!(travelled > 0.0);
    }

    #[test]
    fn test_trips_counter_increments_per_walk() {
        let mut manager = FsmManager::new();
        let player = player();
        let fsm = create_player_fsm(&mut manager, &player).unwrap();
        fsm.borrow_mut().start(PlayerStateKey::Moving).unwrap();

        let mut fsm = fsm.borrow_mut();
        for _ in 0..25 {
            if fsm.current_state() == Some(PlayerStateKey::Idle) {
                break;
            }
            fsm.update(0.1, 0.1);
        }
        assert_eq!(fsm.current_state(), Some(PlayerStateKey::Idle));

        let trips = *fsm.data::<Var<u32>>(TRIPS_DATA).unwrap().unwrap().get();
        assert_eq!(trips, 1);
    }
}
