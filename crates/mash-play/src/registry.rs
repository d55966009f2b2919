//! Roster of joined players and exclusive ownership of inputs.
//!
//! Every concrete input (keyboard key or gamepad index) is owned by at most
//! one player. The registry is the only place bindings change, so the two
//! ownership maps below always mirror the players' `binding` fields.

use std::collections::HashMap;

use log::{debug, info};
use mash_input::{GamepadIndex, InputSource, KeyId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::player::{ControllerBinding, MAX_PLAYERS, Player, PlayerId};

/// One entry of the ordered slot pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatSlot {
    pub name: String,
    /// Key the slot is associated with; also makes the key joinable.
    pub default_key: KeyId,
}

impl SeatSlot {
    pub fn new(name: impl Into<String>, default_key: impl Into<KeyId>) -> Self {
        Self {
            name: name.into(),
            default_key: default_key.into(),
        }
    }

    /// P1 → W, P2 → ArrowUp, P3 → I, P4 → L.
    pub fn default_pool() -> Vec<SeatSlot> {
        vec![
            SeatSlot::new("Player 1", "w"),
            SeatSlot::new("Player 2", "ArrowUp"),
            SeatSlot::new("Player 3", "i"),
            SeatSlot::new("Player 4", "l"),
        ]
    }
}

/// What happens to a player whose gamepad disconnects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisconnectPolicy {
    /// The player becomes unbound until a pad or key claims it again.
    Unbind,
    /// The player falls back to its slot's default key.
    RevertToKeyboard,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinRejected {
    #[error("roster is full ({0} players)")]
    RosterFull(usize),
    #[error("{0} is already bound to {1}")]
    AlreadyBound(InputSource, PlayerId),
    #[error("key {0} is not a join key")]
    NotJoinable(KeyId),
}

#[derive(Debug, Clone)]
pub struct PlayerRegistry {
    slots: Vec<SeatSlot>,
    policy: DisconnectPolicy,
    /// Join order.
    players: Vec<Player>,
    bound_keys: HashMap<KeyId, PlayerId>,
    bound_pads: HashMap<GamepadIndex, PlayerId>,
}

impl PlayerRegistry {
    /// Empty roster over `slots` (at most [`MAX_PLAYERS`] are used).
    pub fn new(mut slots: Vec<SeatSlot>, policy: DisconnectPolicy) -> Self {
        slots.truncate(MAX_PLAYERS);
        Self {
            slots,
            policy,
            players: Vec::new(),
            bound_keys: HashMap::new(),
            bound_pads: HashMap::new(),
        }
    }

    /// Roster with every slot joined on its default key.
    pub fn seeded(slots: Vec<SeatSlot>, policy: DisconnectPolicy) -> Self {
        let mut registry = Self::new(slots, policy);
        let keys: Vec<KeyId> = registry.slots.iter().map(|s| s.default_key.clone()).collect();
        for key in keys {
            if let Err(e) = registry.join(InputSource::Keyboard(key)) {
                debug!("Skipping seed slot: {e}");
            }
        }
        registry
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn players_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.players.iter_mut()
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn player_for_key(&self, key: &KeyId) -> Option<PlayerId> {
        self.bound_keys.get(key).copied()
    }

    pub fn player_for_pad(&self, index: GamepadIndex) -> Option<PlayerId> {
        self.bound_pads.get(&index).copied()
    }

    /// Owner of a concrete input, if any.
    pub fn owner_of(&self, source: &InputSource) -> Option<PlayerId> {
        match source {
            InputSource::Keyboard(key) => self.player_for_key(key),
            InputSource::Gamepad(index) => self.player_for_pad(*index),
        }
    }

    /// Whether `key` belongs to the slot pool and may therefore join.
    pub fn is_join_key(&self, key: &KeyId) -> bool {
        self.slots.iter().any(|s| &s.default_key == key)
    }

    /// Bind `source` to the first unbound player, else add a player on the
    /// next unused slot.
    pub fn join(&mut self, source: InputSource) -> Result<PlayerId, JoinRejected> {
        if let Some(owner) = self.owner_of(&source) {
            return Err(JoinRejected::AlreadyBound(source, owner));
        }
        if let InputSource::Keyboard(key) = &source {
            if !self.is_join_key(key) {
                return Err(JoinRejected::NotJoinable(key.clone()));
            }
        }
        let unbound = self
            .players
            .iter()
            .find(|p| p.binding == ControllerBinding::Unbound)
            .map(|p| p.id);
        if let Some(id) = unbound {
            self.bind(id, source);
            info!("{id} reclaimed on {}", self.describe(id));
            return Ok(id);
        }

        let slot = self
            .next_free_slot()
            .ok_or(JoinRejected::RosterFull(self.capacity()))?;

        let id = PlayerId::new(slot as u8 + 1);
        let name = self.slots[slot].name.clone();
        self.players.push(Player::new(id, name, ControllerBinding::Unbound));
        self.bind(id, source);
        info!("{id} joined on {}", self.describe(id));
        Ok(id)
    }

    /// Gamepad join path: rebind a claimable existing player, else join.
    ///
    /// Under [`DisconnectPolicy::Unbind`] only unbound players are claimable;
    /// under [`DisconnectPolicy::RevertToKeyboard`] any player without a
    /// gamepad is, and its keyboard key is released.
    pub fn claim_gamepad(&mut self, index: GamepadIndex) -> Result<PlayerId, JoinRejected> {
        let source = InputSource::Gamepad(index);
        if let Some(owner) = self.player_for_pad(index) {
            return Err(JoinRejected::AlreadyBound(source, owner));
        }
        let policy = self.policy;
        let claimable = self
            .players
            .iter()
            .find(|p| match policy {
                DisconnectPolicy::Unbind => p.binding == ControllerBinding::Unbound,
                DisconnectPolicy::RevertToKeyboard => !p.binding.is_gamepad(),
            })
            .map(|p| p.id);

        match claimable {
            Some(id) => {
                self.bind(id, source);
                info!("{id} claimed by {index}");
                Ok(id)
            }
            None => self.join(source),
        }
    }

    /// Release a disconnected pad according to the disconnect policy.
    /// Returns the affected player, or `None` if the pad was not bound.
    pub fn unbind_gamepad(&mut self, index: GamepadIndex) -> Option<PlayerId> {
        let id = self.player_for_pad(index)?;
        self.unbind(id);
        if self.policy == DisconnectPolicy::RevertToKeyboard {
            let fallback = self.slots.get(id.index()).map(|s| s.default_key.clone());
            if let Some(key) = fallback {
                if self.player_for_key(&key).is_none() {
                    self.bind(id, InputSource::Keyboard(key));
                }
            }
        }
        info!("{index} disconnected, {id} now on {}", self.describe(id));
        Some(id)
    }

    /// Zero every score; bindings and progress are untouched.
    pub fn reset_scores(&mut self) {
        for player in &mut self.players {
            player.score = 0;
        }
    }

    fn next_free_slot(&self) -> Option<usize> {
        (0..self.capacity()).find(|&slot| {
            let id = PlayerId::new(slot as u8 + 1);
            !self.players.iter().any(|p| p.id == id)
        })
    }

    /// Bind `source` to `id`, releasing whatever `id` held before.
    fn bind(&mut self, id: PlayerId, source: InputSource) {
        self.unbind(id);
        match &source {
            InputSource::Keyboard(key) => {
                self.bound_keys.insert(key.clone(), id);
            }
            InputSource::Gamepad(index) => {
                self.bound_pads.insert(*index, id);
            }
        }
        if let Some(player) = self.player_mut(id) {
            player.binding = source.into();
        }
    }

    fn unbind(&mut self, id: PlayerId) {
        let Some(player) = self.player_mut(id) else {
            return;
        };
        let previous = std::mem::take(&mut player.binding);
        match previous {
            ControllerBinding::Keyboard(key) => {
                self.bound_keys.remove(&key);
            }
            ControllerBinding::Gamepad(index) => {
                self.bound_pads.remove(&index);
            }
            ControllerBinding::Unbound => {}
        }
    }

    fn describe(&self, id: PlayerId) -> String {
        self.player(id)
            .map(|p| p.binding.label())
            .unwrap_or_default()
    }
}
