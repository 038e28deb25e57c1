//! Per-level entity containers.
//!
//! Every live entity is counted against an `EntityBudget`. Running out of
//! budget, or failing to grow a container, leaves the level partially built;
//! `spawn` treats that as fatal and aborts the process right after the failed
//! allocation. `try_spawn` exposes the same checks as a `Result` for callers
//! that can recover.

use glam::Vec2;
use thiserror::Error;

use crate::query::TargetProvider;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceExhausted {
    #[error("entity budget of {capacity} exhausted while spawning into '{group}'")]
    Budget { group: &'static str, capacity: usize },
    #[error("allocation failed while growing '{group}'")]
    Allocation { group: &'static str },
}

#[derive(Debug, Clone)]
pub struct EntityBudget {
    capacity: usize,
    live: usize,
}

impl EntityBudget {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, live: 0 }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn live(&self) -> usize {
        self.live
    }

    fn claim(&mut self, group: &'static str) -> Result<(), ResourceExhausted> {
        if self.live >= self.capacity {
            return Err(ResourceExhausted::Budget {
                group,
                capacity: self.capacity,
            });
        }
        self.live += 1;
        Ok(())
    }

    fn release(&mut self, count: usize) {
        self.live = self.live.saturating_sub(count);
    }
}

/// Log and abort. Continuing with a half-built window or level is not allowed.
pub fn fatal_exhaustion(err: &ResourceExhausted) -> ! {
    log::error!("Fatal resource exhaustion: {err}");
    std::process::abort()
}

#[derive(Debug, Clone)]
pub struct EntityGroup<T> {
    name: &'static str,
    items: Vec<T>,
}

impl<T> EntityGroup<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            items: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn try_spawn(&mut self, budget: &mut EntityBudget, item: T) -> Result<usize, ResourceExhausted> {
        self.items
            .try_reserve(1)
            .map_err(|_| ResourceExhausted::Allocation { group: self.name })?;
        budget.claim(self.name)?;
        self.items.push(item);
        Ok(self.items.len() - 1)
    }

    pub fn spawn(&mut self, budget: &mut EntityBudget, item: T) -> usize {
        match self.try_spawn(budget, item) {
            Ok(index) => index,
            Err(err) => fatal_exhaustion(&err),
        }
    }

    /// Destroy every entity in the group and return their budget.
    pub fn clear(&mut self, budget: &mut EntityBudget) {
        budget.release(self.items.len());
        self.items.clear();
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Collectible, mob or particle placed by a gameplay collaborator. The level
/// owns the storage only; behaviour lives with whoever spawned it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldEntity {
    pub kind: u32,
    pub true_position: Vec2,
}

/// The player's stand-in inside the level: where it spawned and where it is now.
/// Movement is applied by the physics collaborator through `Level::player_mut`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerProxy {
    pub true_position: Vec2,
}

impl TargetProvider for PlayerProxy {
    fn target_position(&self) -> Vec2 {
        self.true_position
    }
}

/// All transient per-level containers. Replaced as a unit on every level load;
/// `generation` lets collaborators notice that handles they hold went stale.
#[derive(Debug, Clone)]
pub struct LevelContainers {
    pub generation: u32,
    pub tiles: EntityGroup<crate::window::TileView>,
    pub collectibles: EntityGroup<WorldEntity>,
    pub mobs: EntityGroup<WorldEntity>,
    pub particles: EntityGroup<WorldEntity>,
    pub player: PlayerProxy,
}

impl LevelContainers {
    /// Fresh containers holding only the spawned player.
    pub fn spawn(generation: u32, budget: &mut EntityBudget, player_position: Vec2) -> Self {
        if let Err(err) = budget.claim("player") {
            fatal_exhaustion(&err);
        }
        Self {
            generation,
            tiles: EntityGroup::new("tiles"),
            collectibles: EntityGroup::new("collectibles"),
            mobs: EntityGroup::new("mobs"),
            particles: EntityGroup::new("particles"),
            player: PlayerProxy {
                true_position: player_position,
            },
        }
    }

    /// Destroy everything, the player included, and return the budget.
    pub fn destroy(&mut self, budget: &mut EntityBudget) {
        self.tiles.clear(budget);
        self.collectibles.clear(budget);
        self.mobs.clear(budget);
        self.particles.clear(budget);
        budget.release(1);
    }

    pub fn live_count(&self) -> usize {
        self.tiles.len() + self.collectibles.len() + self.mobs.len() + self.particles.len() + 1
    }
}
