//! Engine-owned timers
//!
//! Components never block or sleep. They ask for a callback after a delay and
//! receive it through [`Component::on_timer`](crate::ecs::Component::on_timer)
//! with the tag they scheduled. A timer belongs to the component that
//! scheduled it and dies with it.

use std::time::Duration;

use slotmap::SlotMap;

use crate::ecs::{ComponentId, Context, EntityId};

slotmap::new_key_type! {
    /// Handle to a scheduled timer
    pub struct TimerId;
}

/// Component-chosen label delivered back when a timer fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerTag(pub u32);

/// A scheduled callback
#[derive(Debug, Clone, Copy)]
pub struct TimerEntry {
    /// Entity owning the component
    pub entity: EntityId,
    /// Component that receives the callback
    pub owner: ComponentId,
    /// Label passed to the callback
    pub tag: TimerTag,
    /// Engine time at which the timer fires
    pub due: Duration,
    sequence: u64,
}

/// Pending timers keyed by [`TimerId`]
#[derive(Debug, Default)]
pub struct TimerTable {
    timers: SlotMap<TimerId, TimerEntry>,
    next_sequence: u64,
}

impl TimerTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a callback for `owner` at engine time `due`
    pub fn schedule(&mut self, entity: EntityId, owner: ComponentId, due: Duration, tag: TimerTag) -> TimerId {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.timers.insert(TimerEntry {
            entity,
            owner,
            tag,
            due,
            sequence,
        })
    }

    /// Cancel a timer; `false` if it already fired or was cancelled
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.timers.remove(id).is_some()
    }

    /// Cancel a timer only if `owner` scheduled it
    pub fn cancel_owned(&mut self, id: TimerId, owner: ComponentId) -> bool {
        match self.timers.get(id) {
            Some(entry) if entry.owner == owner => self.cancel(id),
            _ => false,
        }
    }

    /// Look at a pending timer
    pub fn get(&self, id: TimerId) -> Option<&TimerEntry> {
        self.timers.get(id)
    }

    /// Remove a timer and return it, used when firing
    pub fn take(&mut self, id: TimerId) -> Option<TimerEntry> {
        self.timers.remove(id)
    }

    /// Timers due at `now`, in firing order
    ///
    /// Ties on the due time fire in scheduling order.
    pub fn due(&self, now: Duration) -> Vec<TimerId> {
        let mut due: Vec<(Duration, u64, TimerId)> = self
            .timers
            .iter()
            .filter(|(_, entry)| entry.due <= now)
            .map(|(id, entry)| (entry.due, entry.sequence, id))
            .collect();
        due.sort_by_key(|&(at, sequence, _)| (at, sequence));
        due.into_iter().map(|(_, _, id)| id).collect()
    }

    /// Earliest pending due time
    pub fn next_due(&self) -> Option<Duration> {
        self.timers.values().map(|entry| entry.due).min()
    }

    /// Drop every timer of an entity; returns how many were dropped
    pub fn purge_entity(&mut self, entity: EntityId) -> usize {
        let before = self.timers.len();
        self.timers.retain(|_, entry| entry.entity != entity);
        before - self.timers.len()
    }

    /// Drop every timer of a component; returns how many were dropped
    pub fn purge_component(&mut self, owner: ComponentId) -> usize {
        let before = self.timers.len();
        self.timers.retain(|_, entry| entry.owner != owner);
        before - self.timers.len()
    }

    /// Number of timers owned by a component
    pub fn pending_for(&self, owner: ComponentId) -> usize {
        self.timers.values().filter(|entry| entry.owner == owner).count()
    }

    /// Number of pending timers
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    /// Whether no timers are pending
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

/// Re-arming cooldown built on engine timers
///
/// ```ignore
/// if self.fire_cooldown.trigger(ctx) {
///     self.fire(ctx);
/// }
/// // in on_timer:
/// self.fire_cooldown.handle_timer(tag);
/// ```
#[derive(Debug, Clone)]
pub struct Cooldown {
    duration: Duration,
    tag: TimerTag,
    timer: Option<TimerId>,
}

impl Cooldown {
    /// Create a ready cooldown
    pub fn new(duration: Duration, tag: TimerTag) -> Self {
        Self {
            duration,
            tag,
            timer: None,
        }
    }

    /// Whether the cooldown can be triggered
    pub fn is_ready(&self) -> bool {
        self.timer.is_none()
    }

    /// Cooldown length
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Change the length used by later triggers
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    /// Tag delivered when the cooldown ends
    pub fn tag(&self) -> TimerTag {
        self.tag
    }

    /// Start the cooldown; `false` if it is still running
    pub fn trigger(&mut self, ctx: &mut Context<'_>) -> bool {
        if self.timer.is_some() {
            return false;
        }
        self.timer = Some(ctx.schedule(self.duration, self.tag));
        true
    }

    /// Feed a fired tag; `true` if it ended this cooldown
    pub fn handle_timer(&mut self, tag: TimerTag) -> bool {
        if tag == self.tag && self.timer.is_some() {
            self.timer = None;
            true
        } else {
            false
        }
    }

    /// Stop a running cooldown
    pub fn cancel(&mut self, ctx: &mut Context<'_>) {
        if let Some(id) = self.timer.take() {
            ctx.cancel_timer(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> (EntityId, ComponentId, ComponentId) {
        let mut entities = SlotMap::<EntityId, ()>::with_key();
        let mut components = SlotMap::<ComponentId, ()>::with_key();
        (entities.insert(()), components.insert(()), components.insert(()))
    }

    #[test]
    fn test_due_orders_by_time_then_schedule_order() {
        let (entity, a, b) = keys();
        let mut table = TimerTable::new();
        let late = table.schedule(entity, a, Duration::from_millis(30), TimerTag(1));
        let first = table.schedule(entity, a, Duration::from_millis(10), TimerTag(2));
        let second = table.schedule(entity, b, Duration::from_millis(10), TimerTag(3));

        assert_eq!(table.due(Duration::from_millis(5)), Vec::new());
        assert_eq!(table.due(Duration::from_millis(10)), vec![first, second]);
        assert_eq!(table.due(Duration::from_secs(1)), vec![first, second, late]);
        assert_eq!(table.next_due(), Some(Duration::from_millis(10)));
    }

    #[test]
    fn test_cancel_owned_checks_owner() {
        let (entity, a, b) = keys();
        let mut table = TimerTable::new();
        let id = table.schedule(entity, a, Duration::ZERO, TimerTag(0));

        assert!(!table.cancel_owned(id, b));
        assert!(table.cancel_owned(id, a));
        assert!(!table.cancel(id));
    }

    #[test]
    fn test_purge_by_component_and_entity() {
        let (entity, a, b) = keys();
        let mut table = TimerTable::new();
        table.schedule(entity, a, Duration::ZERO, TimerTag(0));
        table.schedule(entity, a, Duration::ZERO, TimerTag(1));
        table.schedule(entity, b, Duration::ZERO, TimerTag(2));

        assert_eq!(table.pending_for(a), 2);
        assert_eq!(table.purge_component(a), 2);
        assert_eq!(table.len(), 1);
        assert_eq!(table.purge_entity(entity), 1);
        assert!(table.is_empty());
    }

    #[test]
    fn test_cooldown_tag_matching() {
        let mut cooldown = Cooldown::new(Duration::from_millis(100), TimerTag(7));
        assert!(cooldown.is_ready());
        // Not running: nothing to end
        assert!(!cooldown.handle_timer(TimerTag(7)));
    }
}
