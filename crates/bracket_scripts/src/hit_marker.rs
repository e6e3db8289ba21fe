//! Short-lived marker left where a shot landed

use std::time::Duration;

use bracket_engine::prelude::*;

const EXPIRED: TimerTag = TimerTag(1);

/// Destroys its entity once its lifetime runs out
#[derive(Debug, Clone, Copy)]
pub struct HitMarker {
    lifetime: Duration,
}

impl HitMarker {
    /// Marker that lives for one second
    pub fn new() -> Self {
        Self::with_lifetime(Duration::from_secs(1))
    }

    /// Marker with a custom lifetime
    pub fn with_lifetime(lifetime: Duration) -> Self {
        Self { lifetime }
    }

    /// How long the marker stays in the world
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }
}

impl Default for HitMarker {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for HitMarker {
    fn kind(&self) -> ComponentKind {
        ComponentKind::HitMarker
    }

    fn start(&mut self, ctx: &mut Context<'_>) -> Result<(), ComponentError> {
        ctx.schedule(self.lifetime, EXPIRED);
        Ok(())
    }

    fn on_timer(&mut self, ctx: &mut Context<'_>, tag: TimerTag) {
        if tag == EXPIRED {
            log::debug!("Hit marker {:?} expired", ctx.entity_id());
            ctx.destroy_self();
        }
    }
}
