//! Named text outputs shown over the scene
//!
//! Each sink is a named line of text that code overwrites whenever its value
//! changes. The engine writes the frame rate to [`Hud::FPS`]; scripts add
//! their own sinks.

use std::collections::BTreeMap;

/// Heads-up display text sinks
#[derive(Debug, Default, Clone)]
pub struct Hud {
    sinks: BTreeMap<String, String>,
}

impl Hud {
    /// Sink receiving the frame rate counter
    pub const FPS: &'static str = "fps";

    /// Create an empty HUD
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the text of a sink, creating it if needed
    pub fn set_text(&mut self, sink: &str, text: impl Into<String>) {
        let text = text.into();
        match self.sinks.get_mut(sink) {
            Some(existing) => *existing = text,
            None => {
                self.sinks.insert(sink.to_string(), text);
            }
        }
    }

    /// Current text of a sink
    pub fn text(&self, sink: &str) -> Option<&str> {
        self.sinks.get(sink).map(String::as_str)
    }

    /// Remove a sink
    pub fn clear(&mut self, sink: &str) -> Option<String> {
        self.sinks.remove(sink)
    }

    /// All sinks in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.sinks.iter().map(|(name, text)| (name.as_str(), text.as_str()))
    }

    /// Number of sinks
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Check if no sink has been written
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overwrite_sink() {
        let mut hud = Hud::new();
        hud.set_text("guninfo", "Rifle: 30/30");
        hud.set_text("guninfo", "Rifle: 29/30");
        assert_eq!(hud.text("guninfo"), Some("Rifle: 29/30"));
        assert_eq!(hud.len(), 1);
    }

    #[test]
    fn test_iteration_is_sorted() {
        let mut hud = Hud::new();
        hud.set_text("guninfo", "a");
        hud.set_text(Hud::FPS, "60");
        let names: Vec<&str> = hud.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["fps", "guninfo"]);
        assert_eq!(hud.clear("fps"), Some("60".to_string()));
        assert!(hud.text("fps").is_none());
    }
}
