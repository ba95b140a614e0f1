//! Physical key channel → semantic `Key` dispatch.

use scale_traits::{Key, KeyHandler};
use tracing::trace;

/// Channel number wired to each key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyMap {
    pub tare: u8,
    pub calib: u8,
    pub measure: u8,
    pub power: u8,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            tare: 0,
            calib: 1,
            measure: 2,
            power: 3,
        }
    }
}

impl KeyMap {
    pub fn resolve(&self, channel: u8) -> Option<Key> {
        Key::ALL
            .into_iter()
            .find(|k| self.channel(*k) == channel)
    }

    pub fn channel(&self, key: Key) -> u8 {
        match key {
            Key::Tare => self.tare,
            Key::Calib => self.calib,
            Key::Measure => self.measure,
            Key::Power => self.power,
        }
    }
}

/// Routes raw key interrupts to the registered handler.
#[derive(Debug, Clone, Default)]
pub struct KeyRouter {
    map: KeyMap,
}

impl KeyRouter {
    pub fn new(map: KeyMap) -> Self {
        Self { map }
    }

    pub fn map(&self) -> &KeyMap {
        &self.map
    }

    /// Deliver a press on `channel`. Unmapped channels still count as
    /// activity but carry no key.
    pub fn dispatch<H: KeyHandler + ?Sized>(&self, channel: u8, handler: &mut H) {
        match self.map.resolve(channel) {
            Some(key) => {
                trace!(channel, key = key.name(), "key press");
                handler.on_key(key);
            }
            None => {
                trace!(channel, "unmapped key channel ignored");
                handler.on_activity();
            }
        }
    }
}
