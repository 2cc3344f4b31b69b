use crossbeam_channel::Receiver;
use crossbeam_channel::Sender;
use serde::Deserialize;
use serde::Serialize;
use std::sync::OnceLock;
use strum::EnumString;

// CGEventFlags device-independent modifier bits
const FLAG_MASK_SHIFT: u64 = 0x0002_0000;
const FLAG_MASK_CONTROL: u64 = 0x0004_0000;
const FLAG_MASK_ALTERNATE: u64 = 0x0008_0000;
const FLAG_MASK_COMMAND: u64 = 0x0010_0000;

#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    strum::Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub enum ModifierKey {
    /// ⌥
    #[default]
    Option,
    /// ⌘
    Command,
    /// ⌃
    Control,
    /// ⇧
    Shift,
}

impl ModifierKey {
    pub const fn flag_mask(self) -> u64 {
        match self {
            ModifierKey::Option => FLAG_MASK_ALTERNATE,
            ModifierKey::Command => FLAG_MASK_COMMAND,
            ModifierKey::Control => FLAG_MASK_CONTROL,
            ModifierKey::Shift => FLAG_MASK_SHIFT,
        }
    }

    pub const fn is_held(self, flags: u64) -> bool {
        flags & self.flag_mask() != 0
    }
}

// CGEventType values seen by a modifier event tap
const EVENT_FLAGS_CHANGED: u32 = 12;
const EVENT_TAP_DISABLED_BY_TIMEOUT: u32 = 0xFFFF_FFFE;
const EVENT_TAP_DISABLED_BY_USER_INPUT: u32 = 0xFFFF_FFFF;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TapEvent {
    FlagsChanged,
    /// The system switched the tap off and it has to be enabled again
    Disabled,
    Other,
}

impl From<u32> for TapEvent {
    fn from(value: u32) -> Self {
        match value {
            EVENT_FLAGS_CHANGED => TapEvent::FlagsChanged,
            EVENT_TAP_DISABLED_BY_TIMEOUT | EVENT_TAP_DISABLED_BY_USER_INPUT => TapEvent::Disabled,
            _ => TapEvent::Other,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::Display)]
pub enum ModifierTransition {
    Pressed,
    Released,
}

/// Turns a stream of modifier flag snapshots into press and release edges
#[derive(Debug, Default)]
pub struct ModifierTracker {
    key: ModifierKey,
    held: bool,
}

impl ModifierTracker {
    pub fn new(key: ModifierKey) -> Self {
        Self { key, held: false }
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Forgets the held state, releasing the key if it was held, for when
    /// flag changes may have been missed
    pub fn reset(&mut self) -> Option<ModifierTransition> {
        std::mem::take(&mut self.held).then_some(ModifierTransition::Released)
    }

    pub fn observe(&mut self, flags: u64) -> Option<ModifierTransition> {
        let held = self.key.is_held(flags);
        if held == self.held {
            return None;
        }

        self.held = held;
        Some(if held {
            ModifierTransition::Pressed
        } else {
            ModifierTransition::Released
        })
    }
}

static CHANNEL: OnceLock<(Sender<ModifierTransition>, Receiver<ModifierTransition>)> =
    OnceLock::new();

fn channel() -> &'static (Sender<ModifierTransition>, Receiver<ModifierTransition>) {
    CHANNEL.get_or_init(|| crossbeam_channel::bounded(20))
}

fn event_tx() -> Sender<ModifierTransition> {
    channel().0.clone()
}

pub fn event_rx() -> Receiver<ModifierTransition> {
    channel().1.clone()
}

pub fn send_transition(transition: ModifierTransition) {
    if event_tx().try_send(transition).is_err() {
        tracing::warn!("channel is full; dropping modifier transition")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_masks() {
        assert!(ModifierKey::Option.is_held(0x0008_0120));
        assert!(!ModifierKey::Command.is_held(0x0008_0120));
        assert!(ModifierKey::Command.is_held(FLAG_MASK_COMMAND | FLAG_MASK_SHIFT));
        assert!(ModifierKey::Shift.is_held(FLAG_MASK_COMMAND | FLAG_MASK_SHIFT));
        assert!(!ModifierKey::Control.is_held(0));
    }

    #[test]
    fn test_tracker_only_reports_edges() {
        let mut tracker = ModifierTracker::new(ModifierKey::Option);

        assert_eq!(tracker.observe(0), None);
        assert_eq!(
            tracker.observe(FLAG_MASK_ALTERNATE),
            Some(ModifierTransition::Pressed)
        );
        assert!(tracker.is_held());

        // pressing another modifier while option is held is not an edge
        assert_eq!(tracker.observe(FLAG_MASK_ALTERNATE | FLAG_MASK_SHIFT), None);
        assert_eq!(
            tracker.observe(FLAG_MASK_SHIFT),
            Some(ModifierTransition::Released)
        );
        assert_eq!(tracker.observe(0), None);
        assert!(!tracker.is_held());
    }

    #[test]
    fn test_tracker_ignores_other_modifiers() {
        let mut tracker = ModifierTracker::new(ModifierKey::Control);

        assert_eq!(tracker.observe(FLAG_MASK_ALTERNATE), None);
        assert_eq!(tracker.observe(FLAG_MASK_COMMAND), None);
        assert_eq!(
            tracker.observe(FLAG_MASK_CONTROL),
            Some(ModifierTransition::Pressed)
        );
    }

    #[test]
    fn test_tap_events() {
        assert_eq!(TapEvent::from(12), TapEvent::FlagsChanged);
        assert_eq!(TapEvent::from(0xFFFF_FFFE), TapEvent::Disabled);
        assert_eq!(TapEvent::from(0xFFFF_FFFF), TapEvent::Disabled);
        assert_eq!(TapEvent::from(10), TapEvent::Other);
    }

    #[test]
    fn test_reset_releases_a_held_key() {
        let mut tracker = ModifierTracker::new(ModifierKey::Option);
        assert_eq!(tracker.reset(), None);

        tracker.observe(FLAG_MASK_ALTERNATE);
        assert_eq!(tracker.reset(), Some(ModifierTransition::Released));
        assert!(!tracker.is_held());

        // the key is still down once the tap is back
        assert_eq!(
            tracker.observe(FLAG_MASK_ALTERNATE),
            Some(ModifierTransition::Pressed)
        );
    }

    #[test]
    fn test_transitions_are_delivered_in_order() {
        let rx = event_rx();
        while rx.try_recv().is_ok() {}

        send_transition(ModifierTransition::Pressed);
        send_transition(ModifierTransition::Released);

        assert_eq!(rx.try_recv(), Ok(ModifierTransition::Pressed));
        assert_eq!(rx.try_recv(), Ok(ModifierTransition::Released));
    }

    #[test]
    fn test_key_parses_from_config_names() {
        assert_eq!("Command".parse::<ModifierKey>(), Ok(ModifierKey::Command));
        assert!("Hyper".parse::<ModifierKey>().is_err());
    }
}
