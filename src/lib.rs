//! Madromys trackball keymap
//!
//! Keymap logic for a six button programmable trackball. The host firmware
//! owns the sensor, button scanning, debouncing, USB HID transport and the
//! tap-dance timing engine; this crate is handed the resulting events and
//! answers with HID outputs through an [`EventQueue`] supplied by the host:
//!
//! - Button press/release events go to [`keymap::Keymap::handle_event`],
//!   which resolves them against the layer table.
//! - Completed tap-dance gestures go to the `dance_finished`/`dance_reset`
//!   pair, which classify the gesture and apply/undo its side effects.

#![cfg_attr(not(any(feature = "std", test)), no_std)]

pub use usbd_human_interface_device::page::Keyboard;

use bitflags::bitflags;

pub use keymap::Keymap;

pub mod dance;
pub mod keymap;
pub mod keys;
pub mod macros;

cfg_if::cfg_if! {
    if #[cfg(feature = "defmt")] {
        mod log {
            pub use defmt::info;
            pub use defmt::warn;
        }
    } else {
        mod log {
            pub use log::info;
            pub use log::warn;
        }
    }
}

/// Key events indicate buttons going up or down.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyEvent {
    Press(u8),
    Release(u8),
}

impl KeyEvent {
    pub fn key(&self) -> u8 {
        match self {
            KeyEvent::Press(k) => *k,
            KeyEvent::Release(k) => *k,
        }
    }

    pub fn is_press(&self) -> bool {
        match self {
            KeyEvent::Press(_) => true,
            KeyEvent::Release(_) => false,
        }
    }

    pub fn is_release(&self) -> bool {
        !self.is_press()
    }
}

/// Mouse buttons as they appear in the HID mouse report.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
}

impl MouseButton {
    /// Bit of this button in the report's button byte.
    pub fn bit(self) -> u8 {
        match self {
            MouseButton::Left => 0x01,
            MouseButton::Right => 0x02,
            MouseButton::Middle => 0x04,
            MouseButton::Back => 0x08,
            MouseButton::Forward => 0x10,
        }
    }
}

/// A single emittable HID usage, either a keyboard key or a mouse button.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HidKey {
    Key(Keyboard),
    Button(MouseButton),
}

bitflags! {
    /// A modifier map. This indicates what modifiers should be held down when
    /// this keypress is sent.
    #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
    pub struct Mods: u8 {
        const SHIFT = 0b0000_0001;
        const CONTROL = 0b0000_0010;
        const ALT = 0b0000_0100;
        const GUI = 0b0000_1000;
    }
}

static MOD_KEYS: [(Mods, Keyboard); 4] = [
    (Mods::SHIFT, Keyboard::LeftShift),
    (Mods::CONTROL, Keyboard::LeftControl),
    (Mods::ALT, Keyboard::LeftAlt),
    (Mods::GUI, Keyboard::LeftGUI),
];

/// A modified keypress. Pressing a chord puts its modifiers down and then
/// the key; releasing takes everything back up in reverse order, so a chord
/// that spans a gesture window can never strand a modifier.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct Chord {
    pub mods: Mods,
    pub key: HidKey,
}

impl Chord {
    pub const fn new(mods: Mods, key: HidKey) -> Self {
        Chord { mods, key }
    }

    /// Put the chord down, modifiers first.
    pub fn press(&self, events: &mut dyn EventQueue) {
        for (m, k) in MOD_KEYS {
            if self.mods.contains(m) {
                events.push(Event::Press(HidKey::Key(k)));
            }
        }
        events.push(Event::Press(self.key));
    }

    /// Take the chord back up, key first, modifiers in reverse.
    pub fn release(&self, events: &mut dyn EventQueue) {
        events.push(Event::Release(self.key));
        for (m, k) in MOD_KEYS.iter().rev() {
            if self.mods.contains(*m) {
                events.push(Event::Release(HidKey::Key(*k)));
            }
        }
    }

    /// Press and immediately release.
    pub fn tap(&self, events: &mut dyn EventQueue) {
        self.press(events);
        self.release(events);
    }
}

/// Mutations of the drag-scroll flag. The flag itself lives in the host,
/// next to the sensor code that consumes it.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DragScroll {
    Toggle,
    On,
    Off,
}

/// An event is something this crate asks the host to do: put a HID usage
/// down or up, change the active layer set, or poke a host-owned mode.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Put a keyboard key or mouse button down.
    Press(HidKey),

    /// Release a previously pressed key or button.
    Release(HidKey),

    /// A layer became active.
    LayerOn(u8),

    /// A layer became inactive.
    LayerOff(u8),

    /// Change the host's drag-scroll flag.
    DragScroll(DragScroll),

    /// Step the sensor to its next DPI setting.
    DpiCycle,
}

/// A generalized event queue.  TODO: Handle the error better.  For now, we
/// don't do anything with the error, so might as well.
pub trait EventQueue {
    // Attempt to push to the queue.  Events will be discarded if the queue is full.
    fn push(&mut self, val: Event);
}
