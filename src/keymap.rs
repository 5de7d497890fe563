//! Layer table and event dispatch
//!
//! The trackball has four layers over its six buttons:
//!
//! - Layer 0 (base): the ordinary mouse buttons, with the right and back
//!   buttons doubling as momentary shifts into layers 2 and 1, the middle
//!   and scroll buttons as tap-dance keys, and an enter key.
//! - Layer 1 (workspace): workspace-switch macros and the DPI cycle key.
//! - Layer 2 (clipboard): the copy/paste and cut/paste dances plus the
//!   forward button.
//! - Layer 3 (app): click-hold latch, quit and screenshot macros. Reached
//!   by holding the middle-click dance key.
//!
//! A button resolves against the highest active layer, falling through
//! `Transparent` slots down to the base. The action a button resolved to
//! at press time is remembered so its release pairs up even if the layer
//! set changed while it was down.

use crate::log::info;

use crate::dance::{DanceKey, DanceState, Dances, Outcome};
use crate::keys::NBUTTONS;
use crate::macros::{MacroCode, MacroEngine};
use crate::{Event, EventQueue, HidKey, KeyEvent, Keyboard, MouseButton};

pub const NLAYERS: usize = 4;

pub const BASE_LAYER: u8 = 0;
pub const WORKSPACE_LAYER: u8 = 1;
pub const CLIPBOARD_LAYER: u8 = 2;
pub const APP_LAYER: u8 = 3;

/// One slot of the layer table.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Send a keyboard key.
    Key(Keyboard),
    /// Send a mouse button.
    Button(MouseButton),
    /// Momentary layer while held; the wrapped button on an uninterrupted
    /// tap.
    LayerTap(u8, MouseButton),
    /// A tap-dance key, driven by the host's gesture timing.
    Dance(DanceKey),
    /// A macro slot.
    Macro(MacroCode),
    /// Step the sensor DPI.
    DpiConfig,
    /// Defer to the next active layer below.
    Transparent,
}

/// Create a normal key action.
#[macro_export]
macro_rules! k {
    ($k: ident) => {
        $crate::keymap::Action::Key($crate::Keyboard::$k)
    };
}

/// Create a mouse button action.
#[macro_export]
macro_rules! mb {
    ($b: ident) => {
        $crate::keymap::Action::Button($crate::MouseButton::$b)
    };
}

/// Create a layer-tap action: layer while held, button on tap.
#[macro_export]
macro_rules! lt {
    ($x: literal, $b: ident) => {
        $crate::keymap::Action::LayerTap($x, $crate::MouseButton::$b)
    };
}

/// Create a tap-dance action.
#[macro_export]
macro_rules! td {
    ($k: ident) => {
        $crate::keymap::Action::Dance($crate::dance::DanceKey::$k)
    };
}

/// Create a macro action.
#[macro_export]
macro_rules! mc {
    ($m: ident) => {
        $crate::keymap::Action::Macro($crate::macros::MacroCode::$m)
    };
}

/// Create a plain action, e.g. `a!(Transparent)`.
#[macro_export]
macro_rules! a {
    ($a: ident) => {
        $crate::keymap::Action::$a
    };
}

/// The layer table. Slots run left to right across the buttons; see
/// `keys.rs` for the physical positions.
pub static LAYERS: [[Action; NBUTTONS]; NLAYERS] = [
    // 0: base
    [
        mb!(Left),
        td!(MiddleClick),
        lt!(2, Right),
        lt!(1, Back),
        td!(DragScroll),
        k!(ReturnEnter),
    ],
    // 1: workspace
    [
        mc!(Workspace1),
        mc!(Workspace2),
        mc!(Workspace3),
        a!(Transparent),
        a!(Transparent),
        a!(DpiConfig),
    ],
    // 2: clipboard
    [
        td!(CopyPaste),
        td!(CutPaste),
        a!(Transparent),
        mb!(Forward),
        a!(Transparent),
        a!(Transparent),
    ],
    // 3: app
    [
        mc!(ClickHold),
        a!(Transparent),
        a!(Transparent),
        mc!(QuitApp),
        mc!(Screenshot),
        a!(Transparent),
    ],
];

/// The set of active layers. The base layer is always on; the others come
/// and go with layer-tap holds and the middle-click dance. Changes are
/// reported to the host as events so it can track them too.
pub struct LayerState {
    active: u8,
}

impl LayerState {
    pub fn new() -> Self {
        LayerState {
            active: 1 << BASE_LAYER,
        }
    }

    pub fn is_on(&self, layer: u8) -> bool {
        self.active & (1 << layer) != 0
    }

    pub fn layer_on(&mut self, layer: u8, events: &mut dyn EventQueue) {
        let bit = 1 << layer;
        if self.active & bit == 0 {
            self.active |= bit;
            info!("layer {} on", layer);
            events.push(Event::LayerOn(layer));
        }
    }

    pub fn layer_off(&mut self, layer: u8, events: &mut dyn EventQueue) {
        // The base layer can't be turned off.
        if layer == BASE_LAYER {
            return;
        }
        let bit = 1 << layer;
        if self.active & bit != 0 {
            self.active &= !bit;
            info!("layer {} off", layer);
            events.push(Event::LayerOff(layer));
        }
    }
}

impl Default for LayerState {
    fn default() -> Self {
        LayerState::new()
    }
}

/// What a pressed button resolved to, kept until its release.
#[derive(Clone, Copy)]
enum Held {
    Hid(HidKey),
    LayerTap {
        layer: u8,
        tap: MouseButton,
        interrupted: bool,
    },
    Macro(MacroCode),
    Dance(DanceKey),
    DpiConfig,
}

/// The keymap engine. The host feeds it every recognized input event plus
/// the tap-dance finished/reset callbacks, and reads the results off its
/// event queue.
pub struct Keymap {
    layers: LayerState,
    held: [Option<Held>; NBUTTONS],
    dances: Dances,
    macros: MacroEngine,
}

impl Keymap {
    pub fn new() -> Self {
        Keymap {
            layers: LayerState::new(),
            held: [None; NBUTTONS],
            dances: Dances::new(),
            macros: MacroEngine::new(),
        }
    }

    pub fn is_layer_on(&self, layer: u8) -> bool {
        self.layers.is_on(layer)
    }

    /// Handle a single button event. Returns true when the event was
    /// consumed here; false asks the host to fall back to its default
    /// handling.
    pub fn handle_event(&mut self, event: KeyEvent, events: &mut dyn EventQueue) -> bool {
        let slot = event.key() as usize;
        if slot >= NBUTTONS {
            return false;
        }
        if event.is_press() {
            self.press(slot, events)
        } else {
            self.release(slot, events)
        }
    }

    /// The host's gesture window closed for a tap-dance key. Classifies
    /// the gesture and applies its side effect.
    pub fn dance_finished(
        &mut self,
        key: DanceKey,
        state: &DanceState,
        events: &mut dyn EventQueue,
    ) -> Outcome {
        self.dances.finished(key, state, &mut self.layers, events)
    }

    /// The tap-dance key came physically back up.
    pub fn dance_reset(&mut self, key: DanceKey, events: &mut dyn EventQueue) {
        self.dances.reset(key, &mut self.layers, events)
    }

    fn resolve(&self, slot: usize) -> Action {
        for layer in (0..NLAYERS as u8).rev() {
            if self.layers.is_on(layer) {
                match LAYERS[layer as usize][slot] {
                    Action::Transparent => continue,
                    action => return action,
                }
            }
        }
        Action::Transparent
    }

    fn press(&mut self, slot: usize, events: &mut dyn EventQueue) -> bool {
        // Any new press interrupts a held layer-tap: its own tap half must
        // not fire anymore.
        for (i, held) in self.held.iter_mut().enumerate() {
            if i != slot {
                if let Some(Held::LayerTap { interrupted, .. }) = held {
                    *interrupted = true;
                }
            }
        }

        match self.resolve(slot) {
            Action::Key(k) => {
                events.push(Event::Press(HidKey::Key(k)));
                self.held[slot] = Some(Held::Hid(HidKey::Key(k)));
            }
            Action::Button(b) => {
                events.push(Event::Press(HidKey::Button(b)));
                self.held[slot] = Some(Held::Hid(HidKey::Button(b)));
            }
            Action::LayerTap(layer, tap) => {
                self.layers.layer_on(layer, events);
                self.held[slot] = Some(Held::LayerTap {
                    layer,
                    tap,
                    interrupted: false,
                });
            }
            Action::Dance(key) => {
                // Gesture keys are driven by the host's timing engine
                // through dance_finished/dance_reset.
                self.held[slot] = Some(Held::Dance(key));
            }
            Action::Macro(code) => {
                self.macros.process(code, true, events);
                self.held[slot] = Some(Held::Macro(code));
            }
            Action::DpiConfig => {
                events.push(Event::DpiCycle);
                self.held[slot] = Some(Held::DpiConfig);
            }
            Action::Transparent => return false,
        }
        true
    }

    fn release(&mut self, slot: usize, events: &mut dyn EventQueue) -> bool {
        match self.held[slot].take() {
            Some(Held::Hid(key)) => {
                events.push(Event::Release(key));
            }
            Some(Held::LayerTap {
                layer,
                tap,
                interrupted,
            }) => {
                self.layers.layer_off(layer, events);
                // An uninterrupted press-release delivers the tap half.
                if !interrupted {
                    events.push(Event::Press(HidKey::Button(tap)));
                    events.push(Event::Release(HidKey::Button(tap)));
                }
            }
            Some(Held::Macro(code)) => {
                self.macros.process(code, false, events);
            }
            Some(Held::Dance(_)) | Some(Held::DpiConfig) => (),
            None => return false,
        }
        true
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Keymap::new()
    }
}
