//! Tap-dance gestures
//!
//! Four of the trackball's slots are tap-dance keys: the same button yields
//! a different action depending on tap count, hold, and whether another
//! input interrupted the gesture window. The host's timing engine decides
//! when a gesture is over and hands us a [`DanceState`] snapshot; we
//! classify it into an [`Outcome`] and run the side effects bound to it.
//!
//! Each gesture comes as a `finished`/`reset` callback pair, and every
//! effect that puts something down in `finished` takes it back up in
//! `reset`. The classified outcome is threaded from one callback to the
//! other through per-key storage in [`Dances`], never through a global.

use crate::log::{info, warn};

use crate::keymap::{LayerState, APP_LAYER};
use crate::{Chord, DragScroll, Event, EventQueue, HidKey, Keyboard, Mods, MouseButton};

/// The tap-dance keys of the keymap.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DanceKey {
    /// Hold to copy, tap to paste.
    CopyPaste,
    /// Hold to cut, tap to paste.
    CutPaste,
    /// Tap to toggle drag-scroll, hold for drag-scroll while held.
    DragScroll,
    /// Tap for middle click, hold for the app layer, double tap to reopen
    /// the last closed browser tab.
    MiddleClick,
}

pub const NDANCES: usize = 4;

/// Snapshot of one gesture, taken by the host when its tap window closes.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DanceState {
    /// Number of taps seen within the window.
    pub count: u8,
    /// The key was still down when the window closed.
    pub pressed: bool,
    /// Another input arrived while the key was down.
    pub interrupted: bool,
}

/// What a completed gesture turned out to be.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    SingleTap,
    SingleHold,
    DoubleTap,
    Unknown,
}

const PASTE: Chord = Chord::new(Mods::GUI, HidKey::Key(Keyboard::V));
const COPY: Chord = Chord::new(Mods::GUI, HidKey::Key(Keyboard::C));
const CUT: Chord = Chord::new(Mods::GUI, HidKey::Key(Keyboard::X));
const MIDDLE: Chord = Chord::new(Mods::empty(), HidKey::Button(MouseButton::Middle));
const REOPEN_TAB: Chord = Chord::new(
    Mods::GUI.union(Mods::SHIFT),
    HidKey::Key(Keyboard::T),
);

impl DanceKey {
    fn index(self) -> usize {
        self as usize
    }

    /// Classify a finished gesture. A tap that was interrupted or already
    /// released counts as a tap; an uninterrupted key still down is a hold.
    /// Only the middle-click key has a double tap; two taps anywhere else
    /// classify as unknown and do nothing.
    pub fn classify(self, state: &DanceState) -> Outcome {
        match state.count {
            1 => {
                if state.interrupted || !state.pressed {
                    Outcome::SingleTap
                } else {
                    Outcome::SingleHold
                }
            }
            2 if self == DanceKey::MiddleClick => {
                if state.interrupted || !state.pressed {
                    Outcome::DoubleTap
                } else {
                    Outcome::Unknown
                }
            }
            _ => Outcome::Unknown,
        }
    }

    /// Run the 'finished' half of the outcome's side effect.
    pub fn apply(self, outcome: Outcome, layers: &mut LayerState, events: &mut dyn EventQueue) {
        match (self, outcome) {
            (DanceKey::CopyPaste, Outcome::SingleTap) => PASTE.press(events),
            (DanceKey::CopyPaste, Outcome::SingleHold) => COPY.press(events),
            (DanceKey::CutPaste, Outcome::SingleTap) => PASTE.press(events),
            (DanceKey::CutPaste, Outcome::SingleHold) => CUT.press(events),
            (DanceKey::DragScroll, Outcome::SingleTap) => {
                events.push(Event::DragScroll(DragScroll::Toggle))
            }
            (DanceKey::DragScroll, Outcome::SingleHold) => {
                events.push(Event::DragScroll(DragScroll::On))
            }
            (DanceKey::MiddleClick, Outcome::SingleTap) => MIDDLE.press(events),
            (DanceKey::MiddleClick, Outcome::SingleHold) => layers.layer_on(APP_LAYER, events),
            (DanceKey::MiddleClick, Outcome::DoubleTap) => REOPEN_TAB.press(events),
            _ => (),
        }
    }

    /// Run the 'reset' half, undoing whatever `apply` put down for the same
    /// outcome. The drag-scroll toggle is the one deliberate exception: a
    /// toggle has nothing to undo.
    pub fn undo(self, outcome: Outcome, layers: &mut LayerState, events: &mut dyn EventQueue) {
        match (self, outcome) {
            (DanceKey::CopyPaste, Outcome::SingleTap) => PASTE.release(events),
            (DanceKey::CopyPaste, Outcome::SingleHold) => COPY.release(events),
            (DanceKey::CutPaste, Outcome::SingleTap) => PASTE.release(events),
            (DanceKey::CutPaste, Outcome::SingleHold) => CUT.release(events),
            (DanceKey::DragScroll, Outcome::SingleHold) => {
                events.push(Event::DragScroll(DragScroll::Off))
            }
            (DanceKey::MiddleClick, Outcome::SingleTap) => MIDDLE.release(events),
            (DanceKey::MiddleClick, Outcome::SingleHold) => layers.layer_off(APP_LAYER, events),
            (DanceKey::MiddleClick, Outcome::DoubleTap) => REOPEN_TAB.release(events),
            _ => (),
        }
    }
}

/// Per-key bridge between the host's finished/reset callback pair. Holds
/// the classified outcome from `finished` until the matching `reset`
/// consumes it.
#[derive(Default)]
pub struct Dances {
    pending: [Option<Outcome>; NDANCES],
}

impl Dances {
    pub fn new() -> Self {
        Dances::default()
    }

    /// The gesture window closed: classify, remember, apply.
    pub fn finished(
        &mut self,
        key: DanceKey,
        state: &DanceState,
        layers: &mut LayerState,
        events: &mut dyn EventQueue,
    ) -> Outcome {
        let outcome = key.classify(state);
        if outcome == Outcome::Unknown {
            warn!("dance {:?}: unclassified gesture {:?}", key, state);
        } else {
            info!("dance {:?}: {:?}", key, outcome);
        }
        key.apply(outcome, layers, events);
        self.pending[key.index()] = Some(outcome);
        outcome
    }

    /// The key came physically back up: undo the pending outcome, if any.
    pub fn reset(&mut self, key: DanceKey, layers: &mut LayerState, events: &mut dyn EventQueue) {
        if let Some(outcome) = self.pending[key.index()].take() {
            key.undo(outcome, layers, events);
        }
    }
}
