//! Macro dispatch
//!
//! The upper layers bind a few slots to fixed chord sequences: workspace
//! switching, quitting the focused app, the screenshot chord, and a
//! click-hold latch for dragging without keeping a finger down.

use crate::log::info;

use crate::{Chord, Event, EventQueue, HidKey, Keyboard, Mods, MouseButton};

/// Custom action codes recognized by [`MacroEngine::process`].
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MacroCode {
    /// Ctrl-1, switch to workspace 1.
    Workspace1,
    /// Ctrl-2.
    Workspace2,
    /// Ctrl-3.
    Workspace3,
    /// GUI-Q, quit the focused application.
    QuitApp,
    /// GUI-Shift-4, area screenshot.
    Screenshot,
    /// Latch the left button down; press again to release it.
    ClickHold,
}

const WORKSPACE_1: Chord = Chord::new(Mods::CONTROL, HidKey::Key(Keyboard::Keyboard1));
const WORKSPACE_2: Chord = Chord::new(Mods::CONTROL, HidKey::Key(Keyboard::Keyboard2));
const WORKSPACE_3: Chord = Chord::new(Mods::CONTROL, HidKey::Key(Keyboard::Keyboard3));
const QUIT_APP: Chord = Chord::new(Mods::GUI, HidKey::Key(Keyboard::Q));
const SCREENSHOT: Chord = Chord::new(
    Mods::GUI.union(Mods::SHIFT),
    HidKey::Key(Keyboard::Keyboard4),
);

/// Runs the macro slots. The click-hold latch is the only state here, and
/// it survives across invocations.
#[derive(Default)]
pub struct MacroEngine {
    click_held: bool,
}

impl MacroEngine {
    pub fn new() -> Self {
        MacroEngine::default()
    }

    /// Handle one press or release of a macro slot. Sequences fire once,
    /// on the press; the release is consumed without emitting anything.
    /// Always reports the event as handled.
    pub fn process(&mut self, code: MacroCode, pressed: bool, events: &mut dyn EventQueue) -> bool {
        if pressed {
            match code {
                MacroCode::Workspace1 => WORKSPACE_1.tap(events),
                MacroCode::Workspace2 => WORKSPACE_2.tap(events),
                MacroCode::Workspace3 => WORKSPACE_3.tap(events),
                MacroCode::QuitApp => QUIT_APP.tap(events),
                MacroCode::Screenshot => SCREENSHOT.tap(events),
                MacroCode::ClickHold => {
                    self.click_held = !self.click_held;
                    info!("click-hold: {}", self.click_held);
                    if self.click_held {
                        events.push(Event::Press(HidKey::Button(MouseButton::Left)));
                    } else {
                        events.push(Event::Release(HidKey::Button(MouseButton::Left)));
                    }
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Queue(Vec<Event>);

    impl EventQueue for Queue {
        fn push(&mut self, val: Event) {
            self.0.push(val);
        }
    }

    #[test]
    fn workspace_fires_once_on_press() {
        let mut engine = MacroEngine::new();
        let mut queue = Queue(Vec::new());
        assert!(engine.process(MacroCode::Workspace1, true, &mut queue));
        assert_eq!(
            queue.0,
            vec![
                Event::Press(HidKey::Key(Keyboard::LeftControl)),
                Event::Press(HidKey::Key(Keyboard::Keyboard1)),
                Event::Release(HidKey::Key(Keyboard::Keyboard1)),
                Event::Release(HidKey::Key(Keyboard::LeftControl)),
            ]
        );

        // The release is handled but emits nothing.
        queue.0.clear();
        assert!(engine.process(MacroCode::Workspace1, false, &mut queue));
        assert!(queue.0.is_empty());
    }

    #[test]
    fn screenshot_releases_in_reverse() {
        let mut engine = MacroEngine::new();
        let mut queue = Queue(Vec::new());
        engine.process(MacroCode::Screenshot, true, &mut queue);
        assert_eq!(
            queue.0,
            vec![
                Event::Press(HidKey::Key(Keyboard::LeftShift)),
                Event::Press(HidKey::Key(Keyboard::LeftGUI)),
                Event::Press(HidKey::Key(Keyboard::Keyboard4)),
                Event::Release(HidKey::Key(Keyboard::Keyboard4)),
                Event::Release(HidKey::Key(Keyboard::LeftGUI)),
                Event::Release(HidKey::Key(Keyboard::LeftShift)),
            ]
        );
    }

    #[test]
    fn click_hold_latches() {
        let mut engine = MacroEngine::new();
        let mut queue = Queue(Vec::new());

        engine.process(MacroCode::ClickHold, true, &mut queue);
        engine.process(MacroCode::ClickHold, false, &mut queue);
        assert_eq!(queue.0, vec![Event::Press(HidKey::Button(MouseButton::Left))]);

        queue.0.clear();
        engine.process(MacroCode::ClickHold, true, &mut queue);
        assert_eq!(
            queue.0,
            vec![Event::Release(HidKey::Button(MouseButton::Left))]
        );
    }
}
