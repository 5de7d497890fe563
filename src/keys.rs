//! Buttons on the Madromys trackball
//!
//! The Madromys has six buttons arranged around the ball: four across the
//! front and two under the thumb. Scan codes are assigned left to right as
//! the board reports them, and named here by their base layer legend so the
//! layer table reads naturally.

/// All of the scancodes fit within this.
pub const NBUTTONS: usize = 6;

pub const BTN_LEFT: u8 = 0;
pub const BTN_MIDDLE: u8 = 1;
pub const BTN_RIGHT: u8 = 2;
pub const BTN_BACK: u8 = 3;
pub const BTN_SCROLL: u8 = 4;
pub const BTN_ENTER: u8 = 5;
