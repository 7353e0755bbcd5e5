//! Personal keymap for a Helix Pico split keyboard.
//!
//! This crate holds the declarative half of the author's keyboard: five
//! layer tables over the board's 4x14 logical grid, a handful of custom
//! keycodes, and the small stateful behaviors those keycodes trigger
//! (persisting the default layout, flashing the underglow while an overlay
//! is held, switching the host input method). The enclosing firmware owns
//! matrix scanning, layer resolution, HID transport, flash and the LED
//! driver; it reaches this crate through the traits in [`keyboard`],
//! [`underglow`] and [`storage`].

#![no_std]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod keyboard;
pub mod layout;
pub mod storage;
pub mod underglow;

pub use keyberon;
