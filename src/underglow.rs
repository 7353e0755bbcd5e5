//! Underglow seam.
//!
//! The LED driver and the animation engine belong to the firmware; the
//! keymap only ever selects effects and speeds as typing feedback, so the
//! seam is limited to exactly that.

/// Effects understood by the firmware's underglow animator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UnderglowEffect {
    Solid,
    Breathing,
    RainbowMood,
    Snake,
    Knight,
    Twinkle,
}

/// Animation speed used for the snake feedback while an overlay is held.
pub const OVERLAY_FEEDBACK_SPEED: u8 = 172;

/// Animation speed the snake feedback drops back to on overlay release.
pub const BASE_FEEDBACK_SPEED: u8 = 86;

/// Seam to the firmware's underglow animator.
pub trait UnderglowControl {
    /// Effect currently being rendered.
    fn current_effect(&self) -> UnderglowEffect;
    fn set_effect(&mut self, effect: UnderglowEffect);
    fn set_speed(&mut self, speed: u8);
}
