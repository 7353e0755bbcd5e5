//! Persistence of the keymap's own configuration.
//!
//! The flash peripheral and its wear-leveling are firmware concerns; the
//! keymap defines the record that survives power cycles and the byte image
//! it travels as. The image is a postcard encoding bounded by
//! [`KeymapConfig::POSTCARD_MAX_SIZE`], so the firmware can reserve the
//! slot statically.

use postcard::experimental::max_size::MaxSize;
use serde::{Deserialize, Serialize};

use crate::layout::DefaultLayout;

/// Settings that survive power cycles.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeymapConfig {
    /// Base layout restored at power-on.
    pub default_layout: DefaultLayout,
    /// Whether the host swaps Alt and GUI. Selects the input method switch
    /// sequence the Eisu/Kana keys emit.
    pub swap_alt_gui: bool,
}

impl KeymapConfig {
    pub const fn default() -> Self {
        Self {
            default_layout: DefaultLayout::Dvorak,
            swap_alt_gui: false,
        }
    }
}

impl Default for KeymapConfig {
    fn default() -> Self {
        Self::default()
    }
}

/// Seam to the firmware's settings storage.
pub trait ConfigStorage {
    type Error;

    /// Replace the stored record with `config`.
    fn save(&mut self, config: &KeymapConfig) -> Result<(), Self::Error>;
    /// Fetch the stored record, `None` if nothing has been written yet.
    fn load(&mut self) -> Result<Option<KeymapConfig>, Self::Error>;
}

/// Byte image of a [`KeymapConfig`] as written to flash.
pub type ConfigImage = heapless::Vec<u8, { KeymapConfig::POSTCARD_MAX_SIZE }>;

/// Serialize `config` into the image written to flash.
pub fn encode(config: &KeymapConfig) -> Result<ConfigImage, postcard::Error> {
    postcard::to_vec(config)
}

/// Decode an image read back from flash.
pub fn decode(bytes: &[u8]) -> Result<KeymapConfig, postcard::Error> {
    postcard::from_bytes(bytes)
}
