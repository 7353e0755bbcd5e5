//! Custom keycodes and the session state behind them.
//!
//! The firmware resolves layers and reports plain HID keycodes on its own.
//! Whenever the resolved action is one of this keymap's [`Keycode`]s, the
//! firmware hands the transition to [`SessionState::on_keycode`] before any
//! default processing, together with the [`Services`] it exposes to the
//! keymap. All keymap state lives in [`SessionState`], owned by the caller
//! and threaded through explicitly.

use keyberon::key_code::KeyCode;

use crate::layout::{DefaultLayout, Layer};
use crate::storage::{ConfigStorage, KeymapConfig};
use crate::underglow::{
    UnderglowControl, UnderglowEffect, BASE_FEEDBACK_SPEED, OVERLAY_FEEDBACK_SPEED,
};

/// Keycodes outside the HID keycode space, intercepted before default
/// processing. These are the values placed in the layer tables as
/// [`Action::Custom`](keyberon::action::Action::Custom).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Keycode {
    /// Held: engage the Lower overlay.
    Lower,
    /// Held: engage the Raise overlay.
    Raise,
    /// Switch the host input method to alphanumeric input.
    Eisu,
    /// Switch the host input method to kana input.
    Kana,
    /// Persist Dvorak as the default layout.
    Dvorak,
    /// Persist Eucalyn as the default layout.
    Eucalyn,
    /// Reboot into the bootloader.
    Bootloader,
}

/// Seam to the firmware's layer engine.
pub trait LayerControl {
    /// Engage an overlay layer.
    fn layer_on(&mut self, layer: Layer);
    /// Disengage an overlay layer.
    fn layer_off(&mut self, layer: Layer);
    fn is_layer_on(&self, layer: Layer) -> bool;
    /// Make `layout` the live base layer.
    fn set_default_layer(&mut self, layout: DefaultLayout);
}

/// Seam to the firmware's HID report path.
pub trait HostReport {
    /// Hold `code` down until [`unregister_code`](HostReport::unregister_code).
    fn register_code(&mut self, code: KeyCode);
    fn unregister_code(&mut self, code: KeyCode);
    /// Press and release `codes` as one chord.
    fn tap(&mut self, codes: &[KeyCode]);
}

/// Seam to the MCU.
pub trait SystemControl {
    fn jump_to_bootloader(&mut self);
}

/// Firmware services the responder drives, threaded through per event.
pub struct Services<'a, L, U, C, H, S> {
    pub layers: &'a mut L,
    pub underglow: &'a mut U,
    pub config: &'a mut C,
    pub host: &'a mut H,
    pub system: &'a mut S,
}

/// Input method toggle sent instead of the Lang keycodes when the host
/// swaps Alt and GUI (the macOS convention).
const SWAPPED_IME_TOGGLE: &[KeyCode] = &[KeyCode::LAlt, KeyCode::Grave];

/// Per-session keymap state.
pub struct SessionState {
    config: KeymapConfig,
    /// Whether the overlay feedback lighting is currently engaged. Gates the
    /// effect switch to once per engagement, not once per key event.
    overlay_lit: bool,
    /// Effect that was active at startup, restored when Adjust engages.
    resting_effect: UnderglowEffect,
}

impl SessionState {
    /// Startup hook. Captures the effect the underglow animator is currently
    /// rendering so it can be restored later.
    pub fn init(underglow: &impl UnderglowControl, config: KeymapConfig) -> Self {
        Self {
            config,
            overlay_lit: false,
            resting_effect: underglow.current_effect(),
        }
    }

    /// Startup hook that also reads the persisted config, falling back to
    /// defaults when the storage is empty or unreadable.
    pub fn from_storage<C: ConfigStorage>(
        storage: &mut C,
        underglow: &impl UnderglowControl,
    ) -> Self {
        let config = match storage.load() {
            Ok(Some(config)) => config,
            Ok(None) => KeymapConfig::default(),
            Err(_) => {
                warn!("could not read keymap config, using defaults");
                KeymapConfig::default()
            }
        };
        Self::init(underglow, config)
    }

    pub fn config(&self) -> &KeymapConfig {
        &self.config
    }

    /// Respond to a custom keycode transition. Returns `false` when the
    /// event was consumed and default processing should stop.
    pub fn on_keycode<L, U, C, H, S>(
        &mut self,
        keycode: Keycode,
        pressed: bool,
        fw: &mut Services<'_, L, U, C, H, S>,
    ) -> bool
    where
        L: LayerControl,
        U: UnderglowControl,
        C: ConfigStorage,
        H: HostReport,
        S: SystemControl,
    {
        match keycode {
            Keycode::Dvorak => {
                if pressed {
                    self.set_default_layout(DefaultLayout::Dvorak, fw);
                }
            }
            Keycode::Eucalyn => {
                if pressed {
                    fw.underglow.set_effect(UnderglowEffect::Twinkle);
                    self.set_default_layout(DefaultLayout::Eucalyn, fw);
                }
            }
            Keycode::Lower => self.overlay_event(Layer::Lower, pressed, fw),
            Keycode::Raise => self.overlay_event(Layer::Raise, pressed, fw),
            Keycode::Eisu => self.ime_event(KeyCode::Lang2, pressed, fw),
            Keycode::Kana => self.ime_event(KeyCode::Lang1, pressed, fw),
            Keycode::Bootloader => {
                if pressed {
                    fw.system.jump_to_bootloader();
                }
            }
        }
        false
    }

    fn set_default_layout<L, U, C, H, S>(
        &mut self,
        layout: DefaultLayout,
        fw: &mut Services<'_, L, U, C, H, S>,
    ) where
        L: LayerControl,
        C: ConfigStorage,
    {
        self.config.default_layout = layout;
        if fw.config.save(&self.config).is_err() {
            error!("failed to persist keymap config");
        }
        fw.layers.set_default_layer(layout);
        debug!("default layout switched");
    }

    fn overlay_event<L, U, C, H, S>(
        &mut self,
        overlay: Layer,
        pressed: bool,
        fw: &mut Services<'_, L, U, C, H, S>,
    ) where
        L: LayerControl,
        U: UnderglowControl,
    {
        if pressed {
            if !self.overlay_lit {
                self.overlay_lit = true;
                fw.underglow.set_effect(UnderglowEffect::Snake);
                fw.underglow.set_speed(OVERLAY_FEEDBACK_SPEED);
            }
            fw.layers.layer_on(overlay);
        } else {
            fw.underglow.set_effect(UnderglowEffect::Snake);
            fw.underglow.set_speed(BASE_FEEDBACK_SPEED);
            fw.layers.layer_off(overlay);
            self.overlay_lit = false;
        }
        self.update_adjust(fw);
    }

    /// Engage Adjust while both overlays are held, and hand the lighting
    /// back to whatever was running at startup.
    fn update_adjust<L, U, C, H, S>(&mut self, fw: &mut Services<'_, L, U, C, H, S>)
    where
        L: LayerControl,
        U: UnderglowControl,
    {
        if fw.layers.is_layer_on(Layer::Lower) && fw.layers.is_layer_on(Layer::Raise) {
            fw.underglow.set_effect(self.resting_effect);
            fw.layers.layer_on(Layer::Adjust);
        } else {
            fw.layers.layer_off(Layer::Adjust);
        }
    }

    fn ime_event<L, U, C, H, S>(
        &mut self,
        code: KeyCode,
        pressed: bool,
        fw: &mut Services<'_, L, U, C, H, S>,
    ) where
        H: HostReport,
    {
        if pressed {
            if self.config.swap_alt_gui {
                fw.host.tap(SWAPPED_IME_TOGGLE);
            } else {
                fw.host.register_code(code);
            }
        } else {
            fw.host.unregister_code(code);
        }
    }
}

#[cfg(test)]
mod test {
    extern crate std;

    use std::vec::Vec;

    use super::*;

    #[derive(Default)]
    struct FakeLayers {
        on: [bool; Layer::COUNT],
        default: Option<DefaultLayout>,
    }

    impl LayerControl for FakeLayers {
        fn layer_on(&mut self, layer: Layer) {
            self.on[layer.index()] = true;
        }

        fn layer_off(&mut self, layer: Layer) {
            self.on[layer.index()] = false;
        }

        fn is_layer_on(&self, layer: Layer) -> bool {
            self.on[layer.index()]
        }

        fn set_default_layer(&mut self, layout: DefaultLayout) {
            self.default = Some(layout);
        }
    }

    struct FakeUnderglow {
        effect: UnderglowEffect,
        effects: Vec<UnderglowEffect>,
        speeds: Vec<u8>,
    }

    impl FakeUnderglow {
        fn new(effect: UnderglowEffect) -> Self {
            Self {
                effect,
                effects: Vec::new(),
                speeds: Vec::new(),
            }
        }
    }

    impl UnderglowControl for FakeUnderglow {
        fn current_effect(&self) -> UnderglowEffect {
            self.effect
        }

        fn set_effect(&mut self, effect: UnderglowEffect) {
            self.effect = effect;
            self.effects.push(effect);
        }

        fn set_speed(&mut self, speed: u8) {
            self.speeds.push(speed);
        }
    }

    #[derive(Default)]
    struct FakeStorage {
        saved: Vec<KeymapConfig>,
        fail: bool,
    }

    impl ConfigStorage for FakeStorage {
        type Error = ();

        fn save(&mut self, config: &KeymapConfig) -> Result<(), ()> {
            if self.fail {
                return Err(());
            }
            self.saved.push(*config);
            Ok(())
        }

        fn load(&mut self) -> Result<Option<KeymapConfig>, ()> {
            if self.fail {
                return Err(());
            }
            Ok(self.saved.last().copied())
        }
    }

    #[derive(Default)]
    struct FakeHost {
        registered: Vec<KeyCode>,
        unregistered: Vec<KeyCode>,
        taps: Vec<Vec<KeyCode>>,
    }

    impl HostReport for FakeHost {
        fn register_code(&mut self, code: KeyCode) {
            self.registered.push(code);
        }

        fn unregister_code(&mut self, code: KeyCode) {
            self.unregistered.push(code);
        }

        fn tap(&mut self, codes: &[KeyCode]) {
            self.taps.push(codes.iter().copied().collect());
        }
    }

    #[derive(Default)]
    struct FakeSystem {
        bootloader_requests: usize,
    }

    impl SystemControl for FakeSystem {
        fn jump_to_bootloader(&mut self) {
            self.bootloader_requests += 1;
        }
    }

    struct Rig {
        layers: FakeLayers,
        underglow: FakeUnderglow,
        storage: FakeStorage,
        host: FakeHost,
        system: FakeSystem,
        state: SessionState,
    }

    impl Rig {
        fn new() -> Self {
            Self::with_effect(UnderglowEffect::RainbowMood)
        }

        fn with_effect(effect: UnderglowEffect) -> Self {
            let underglow = FakeUnderglow::new(effect);
            let state = SessionState::init(&underglow, KeymapConfig::default());
            Rig {
                layers: FakeLayers::default(),
                underglow,
                storage: FakeStorage::default(),
                host: FakeHost::default(),
                system: FakeSystem::default(),
                state,
            }
        }

        fn key(&mut self, keycode: Keycode, pressed: bool) -> bool {
            self.state.on_keycode(
                keycode,
                pressed,
                &mut Services {
                    layers: &mut self.layers,
                    underglow: &mut self.underglow,
                    config: &mut self.storage,
                    host: &mut self.host,
                    system: &mut self.system,
                },
            )
        }
    }

    #[test]
    fn default_layout_press_persists_exactly_that_layout() {
        let mut rig = Rig::new();
        assert!(!rig.key(Keycode::Dvorak, true));
        assert_eq!(rig.storage.saved.len(), 1);
        assert_eq!(rig.storage.saved[0].default_layout, DefaultLayout::Dvorak);
        assert_eq!(rig.layers.default, Some(DefaultLayout::Dvorak));
        assert!(!rig.key(Keycode::Dvorak, false));
        assert_eq!(rig.storage.saved.len(), 1);
    }

    #[test]
    fn eucalyn_press_flashes_twinkle_then_persists() {
        let mut rig = Rig::new();
        rig.key(Keycode::Eucalyn, true);
        assert_eq!(rig.underglow.effects, [UnderglowEffect::Twinkle]);
        assert_eq!(rig.storage.saved.len(), 1);
        assert_eq!(rig.storage.saved[0].default_layout, DefaultLayout::Eucalyn);
        assert_eq!(rig.layers.default, Some(DefaultLayout::Eucalyn));
    }

    #[test]
    fn selecting_eucalyn_leaves_the_raise_overlay_alone() {
        let mut rig = Rig::new();
        rig.key(Keycode::Eucalyn, true);
        assert!(!rig.layers.is_layer_on(Layer::Raise));
        assert!(!rig.layers.is_layer_on(Layer::Adjust));
        assert!(!rig.state.overlay_lit);
        assert!(rig.underglow.speeds.is_empty());
    }

    #[test]
    fn overlay_press_release_returns_the_gate_to_false() {
        let mut rig = Rig::new();
        rig.key(Keycode::Raise, true);
        assert!(rig.state.overlay_lit);
        assert!(rig.layers.is_layer_on(Layer::Raise));
        rig.key(Keycode::Raise, false);
        assert!(!rig.state.overlay_lit);
        assert!(!rig.layers.is_layer_on(Layer::Raise));
    }

    #[test]
    fn lighting_changes_once_per_engagement() {
        let mut rig = Rig::new();
        rig.key(Keycode::Raise, true);
        assert_eq!(rig.underglow.effects, [UnderglowEffect::Snake]);
        assert_eq!(rig.underglow.speeds, [OVERLAY_FEEDBACK_SPEED]);
        // Second overlay while the first is held: no second feedback switch,
        // but the tri-layer kicks in and restores the resting effect.
        rig.key(Keycode::Lower, true);
        assert_eq!(
            rig.underglow.effects,
            [UnderglowEffect::Snake, UnderglowEffect::RainbowMood]
        );
        assert_eq!(rig.underglow.speeds, [OVERLAY_FEEDBACK_SPEED]);
    }

    #[test]
    fn holding_both_overlays_engages_adjust() {
        let mut rig = Rig::new();
        rig.key(Keycode::Lower, true);
        assert!(!rig.layers.is_layer_on(Layer::Adjust));
        rig.key(Keycode::Raise, true);
        assert!(rig.layers.is_layer_on(Layer::Adjust));
        rig.key(Keycode::Raise, false);
        assert!(!rig.layers.is_layer_on(Layer::Adjust));
        assert!(rig.layers.is_layer_on(Layer::Lower));
    }

    #[test]
    fn overlay_release_always_signals_base_feedback() {
        // A release with no matching press still drops the lighting back to
        // the base feedback; the gate just ends up cleared.
        let mut rig = Rig::new();
        rig.key(Keycode::Lower, false);
        assert_eq!(rig.underglow.effects, [UnderglowEffect::Snake]);
        assert_eq!(rig.underglow.speeds, [BASE_FEEDBACK_SPEED]);
        assert!(!rig.state.overlay_lit);
    }

    #[test]
    fn startup_captures_the_running_effect_for_adjust() {
        let mut rig = Rig::with_effect(UnderglowEffect::Knight);
        rig.key(Keycode::Raise, true);
        rig.key(Keycode::Lower, true);
        assert_eq!(rig.underglow.effect, UnderglowEffect::Knight);
    }

    #[test]
    fn eisu_and_kana_register_their_lang_codes() {
        let mut rig = Rig::new();
        rig.key(Keycode::Eisu, true);
        rig.key(Keycode::Eisu, false);
        rig.key(Keycode::Kana, true);
        rig.key(Keycode::Kana, false);
        assert_eq!(rig.host.registered, [KeyCode::Lang2, KeyCode::Lang1]);
        assert_eq!(rig.host.unregistered, [KeyCode::Lang2, KeyCode::Lang1]);
        assert!(rig.host.taps.is_empty());
    }

    #[test]
    fn swapped_hosts_get_the_alt_grave_toggle() {
        let mut rig = Rig::new();
        rig.state.config.swap_alt_gui = true;
        rig.key(Keycode::Kana, true);
        assert_eq!(rig.host.taps, [[KeyCode::LAlt, KeyCode::Grave]]);
        assert!(rig.host.registered.is_empty());
        // The release path does not consult the swap flag.
        rig.key(Keycode::Kana, false);
        assert_eq!(rig.host.unregistered, [KeyCode::Lang1]);
    }

    #[test]
    fn bootloader_key_reaches_the_mcu_seam() {
        let mut rig = Rig::new();
        rig.key(Keycode::Bootloader, true);
        rig.key(Keycode::Bootloader, false);
        assert_eq!(rig.system.bootloader_requests, 1);
    }

    #[test]
    fn persist_failure_still_switches_the_live_layout() {
        let mut rig = Rig::new();
        rig.storage.fail = true;
        rig.key(Keycode::Eucalyn, true);
        assert!(rig.storage.saved.is_empty());
        assert_eq!(rig.layers.default, Some(DefaultLayout::Eucalyn));
    }

    #[test]
    fn session_boots_from_stored_config() {
        let mut storage = FakeStorage::default();
        let stored = KeymapConfig {
            default_layout: DefaultLayout::Eucalyn,
            swap_alt_gui: true,
        };
        storage.save(&stored).unwrap();
        let underglow = FakeUnderglow::new(UnderglowEffect::Solid);
        let state = SessionState::from_storage(&mut storage, &underglow);
        assert_eq!(*state.config(), stored);
        assert_eq!(state.resting_effect, UnderglowEffect::Solid);

        let mut broken = FakeStorage::default();
        broken.fail = true;
        let state = SessionState::from_storage(&mut broken, &underglow);
        assert_eq!(*state.config(), KeymapConfig::default());
    }
}
