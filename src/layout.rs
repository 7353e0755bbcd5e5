//! Layer tables for the Helix Pico's 4x14 logical grid.
//!
//! The firmware's key-resolution pass owns the lookup; this module only
//! provides the data. Rows 0-2 have twelve physical keys (six per hand), the
//! bottom row adds the two center thumb keys, so the center slots of the
//! upper rows are padded with [`Action::NoOp`].

use postcard::experimental::max_size::MaxSize;
use serde::{Deserialize, Serialize};

use crate::keyboard::Keycode;
use keyberon::key_code::KeyCode as KC;

/// Action slot type used across the tables.
pub type Action = keyberon::action::Action<Keycode>;

/// The five key planes. `Dvorak` and `Eucalyn` are base layouts, the rest
/// are overlays active only while their trigger key is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Layer {
    Dvorak = 0,
    Eucalyn,
    Lower,
    Raise,
    Adjust,
}

impl Layer {
    pub const COUNT: usize = 5;

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// The base layout restored at power-on. A separate type from [`Layer`] so
/// an overlay can never end up persisted as the default.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DefaultLayout {
    Dvorak,
    Eucalyn,
}

impl DefaultLayout {
    pub const fn layer(self) -> Layer {
        match self {
            DefaultLayout::Dvorak => Layer::Dvorak,
            DefaultLayout::Eucalyn => Layer::Eucalyn,
        }
    }
}

/// Rows in the logical layout grid.
pub const LAYOUT_ROWS: usize = 4;
/// Columns in the logical layout grid.
pub const LAYOUT_COLS: usize = 14;

/// One layer's worth of key assignments.
pub type LayerGrid = [[Action; LAYOUT_COLS]; LAYOUT_ROWS];

const fn k(kc: KC) -> Action {
    Action::KeyCode(kc)
}

const fn cust(code: Keycode) -> Action {
    Action::Custom(code)
}

const _______: Action = Action::Trans;
const XXXXXXX: Action = Action::NoOp;

const EISU: Action = cust(Keycode::Eisu);
const KANA: Action = cust(Keycode::Kana);
const LOWER: Action = cust(Keycode::Lower);
const RAISE: Action = cust(Keycode::Raise);
const DVORAK: Action = cust(Keycode::Dvorak);
const EUCALYN: Action = cust(Keycode::Eucalyn);
const BOOT: Action = cust(Keycode::Bootloader);

/// Physical keycodes that produce the labeled glyph on a host configured
/// for a software Dvorak layout. The board sends raw positions and the
/// host's layout does the glyph mapping, so e.g. the key that should print
/// `o` has to send the code of the QWERTY `S` key. Glyphs that need Shift
/// on a Dvorak host become a Shift chord.
mod dv {
    use super::{k, Action, KC};

    pub const QUOT: Action = k(KC::Q);
    pub const COMM: Action = k(KC::W);
    pub const DOT: Action = k(KC::E);
    pub const P: Action = k(KC::R);
    pub const Y: Action = k(KC::T);
    pub const F: Action = k(KC::Y);
    pub const G: Action = k(KC::U);
    pub const C: Action = k(KC::I);
    pub const R: Action = k(KC::O);
    pub const L: Action = k(KC::P);

    pub const A: Action = k(KC::A);
    pub const O: Action = k(KC::S);
    pub const E: Action = k(KC::D);
    pub const U: Action = k(KC::F);
    pub const I: Action = k(KC::G);
    pub const D: Action = k(KC::H);
    pub const H: Action = k(KC::J);
    pub const T: Action = k(KC::K);
    pub const N: Action = k(KC::L);
    pub const S: Action = k(KC::SColon);

    pub const SCLN: Action = k(KC::Z);
    pub const Q: Action = k(KC::X);
    pub const J: Action = k(KC::C);
    pub const K: Action = k(KC::V);
    pub const X: Action = k(KC::B);
    pub const B: Action = k(KC::N);
    pub const M: Action = k(KC::M);
    pub const W: Action = k(KC::Comma);
    pub const V: Action = k(KC::Dot);
    pub const Z: Action = k(KC::Slash);

    pub const N0: Action = k(KC::Kb0);
    pub const N1: Action = k(KC::Kb1);
    pub const N2: Action = k(KC::Kb2);
    pub const N3: Action = k(KC::Kb3);
    pub const N4: Action = k(KC::Kb4);
    pub const N5: Action = k(KC::Kb5);
    pub const N6: Action = k(KC::Kb6);
    pub const N7: Action = k(KC::Kb7);
    pub const N8: Action = k(KC::Kb8);
    pub const N9: Action = k(KC::Kb9);

    pub const LBRC: Action = k(KC::Minus);
    pub const RBRC: Action = k(KC::Equal);
    pub const SLSH: Action = k(KC::LBracket);
    pub const EQL: Action = k(KC::RBracket);
    pub const MINS: Action = k(KC::Quote);
    pub const BSLS: Action = k(KC::Bslash);

    pub const PIPE: Action = Action::MultipleKeyCodes(&[KC::LShift, KC::Bslash]);
    pub const AMPR: Action = Action::MultipleKeyCodes(&[KC::LShift, KC::Kb7]);
    pub const QUES: Action = Action::MultipleKeyCodes(&[KC::LShift, KC::LBracket]);
    pub const LPRN: Action = Action::MultipleKeyCodes(&[KC::LShift, KC::Kb9]);
    pub const RPRN: Action = Action::MultipleKeyCodes(&[KC::LShift, KC::Kb0]);
    pub const UNDS: Action = Action::MultipleKeyCodes(&[KC::LShift, KC::Quote]);
    pub const PLUS: Action = Action::MultipleKeyCodes(&[KC::LShift, KC::RBracket]);
    pub const LABK: Action = Action::MultipleKeyCodes(&[KC::LShift, KC::Comma]);
    pub const RABK: Action = Action::MultipleKeyCodes(&[KC::LShift, KC::Dot]);
}

#[rustfmt::skip]
pub static LAYERS: [LayerGrid; Layer::COUNT] = [
    /* Dvorak
     * ,-----------------------------------------.             ,-----------------------------------------.
     * | Esc  |   '  |   ,  |   .  |   P  |   Y  |             |   F  |   G  |   C  |   R  |   L  | Bksp |
     * |------+------+------+------+------+------|             |------+------+------+------+------+------|
     * | Tab  |   A  |   O  |   E  |   U  |   I  |             |   D  |   H  |   T  |   N  |   S  |      |
     * |------+------+------+------+------+------|             |------+------+------+------+------+------|
     * | Shift|   ;  |   Q  |   J  |   K  |   X  |             |   B  |   M  |   W  |   V  |   Z  |Shift |
     * |------+------+------+------+------+------+-------------+------+------+------+------+------+------|
     * | Ctrl | Alt  | GUI  | GUI  | EISU |Lower |Space |Enter |Raise | KANA | GUI  | GUI  |      |      |
     * `-------------------------------------------------------------------------------------------------'
     */
    [
        [k(KC::Escape), dv::QUOT, dv::COMM,   dv::DOT,    dv::P,   dv::Y,   XXXXXXX,     XXXXXXX,     dv::F,   dv::G,   dv::C,      dv::R,      dv::L,   k(KC::BSpace)],
        [k(KC::Tab),    dv::A,    dv::O,      dv::E,      dv::U,   dv::I,   XXXXXXX,     XXXXXXX,     dv::D,   dv::H,   dv::T,      dv::N,      dv::S,   _______],
        [k(KC::LShift), dv::SCLN, dv::Q,      dv::J,      dv::K,   dv::X,   XXXXXXX,     XXXXXXX,     dv::B,   dv::M,   dv::W,      dv::V,      dv::Z,   k(KC::RShift)],
        [k(KC::LCtrl),  k(KC::LAlt), k(KC::LGui), k(KC::LGui), EISU, LOWER, k(KC::Space), k(KC::Enter), RAISE,  KANA,    k(KC::RGui), k(KC::RGui), _______, _______],
    ],

    /* Eucalyn
     * ,-----------------------------------------.             ,-----------------------------------------.
     * | Esc  |   Q  |   W  |   ,  |   .  |   '  |             |   M  |   R  |   D  |   Y  |   P  | Bksp |
     * |------+------+------+------+------+------|             |------+------+------+------+------+------|
     * | Tab  |   A  |   O  |   E  |   U  |   I  |             |   G  |   T  |   K  |   S  |   N  |      |
     * |------+------+------+------+------+------|             |------+------+------+------+------+------|
     * | Shift|   Z  |   X  |   C  |   V  |   F  |             |   B  |   H  |   J  |   L  |   /  |Shift |
     * |------+------+------+------+------+------+-------------+------+------+------+------+------+------|
     * | Ctrl | Alt  | GUI  | GUI  | EISU |Lower |Space |Enter |Raise | KANA | GUI  | GUI  |      |      |
     * `-------------------------------------------------------------------------------------------------'
     */
    [
        [k(KC::Escape), dv::Q,    dv::W,      dv::COMM,   dv::DOT, dv::QUOT, XXXXXXX,    XXXXXXX,     dv::M,   dv::R,   dv::D,      dv::Y,      dv::P,    k(KC::BSpace)],
        [k(KC::Tab),    dv::A,    dv::O,      dv::E,      dv::U,   dv::I,    XXXXXXX,    XXXXXXX,     dv::G,   dv::T,   dv::K,      dv::S,      dv::N,    _______],
        [k(KC::LShift), dv::Z,    dv::X,      dv::C,      dv::V,   dv::F,    XXXXXXX,    XXXXXXX,     dv::B,   dv::H,   dv::J,      dv::L,      dv::SLSH, k(KC::RShift)],
        [k(KC::LCtrl),  k(KC::LAlt), k(KC::LGui), k(KC::LGui), EISU, LOWER,  k(KC::Space), k(KC::Enter), RAISE, KANA,    k(KC::RGui), k(KC::RGui), _______, _______],
    ],

    /* Lower
     * ,-----------------------------------------.             ,-----------------------------------------.
     * |      |   0  |   1  |   2  |   3  |  |   |             |   '  |   (  |   )  |   /  |   \  |      |
     * |------+------+------+------+------+------|             |------+------+------+------+------+------|
     * |      |   '  |   4  |   5  |   6  |  &   |             |   =  |   [  |   ]  |   _  |   -  |      |
     * |------+------+------+------+------+------|             |------+------+------+------+------+------|
     * |      |      |   7  |   8  |   9  |  ?   |             |   +  |   <  |   >  |      |      |      |
     * |------+------+------+------+------+------+-------------+------+------+------+------+------+------|
     * |      |      |      |      |      |      |      |      |      |      |      |      |      |      |
     * `-------------------------------------------------------------------------------------------------'
     */
    [
        [_______, dv::N0,   dv::N1,  dv::N2,  dv::N3,  dv::PIPE, XXXXXXX, XXXXXXX, dv::QUOT, dv::LPRN, dv::RPRN, dv::SLSH, dv::BSLS, _______],
        [_______, dv::QUOT, dv::N4,  dv::N5,  dv::N6,  dv::AMPR, XXXXXXX, XXXXXXX, dv::EQL,  dv::LBRC, dv::RBRC, dv::UNDS, dv::MINS, _______],
        [_______, _______,  dv::N7,  dv::N8,  dv::N9,  dv::QUES, XXXXXXX, XXXXXXX, dv::PLUS, dv::LABK, dv::RABK, _______,  _______,  _______],
        [_______, _______,  _______, _______, _______, _______,  _______, _______, _______,  _______,  _______,  _______,  _______,  _______],
    ],

    /* Raise
     * ,-----------------------------------------.             ,-----------------------------------------.
     * |      |   0  |   1  |   2  |   3  |      |             |      |      |  Up  |      |      |      |
     * |------+------+------+------+------+------|             |------+------+------+------+------+------|
     * |      |      |   4  |   5  |   6  |      |             |      | Left | Down | Right|      |      |
     * |------+------+------+------+------+------|             |------+------+------+------+------+------|
     * |      |      |   7  |   8  |   9  |      |             |      |      |      |      |      |      |
     * |------+------+------+------+------+------+-------------+------+------+------+------+------+------|
     * |      |      |      |      |      |      |      |      |      |      |      |      |      |      |
     * `-------------------------------------------------------------------------------------------------'
     */
    [
        [_______, dv::N0,  dv::N1,  dv::N2,  dv::N3,  _______, XXXXXXX, XXXXXXX, _______, _______,     k(KC::Up), _______, _______, _______],
        [_______, _______, dv::N4,  dv::N5,  dv::N6,  _______, XXXXXXX, XXXXXXX, _______, k(KC::Left), k(KC::Down), k(KC::Right), _______, _______],
        [_______, _______, dv::N7,  dv::N8,  dv::N9,  _______, XXXXXXX, XXXXXXX, _______, _______,     _______, _______, _______, _______],
        [_______, _______, _______, _______, _______, _______, _______, _______, _______, _______,     _______, _______, _______, _______],
    ],

    /* Adjust
     * ,-----------------------------------------.             ,------------------------------------------.
     * |Dvorak|      |      |      |      |      |             |      |      |      |      |      |Eucalyn|
     * |------+------+------+------+------+------|             |------+------+------+------+------+-------|
     * |      |      |      |      |      |      |             |      |      |      |      |      |       |
     * |------+------+------+------+------+------|             |------+------+------+------+------+-------|
     * |      |      |      |      |      |      |             |      |      |      |      |      |       |
     * |------+------+------+------+------+------+-------------+------+------+------+------+------+-------|
     * |      |      |      |      |      |      | Boot |      |      |      |      |      |      |       |
     * `--------------------------------------------------------------------------------------------------'
     */
    [
        [DVORAK,  _______, _______, _______, _______, _______, XXXXXXX, XXXXXXX, _______, _______, _______, _______, _______, EUCALYN],
        [_______, _______, _______, _______, _______, _______, XXXXXXX, XXXXXXX, _______, _______, _______, _______, _______, _______],
        [_______, _______, _______, _______, _______, _______, XXXXXXX, XXXXXXX, _______, _______, _______, _______, _______, _______],
        [_______, _______, _______, _______, _______, _______, BOOT,    _______, _______, _______, _______, _______, _______, _______],
    ],
];

/// Action at `(row, col)` on `layer`, or `None` outside the grid.
pub fn action(layer: Layer, row: u8, col: u8) -> Option<Action> {
    LAYERS[layer.index()]
        .get(row as usize)
        .and_then(|r| r.get(col as usize))
        .copied()
}
