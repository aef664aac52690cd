#![forbid(unsafe_code)]

//! Mouse button-state masks (mouse protocol version 2).
//!
//! Each button owns five bits: released, pressed, clicked, double-clicked,
//! triple-clicked. Button `b` starts at bit `(b - 1) * 5`; modifier and
//! position-report bits follow button 5.

use bitflags::bitflags;

const fn mask(button: u32, bits: u32) -> u32 {
    bits << ((button - 1) * 5)
}

const RELEASED: u32 = 0o01;
const PRESSED: u32 = 0o02;
const CLICKED: u32 = 0o04;
const DOUBLE_CLICKED: u32 = 0o10;
const TRIPLE_CLICKED: u32 = 0o20;

bitflags! {
    /// Button-state mask reported in a mouse event and passed to `mousemask`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MouseMask: u32 {
        const BUTTON1_RELEASED       = mask(1, RELEASED);
        const BUTTON1_PRESSED        = mask(1, PRESSED);
        const BUTTON1_CLICKED        = mask(1, CLICKED);
        const BUTTON1_DOUBLE_CLICKED = mask(1, DOUBLE_CLICKED);
        const BUTTON1_TRIPLE_CLICKED = mask(1, TRIPLE_CLICKED);

        const BUTTON2_RELEASED       = mask(2, RELEASED);
        const BUTTON2_PRESSED        = mask(2, PRESSED);
        const BUTTON2_CLICKED        = mask(2, CLICKED);
        const BUTTON2_DOUBLE_CLICKED = mask(2, DOUBLE_CLICKED);
        const BUTTON2_TRIPLE_CLICKED = mask(2, TRIPLE_CLICKED);

        const BUTTON3_RELEASED       = mask(3, RELEASED);
        const BUTTON3_PRESSED        = mask(3, PRESSED);
        const BUTTON3_CLICKED        = mask(3, CLICKED);
        const BUTTON3_DOUBLE_CLICKED = mask(3, DOUBLE_CLICKED);
        const BUTTON3_TRIPLE_CLICKED = mask(3, TRIPLE_CLICKED);

        const BUTTON4_RELEASED       = mask(4, RELEASED);
        const BUTTON4_PRESSED        = mask(4, PRESSED);
        const BUTTON4_CLICKED        = mask(4, CLICKED);
        const BUTTON4_DOUBLE_CLICKED = mask(4, DOUBLE_CLICKED);
        const BUTTON4_TRIPLE_CLICKED = mask(4, TRIPLE_CLICKED);

        const BUTTON5_RELEASED       = mask(5, RELEASED);
        const BUTTON5_PRESSED        = mask(5, PRESSED);
        const BUTTON5_CLICKED        = mask(5, CLICKED);
        const BUTTON5_DOUBLE_CLICKED = mask(5, DOUBLE_CLICKED);
        const BUTTON5_TRIPLE_CLICKED = mask(5, TRIPLE_CLICKED);

        const BUTTON_CTRL  = mask(6, 0o01);
        const BUTTON_SHIFT = mask(6, 0o02);
        const BUTTON_ALT   = mask(6, 0o04);
        const REPORT_MOUSE_POSITION = mask(6, 0o10);
    }
}

impl MouseMask {
    /// Every button and modifier bit, without position reports.
    pub const ALL_MOUSE_EVENTS: Self =
        Self::from_bits_retain(Self::REPORT_MOUSE_POSITION.bits() - 1);

    /// Bits belonging to one button (1-5); empty for other values.
    #[must_use]
    pub const fn button(button: u32) -> Self {
        if button == 0 || button > 5 {
            return Self::empty();
        }
        Self::from_bits_retain(mask(button, 0o37))
    }

    /// Build a mask from a native value of any integer width.
    ///
    /// Bits above the documented range are kept so a value read from native
    /// memory survives a round trip unchanged.
    #[must_use]
    pub const fn from_native(raw: u64) -> Self {
        Self::from_bits_retain(raw as u32)
    }
}

impl Default for MouseMask {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_bits_match_native_header() {
        assert_eq!(MouseMask::BUTTON1_RELEASED.bits(), 0x1);
        assert_eq!(MouseMask::BUTTON1_PRESSED.bits(), 0x2);
        assert_eq!(MouseMask::BUTTON2_PRESSED.bits(), 0x40);
        assert_eq!(MouseMask::BUTTON5_TRIPLE_CLICKED.bits(), 0x0100_0000);
        assert_eq!(MouseMask::BUTTON_CTRL.bits(), 0x0200_0000);
        assert_eq!(MouseMask::REPORT_MOUSE_POSITION.bits(), 0x1000_0000);
        assert_eq!(MouseMask::ALL_MOUSE_EVENTS.bits(), 0x0FFF_FFFF);
    }

    #[test]
    fn button_groups_do_not_overlap() {
        for a in 1..=5 {
            for b in (a + 1)..=5 {
                assert!(MouseMask::button(a).intersection(MouseMask::button(b)).is_empty());
            }
        }
        assert!(MouseMask::button(0).is_empty());
        assert!(MouseMask::button(6).is_empty());
    }

    #[test]
    fn native_values_round_trip() {
        let raw = u64::from(MouseMask::BUTTON1_PRESSED.bits());
        assert_eq!(MouseMask::from_native(raw), MouseMask::BUTTON1_PRESSED);
    }
}
