//! Report synthesis: key state → per-profile payloads.
//!
//! Pure functions of the current mask, the keymap and (for the pointer)
//! the hold counters. Deciding whether a report is worth sending is left
//! to the chain driver.

use crate::hid::keyboard::KEYCODE_SLOTS;
use crate::hid::{ConsumerReport, KeyboardReport, MouseReport};
use crate::keymap::{Direction, KeyAction, Keymap};
use crate::matrix::KeyMask;
use crate::velocity::velocity;

/// Keyboard report for the held keys.
///
/// Keycodes fill slots in scan order; keys past the sixth are dropped for
/// this report. Modifier keys never take a slot.
pub fn keyboard_report(mask: KeyMask, keymap: &Keymap) -> KeyboardReport {
    let mut report = KeyboardReport::empty();
    let mut slot = 0;
    for key in mask.keys() {
        match keymap.action(key) {
            KeyAction::Modifier(bits) => report.modifier |= bits,
            KeyAction::Key(code) if slot < KEYCODE_SLOTS => {
                report.keycodes[slot] = code;
                slot += 1;
            }
            KeyAction::Key(_) => trace!("keyboard: rollover, key {} dropped", key),
            _ => {}
        }
    }
    report
}

/// Mouse report for the held pointer, button and scroll keys.
///
/// `hold_ticks` gives the hold counter of a key position; each held
/// direction contributes its own accelerated step.
pub fn mouse_report(mask: KeyMask, keymap: &Keymap, hold_ticks: impl Fn(usize) -> u32) -> MouseReport {
    let (mut x, mut y, mut wheel, mut pan) = (0i16, 0i16, 0i16, 0i16);
    let mut buttons = 0u8;

    for key in mask.keys() {
        match keymap.action(key) {
            KeyAction::Pointer(dir) => {
                let step = i16::from(velocity(hold_ticks(key)));
                match dir {
                    Direction::Up => y -= step,
                    Direction::Down => y += step,
                    Direction::Left => x -= step,
                    Direction::Right => x += step,
                }
            }
            KeyAction::Button(bits) => buttons |= bits,
            KeyAction::Scroll(dir) => match dir {
                Direction::Up => wheel += 1,
                Direction::Down => wheel -= 1,
                Direction::Left => pan -= 1,
                Direction::Right => pan += 1,
            },
            _ => {}
        }
    }

    MouseReport {
        buttons,
        x: clamp_axis(x),
        y: clamp_axis(y),
        wheel: clamp_axis(wheel),
        pan: clamp_axis(pan),
    }
}

/// Consumer report for the first held consumer key.
pub fn consumer_report(mask: KeyMask, keymap: &Keymap) -> ConsumerReport {
    mask.keys()
        .find_map(|key| match keymap.action(key) {
            KeyAction::Consumer(usage) => Some(ConsumerReport::new(usage)),
            _ => None,
        })
        .unwrap_or_default()
}

fn clamp_axis(v: i16) -> i8 {
    v.clamp(-127, 127) as i8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hid::consumer::usage;
    use crate::hid::keyboard::{keycode, modifier};
    use crate::hid::mouse::button;
    use crate::keymap::DEFAULT_KEYMAP;

    // Positions in the default layout.
    const KEY_Q: usize = 20;
    const KEY_A: usize = 30;
    const KEY_LSHIFT: usize = 40;
    const KEY_LALT: usize = 52;
    const KEY_CLICK: usize = 4;
    const KEY_WHEEL_UP: usize = 6;
    const KEY_VOL_UP: usize = 55;
    const KEY_MUTE: usize = 56;

    fn mask(keys: &[usize]) -> KeyMask {
        keys.iter().fold(KeyMask::EMPTY, |m, &k| m | KeyMask::bit(k))
    }

    #[test]
    fn keys_and_modifiers_split() {
        let report = keyboard_report(mask(&[KEY_Q, KEY_LSHIFT, KEY_LALT]), &DEFAULT_KEYMAP);
        assert_eq!(report.modifier, modifier::LEFT_SHIFT | modifier::LEFT_ALT);
        assert_eq!(report.keycodes, [keycode::Q, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn rollover_truncates_to_first_six_in_scan_order() {
        // Row 2 holds ten letter keys; all pressed.
        let held: std::vec::Vec<usize> = (20..30).collect();
        let report = keyboard_report(mask(&held), &DEFAULT_KEYMAP);
        assert_eq!(
            report.keycodes,
            [keycode::Q, keycode::W, keycode::E, keycode::R, keycode::T, keycode::Y]
        );
    }

    #[test]
    fn every_keycode_comes_from_a_held_key() {
        let held = mask(&[KEY_A, 10, 11, 12, 13, 14, 15, 16, 0, 3, KEY_LSHIFT]);
        let report = keyboard_report(held, &DEFAULT_KEYMAP);
        assert!(report.keycodes.iter().all(|&c| c != 0));
        for &code in report.keycodes.iter().filter(|&&c| c != 0) {
            assert!(held
                .keys()
                .any(|k| DEFAULT_KEYMAP.action(k) == KeyAction::Key(code)));
        }
    }

    #[test]
    fn pointer_keys_do_not_type() {
        let report = keyboard_report(mask(&[0, 1, 2, 3]), &DEFAULT_KEYMAP);
        assert_eq!(report, KeyboardReport::empty());
    }

    #[test]
    fn pointer_uses_accelerated_step_per_axis() {
        let right = DEFAULT_KEYMAP.direction_key(Direction::Right);
        let up = DEFAULT_KEYMAP.direction_key(Direction::Up);
        let hold = |key: usize| if key == right { 120 } else { 0 };
        let report = mouse_report(mask(&[right, up]), &DEFAULT_KEYMAP, hold);
        assert_eq!(report.x, 18);
        assert_eq!(report.y, -4);
        assert_eq!(report.buttons, 0);
    }

    #[test]
    fn opposite_directions_cancel() {
        let left = DEFAULT_KEYMAP.direction_key(Direction::Left);
        let right = DEFAULT_KEYMAP.direction_key(Direction::Right);
        let report = mouse_report(mask(&[left, right]), &DEFAULT_KEYMAP, |_| 30);
        assert!(report.is_idle());
    }

    #[test]
    fn click_and_wheel() {
        let report = mouse_report(mask(&[KEY_CLICK, KEY_WHEEL_UP]), &DEFAULT_KEYMAP, |_| 0);
        assert_eq!(report.buttons, button::LEFT);
        assert_eq!(report.wheel, 1);
        assert_eq!((report.x, report.y, report.pan), (0, 0, 0));
    }

    #[test]
    fn consumer_takes_first_held_usage() {
        assert_eq!(consumer_report(KeyMask::EMPTY, &DEFAULT_KEYMAP), ConsumerReport::empty());
        let report = consumer_report(mask(&[KEY_MUTE, KEY_VOL_UP]), &DEFAULT_KEYMAP);
        assert_eq!(report.usage, usage::VOLUME_UP);
    }

    #[test]
    fn axis_clamps_to_report_range() {
        assert_eq!(clamp_axis(500), 127);
        assert_eq!(clamp_axis(-500), -127);
        assert_eq!(clamp_axis(-12), -12);
    }
}
