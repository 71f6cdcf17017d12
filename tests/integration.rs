//! Integration tests for the host-testable engine: scripted key state in,
//! recorded HID reports out.

use matrix_hid::hid::keyboard::{keycode, modifier};
use matrix_hid::hid::{ConsumerReport, HidReport, KeyboardReport, MouseReport, ReportId};
use matrix_hid::injector::MacroState;
use matrix_hid::keymap::{Direction, DEFAULT_KEYMAP};
use matrix_hid::{Engine, Error, HidTransport, KeyMask, KeyScanner};

/// Scanner that reports whatever the test says is held.
struct Held(KeyMask);

impl KeyScanner for Held {
    fn scan(&mut self) -> KeyMask {
        self.0
    }
}

#[derive(Default)]
struct Recorder {
    busy: bool,
    suspended: bool,
    wakeups: usize,
    sent: Vec<HidReport>,
}

impl HidTransport for Recorder {
    fn is_ready(&self) -> bool {
        !self.busy
    }

    fn is_suspended(&self) -> bool {
        self.suspended
    }

    fn remote_wakeup(&mut self) {
        self.wakeups += 1;
    }

    fn send_keyboard(&mut self, report: &KeyboardReport) -> Result<(), Error> {
        self.sent.push(HidReport::Keyboard(*report));
        Ok(())
    }

    fn send_mouse(&mut self, report: &MouseReport) -> Result<(), Error> {
        self.sent.push(HidReport::Mouse(*report));
        Ok(())
    }

    fn send_consumer(&mut self, report: &ConsumerReport) -> Result<(), Error> {
        self.sent.push(HidReport::Consumer(*report));
        Ok(())
    }
}

fn dir(d: Direction) -> KeyMask {
    DEFAULT_KEYMAP.direction_mask(d)
}

/// Deliver the completion for the most recently sent report.
fn complete_last(engine: &mut Engine, keys: &mut Held, usb: &mut Recorder) {
    let report = *usb.sent.last().expect("nothing was sent");
    let mut buf = [0u8; 8];
    let n = report.serialize(&mut buf);
    engine.on_report_sent(report.id() as u8, &buf[..n], keys, usb);
}

/// Tick once, then acknowledge reports until the chain ends.
fn tick_and_drain(engine: &mut Engine, now: u32, keys: &mut Held, usb: &mut Recorder) {
    engine.tick(now, keys, usb);
    while engine.in_flight().is_some() {
        complete_last(engine, keys, usb);
    }
}

const ALT_TAB: KeyboardReport = KeyboardReport::chord(modifier::LEFT_ALT, keycode::TAB);

// ═══════════════════════════════════════════════════════════════════════════
// End-to-end scenarios
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn right_double_tap_injects_alt_tab_then_releases() {
    let mut engine = Engine::default();
    let mut usb = Recorder::default();
    let mut keys = Held(KeyMask::EMPTY);

    // [0, RIGHT, 0 ...] with acknowledgements in between.
    tick_and_drain(&mut engine, 0, &mut keys, &mut usb);
    keys.0 = dir(Direction::Right);
    tick_and_drain(&mut engine, 10, &mut keys, &mut usb);
    keys.0 = KeyMask::EMPTY;
    for t in (20..160).step_by(10) {
        tick_and_drain(&mut engine, t, &mut keys, &mut usb);
    }
    assert_eq!(engine.macro_state(), MacroState::Idle);

    // Second RIGHT, 150 ms after the first.
    keys.0 = dir(Direction::Right);
    usb.sent.clear();
    engine.tick(160, &mut keys, &mut usb);
    assert_eq!(engine.macro_state(), MacroState::AwaitingPress(ALT_TAB));
    assert_eq!(usb.sent, [HidReport::Keyboard(ALT_TAB)]);

    // Notification 1: the chord reached the host; the chain goes on to
    // the pointer, which still sees RIGHT held.
    complete_last(&mut engine, &mut keys, &mut usb);
    assert_eq!(engine.macro_state(), MacroState::AwaitingRelease(ALT_TAB));
    assert!(matches!(usb.sent.last(), Some(HidReport::Mouse(m)) if m.x == 4));
    complete_last(&mut engine, &mut keys, &mut usb);
    assert_eq!(engine.in_flight(), None);

    // Next tick keeps reporting the chord on the keyboard profile.
    usb.sent.clear();
    engine.tick(170, &mut keys, &mut usb);
    assert_eq!(usb.sent, [HidReport::Keyboard(ALT_TAB)]);

    // Notification 2: release goes out at once and the chain stops there.
    complete_last(&mut engine, &mut keys, &mut usb);
    assert_eq!(
        usb.sent,
        [HidReport::Keyboard(ALT_TAB), HidReport::Keyboard(KeyboardReport::empty())]
    );
    assert_eq!(engine.macro_state(), MacroState::Idle);
    assert_eq!(engine.in_flight(), Some(ReportId::Keyboard));

    // Once the release lands, the chain picks up the held pointer key.
    complete_last(&mut engine, &mut keys, &mut usb);
    assert!(matches!(usb.sent.last(), Some(HidReport::Mouse(m)) if m.x == 4));
    assert_eq!(engine.macro_state(), MacroState::Idle);
}

#[test]
fn holding_up_for_120_ticks_follows_velocity_steps() {
    let mut engine = Engine::default();
    let mut usb = Recorder::default();
    let mut keys = Held(dir(Direction::Up));

    let mut trace = Vec::new();
    for tick in 0..120u32 {
        usb.sent.clear();
        tick_and_drain(&mut engine, tick * 10, &mut keys, &mut usb);
        match usb.sent.first() {
            Some(HidReport::Mouse(m)) => trace.push(-m.y),
            other => panic!("tick {}: expected mouse report, got {:?}", tick, other),
        }
    }

    for (tick, &step) in trace.iter().enumerate() {
        let expected = match tick {
            0..=19 => 4,
            20..=49 => 8,
            50..=99 => 12,
            _ => 18,
        };
        assert_eq!(step, expected, "tick {}", tick);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Properties
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn slow_double_tap_does_not_arm() {
    let mut engine = Engine::default();
    let mut usb = Recorder::default();
    let mut keys = Held(dir(Direction::Right));

    tick_and_drain(&mut engine, 0, &mut keys, &mut usb);
    keys.0 = KeyMask::EMPTY;
    tick_and_drain(&mut engine, 10, &mut keys, &mut usb);
    keys.0 = dir(Direction::Right);
    tick_and_drain(&mut engine, 210, &mut keys, &mut usb);
    assert_eq!(engine.macro_state(), MacroState::Idle);
    assert!(!usb.sent.contains(&HidReport::Keyboard(ALT_TAB)));
}

#[test]
fn up_double_tap_is_not_a_trigger() {
    let mut engine = Engine::default();
    let mut usb = Recorder::default();
    let mut keys = Held(dir(Direction::Up));

    tick_and_drain(&mut engine, 0, &mut keys, &mut usb);
    keys.0 = KeyMask::EMPTY;
    tick_and_drain(&mut engine, 10, &mut keys, &mut usb);
    keys.0 = dir(Direction::Up);
    tick_and_drain(&mut engine, 20, &mut keys, &mut usb);
    assert_eq!(engine.macro_state(), MacroState::Idle);
}

#[test]
fn armed_injector_ignores_further_double_taps() {
    let mut engine = Engine::default();
    let mut usb = Recorder {
        busy: true,
        ..Recorder::default()
    };
    let mut keys = Held(KeyMask::EMPTY);

    // Nothing can be sent, so the chord stays armed while the user keeps
    // double tapping LEFT.
    let mut t = 0;
    keys.0 = dir(Direction::Right);
    engine.tick(t, &mut keys, &mut usb);
    for _ in 0..2 {
        t += 10;
        keys.0 = KeyMask::EMPTY;
        engine.tick(t, &mut keys, &mut usb);
        t += 10;
        keys.0 = dir(Direction::Right);
        engine.tick(t, &mut keys, &mut usb);
    }
    assert_eq!(engine.macro_state(), MacroState::AwaitingPress(ALT_TAB));

    for _ in 0..5 {
        t += 10;
        keys.0 = KeyMask::EMPTY;
        engine.tick(t, &mut keys, &mut usb);
        t += 10;
        keys.0 = dir(Direction::Left);
        engine.tick(t, &mut keys, &mut usb);
    }
    assert_eq!(engine.macro_state(), MacroState::AwaitingPress(ALT_TAB));
    assert!(usb.sent.is_empty());
}

#[test]
fn steady_key_state_is_reported_once() {
    let mut engine = Engine::default();
    let mut usb = Recorder::default();
    let a = KeyMask::bit(30);
    let mut keys = Held(a);

    for t in (0..50).step_by(10) {
        tick_and_drain(&mut engine, t, &mut keys, &mut usb);
    }
    assert_eq!(usb.sent, [HidReport::Keyboard(KeyboardReport::chord(0, keycode::A))]);

    keys.0 = KeyMask::EMPTY;
    for t in (50..100).step_by(10) {
        tick_and_drain(&mut engine, t, &mut keys, &mut usb);
    }
    assert_eq!(usb.sent.len(), 2);
    assert_eq!(usb.sent[1], HidReport::Keyboard(KeyboardReport::empty()));
    assert_eq!(engine.macro_state(), MacroState::Idle);
}

#[test]
fn pointer_release_sends_no_idle_mouse_report() {
    let mut engine = Engine::default();
    let mut usb = Recorder::default();
    let mut keys = Held(dir(Direction::Up));

    tick_and_drain(&mut engine, 0, &mut keys, &mut usb);
    assert!(matches!(usb.sent.as_slice(), [HidReport::Mouse(m)] if m.y == -4));

    usb.sent.clear();
    keys.0 = KeyMask::EMPTY;
    tick_and_drain(&mut engine, 10, &mut keys, &mut usb);
    tick_and_drain(&mut engine, 20, &mut keys, &mut usb);
    assert!(usb.sent.is_empty());
}

#[test]
fn button_release_sends_one_idle_mouse_report() {
    let mut engine = Engine::default();
    let mut usb = Recorder::default();
    // Row 0, column 4: left button.
    let mut keys = Held(KeyMask::bit(4));

    tick_and_drain(&mut engine, 0, &mut keys, &mut usb);
    assert!(matches!(usb.sent.as_slice(), [HidReport::Mouse(m)] if m.buttons != 0));

    usb.sent.clear();
    keys.0 = KeyMask::EMPTY;
    for t in (10..50).step_by(10) {
        tick_and_drain(&mut engine, t, &mut keys, &mut usb);
    }
    assert_eq!(usb.sent, [HidReport::Mouse(MouseReport::empty())]);
}

#[test]
fn chain_stops_after_last_profile() {
    let mut engine = Engine::default();
    let mut usb = Recorder::default();
    // A letter, a pointer direction and a media key: all three profiles.
    let mut keys = Held(KeyMask::bit(30) | dir(Direction::Down) | KeyMask::bit(56));

    engine.tick(0, &mut keys, &mut usb);
    for _ in 0..10 {
        complete_last(&mut engine, &mut keys, &mut usb);
    }
    let ids: Vec<ReportId> = usb.sent.iter().map(|r| r.id()).collect();
    assert_eq!(ids, [ReportId::Keyboard, ReportId::Mouse, ReportId::Consumer]);
    assert_eq!(engine.in_flight(), None);
}

#[test]
fn chain_skips_profiles_with_nothing_new() {
    let mut engine = Engine::default();
    let mut usb = Recorder::default();
    let mut keys = Held(KeyMask::bit(57));

    tick_and_drain(&mut engine, 0, &mut keys, &mut usb);
    assert_eq!(usb.sent, [HidReport::Consumer(ConsumerReport::new(0x00CD))]);
}

#[test]
fn chain_uses_state_at_completion_time() {
    let mut engine = Engine::default();
    let mut usb = Recorder::default();
    let mut keys = Held(KeyMask::bit(30));

    engine.tick(0, &mut keys, &mut usb);
    // The pointer key goes down between the tick and the completion.
    keys.0 = KeyMask::bit(30) | dir(Direction::Left);
    complete_last(&mut engine, &mut keys, &mut usb);
    assert!(matches!(usb.sent.last(), Some(HidReport::Mouse(m)) if m.x == -4));
}

#[test]
fn suspended_bus_wakes_instead_of_sending() {
    let mut engine = Engine::default();
    let mut usb = Recorder {
        suspended: true,
        ..Recorder::default()
    };
    let mut keys = Held(KeyMask::EMPTY);

    engine.tick(0, &mut keys, &mut usb);
    assert_eq!(usb.wakeups, 0);

    keys.0 = KeyMask::bit(30);
    engine.tick(10, &mut keys, &mut usb);
    assert_eq!(usb.wakeups, 1);
    assert!(usb.sent.is_empty());

    // Once resumed, the held key is reported.
    usb.suspended = false;
    engine.tick(20, &mut keys, &mut usb);
    assert_eq!(usb.sent, [HidReport::Keyboard(KeyboardReport::chord(0, keycode::A))]);
}

#[test]
fn busy_transport_retries_next_tick() {
    let mut engine = Engine::default();
    let mut usb = Recorder {
        busy: true,
        ..Recorder::default()
    };
    let mut keys = Held(KeyMask::bit(30));

    engine.tick(0, &mut keys, &mut usb);
    assert!(usb.sent.is_empty());
    assert_eq!(engine.in_flight(), None);

    usb.busy = false;
    engine.tick(10, &mut keys, &mut usb);
    assert_eq!(usb.sent, [HidReport::Keyboard(KeyboardReport::chord(0, keycode::A))]);
}

#[test]
fn stale_or_unknown_completions_are_ignored() {
    let mut engine = Engine::default();
    let mut usb = Recorder::default();
    let mut keys = Held(KeyMask::bit(30) | dir(Direction::Down));

    engine.tick(0, &mut keys, &mut usb);
    assert_eq!(usb.sent.len(), 1);

    engine.on_report_sent(ReportId::Mouse as u8, &[0; 5], &mut keys, &mut usb);
    engine.on_report_sent(9, &[], &mut keys, &mut usb);
    assert_eq!(usb.sent.len(), 1);
    assert_eq!(engine.in_flight(), Some(ReportId::Keyboard));
}

#[test]
fn poll_gates_ticks_to_the_interval() {
    let mut engine = Engine::default();
    let mut usb = Recorder::default();
    let mut keys = Held(KeyMask::EMPTY);

    let ran: Vec<u32> = (0..35)
        .filter(|&now| engine.poll(now, &mut keys, &mut usb))
        .collect();
    assert_eq!(ran, [0, 10, 20, 30]);
}

#[test]
fn presses_are_logged_in_history() {
    let mut engine = Engine::default();
    let mut usb = Recorder::default();
    let mut keys = Held(KeyMask::EMPTY);

    for (i, key) in [30usize, 31, 32].into_iter().enumerate() {
        keys.0 = KeyMask::bit(key);
        tick_and_drain(&mut engine, i as u32 * 20, &mut keys, &mut usb);
        keys.0 = KeyMask::EMPTY;
        tick_and_drain(&mut engine, i as u32 * 20 + 10, &mut keys, &mut usb);
    }
    let logged: Vec<(u32, u8)> = engine.history().map(|e| (e.t_ms, e.key)).collect();
    assert_eq!(logged, [(0, 30), (20, 31), (40, 32)]);
}
