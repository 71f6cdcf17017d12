//! The input engine: everything between the key matrix and the HID
//! transport, as one owned aggregate.
//!
//! Two entry points drive it, and both take `&mut self`:
//!
//! - [`Engine::poll`] / [`Engine::tick`]: scan, track, detect gestures,
//!   then start a report chain.
//! - [`Engine::on_report_sent`]: the transport finished a report; release
//!   a macro or continue the chain with the next profile.
//!
//! The caller serializes the two. On target that is a single task that
//! selects between the poll ticker and the completion queue.

use crate::chain::{HidTransport, ReportChain};
use crate::config::{DOUBLE_TAP_WINDOW_MS, POLL_INTERVAL_MS};
use crate::gesture::{GestureDetector, KeyEvent};
use crate::hid::{HidReport, KeyboardReport, ReportId};
use crate::injector::{MacroAction, MacroEvent, MacroInjector, MacroState, MacroTable, DEFAULT_MACROS};
use crate::keymap::{Keymap, DEFAULT_KEYMAP};
use crate::matrix::{KeyMask, KeyScanner};
use crate::report::{consumer_report, keyboard_report, mouse_report};
use crate::timer::PollTimer;
use crate::tracker::KeyStateTracker;

pub struct Engine {
    keymap: Keymap,
    tracker: KeyStateTracker,
    gestures: GestureDetector,
    injector: MacroInjector,
    chain: ReportChain,
    timer: PollTimer,
}

impl Engine {
    pub fn new(keymap: Keymap, macros: MacroTable) -> Self {
        Self {
            keymap,
            tracker: KeyStateTracker::new(),
            gestures: GestureDetector::new(DOUBLE_TAP_WINDOW_MS),
            injector: MacroInjector::new(macros),
            chain: ReportChain::new(),
            timer: PollTimer::new(POLL_INTERVAL_MS),
        }
    }

    /// Run a tick if one is due at `now` (monotonic ms). Returns whether it
    /// ran.
    pub fn poll<S, T>(&mut self, now: u32, scanner: &mut S, transport: &mut T) -> bool
    where
        S: KeyScanner,
        T: HidTransport,
    {
        if !self.timer.due(now) {
            return false;
        }
        self.tick(now, scanner, transport);
        true
    }

    /// One poll tick, unconditionally.
    pub fn tick<S, T>(&mut self, now: u32, scanner: &mut S, transport: &mut T)
    where
        S: KeyScanner,
        T: HidTransport,
    {
        let raw = scanner.scan();
        let edges = self.tracker.update(raw);

        for gesture in self.gestures.observe(edges.pressed, now, &self.keymap) {
            if self.injector.handle(MacroEvent::Gesture(gesture)) == MacroAction::Armed {
                info!("macro armed by {}", gesture);
            }
        }

        if transport.is_suspended() {
            if !raw.is_empty() {
                info!("bus suspended with keys down, requesting wakeup");
                transport.remote_wakeup();
            }
            return;
        }

        self.send_from(Some(ReportId::Keyboard), raw, transport);
    }

    /// Completion of the report `report_id` carrying `payload` (report ID
    /// byte not included).
    pub fn on_report_sent<S, T>(&mut self, report_id: u8, payload: &[u8], scanner: &mut S, transport: &mut T)
    where
        S: KeyScanner,
        T: HidTransport,
    {
        let Some(id) = ReportId::from_u8(report_id) else {
            warn!("completion for unknown report id {}", report_id);
            return;
        };
        if !self.chain.complete(id) {
            trace!("stale completion for {} ignored", id);
            return;
        }

        if self.injector.handle(MacroEvent::Sent { id, payload }) == MacroAction::SendRelease {
            info!("macro released");
            self.chain.send(transport, HidReport::Keyboard(KeyboardReport::empty()));
            return;
        }

        // Continue with what is held now, not what was held at tick time.
        let mask = scanner.scan();
        self.send_from(id.next(), mask, transport);
    }

    /// Send the first profile from `start` onward that has something new.
    fn send_from<T: HidTransport>(&mut self, start: Option<ReportId>, mask: KeyMask, transport: &mut T) {
        let mut next = start;
        while let Some(id) = next {
            let (report, forced) = self.build(id, mask);
            if forced || self.chain.pending(&report) {
                self.chain.send(transport, report);
                return;
            }
            next = id.next();
        }
    }

    /// Report for profile `id`; `true` if it must go out even unchanged.
    fn build(&self, id: ReportId, mask: KeyMask) -> (HidReport, bool) {
        match id {
            ReportId::Keyboard => match self.injector.payload() {
                Some(chord) => (HidReport::Keyboard(chord), true),
                None => (HidReport::Keyboard(keyboard_report(mask, &self.keymap)), false),
            },
            ReportId::Mouse => {
                let report = mouse_report(mask, &self.keymap, |key| self.tracker.hold_ticks(key));
                (HidReport::Mouse(report), false)
            }
            ReportId::Consumer => (HidReport::Consumer(consumer_report(mask, &self.keymap)), false),
        }
    }

    pub fn macro_state(&self) -> MacroState {
        self.injector.state()
    }

    /// Recent presses, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &KeyEvent> {
        self.gestures.history()
    }

    pub fn in_flight(&self) -> Option<ReportId> {
        self.chain.in_flight()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(DEFAULT_KEYMAP, DEFAULT_MACROS)
    }
}
