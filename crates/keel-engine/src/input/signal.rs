use super::policy::InputPolicy;
use super::types::InputEventKind;

/// Logical state of a control after the most recent tick.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum SignalState {
    #[default]
    Up,
    Down,
    Held,
}

/// Per-control debounce record.
///
/// The record is level-sampled: each tick sees one raw level, so a full press and
/// release between two ticks is invisible.
#[derive(Debug, Clone, Default)]
pub struct InputSignal {
    /// Last level reported by the platform; `None` until the first sample.
    raw: Option<bool>,
    state: SignalState,
    held: bool,

    /// Time of the most recent down edge.
    down_ns: Option<u64>,
    /// Anchor of the repeat grid: the held transition, advanced in whole hold-frequency steps.
    repeat_ns: u64,
    down_count: u32,

    /// Pointer position at the most recent down edge (buttons only).
    down_position: Option<(f32, f32)>,

    /// Overrides the tracker-wide policy for this control.
    policy: Option<InputPolicy>,
}

impl InputSignal {
    pub fn raw(&self) -> Option<bool> {
        self.raw
    }

    pub fn state(&self) -> SignalState {
        self.state
    }

    pub fn is_down(&self) -> bool {
        self.state != SignalState::Up
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    pub fn down_count(&self) -> u32 {
        self.down_count
    }

    pub fn down_timestamp(&self) -> Option<u64> {
        self.down_ns
    }

    pub fn down_position(&self) -> Option<(f32, f32)> {
        self.down_position
    }

    pub fn policy(&self) -> Option<&InputPolicy> {
        self.policy.as_ref()
    }

    pub(crate) fn set_policy(&mut self, policy: Option<InputPolicy>) {
        self.policy = policy;
    }

    pub(crate) fn set_down_position(&mut self, position: Option<(f32, f32)>) {
        self.down_position = position;
    }

    /// Feeds one raw sample taken at `now`.
    ///
    /// `fallback` applies when the control has no policy of its own.
    pub(crate) fn step(
        &mut self,
        down: bool,
        now: u64,
        fallback: &InputPolicy,
    ) -> Option<InputEventKind> {
        let policy = self.policy.unwrap_or(*fallback);
        self.raw = Some(down);

        match (self.state, down) {
            (SignalState::Up, false) => None,

            (SignalState::Up, true) => {
                let repeat_press = self
                    .down_ns
                    .is_some_and(|prev| now.saturating_sub(prev) <= policy.double_press_delay_ns());
                self.down_count = if repeat_press {
                    self.down_count.saturating_add(1)
                } else {
                    1
                };
                self.down_ns = Some(now);
                self.held = false;
                self.state = SignalState::Down;
                Some(InputEventKind::Down {
                    down_count: self.down_count,
                })
            }

            (SignalState::Down, true) => {
                let threshold = policy.held_threshold_ns()?;
                let since_down = now.saturating_sub(self.down_ns.unwrap_or(now));
                if since_down < threshold {
                    return None;
                }
                self.held = true;
                self.repeat_ns = now;
                self.state = SignalState::Held;
                Some(InputEventKind::Held)
            }

            (SignalState::Held, true) => {
                let frequency = policy.hold_frequency_ns().max(1);
                let since = now.saturating_sub(self.repeat_ns);
                if since < frequency {
                    return None;
                }
                // Stay on the grid seeded at the held transition; one emission per tick.
                self.repeat_ns = now - since % frequency;
                Some(InputEventKind::Repeated)
            }

            (SignalState::Down | SignalState::Held, false) => {
                self.held = false;
                self.state = SignalState::Up;
                Some(InputEventKind::Up)
            }
        }
    }

    /// Forgets everything, including any per-control policy.
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const MS: u64 = 1_000_000;

    fn armed(threshold_ms: u64, frequency_ms: u64) -> InputPolicy {
        InputPolicy {
            hold_frequency: Duration::from_millis(frequency_ms),
            held_threshold: Some(Duration::from_millis(threshold_ms)),
            ..InputPolicy::default()
        }
    }

    // ── edges ─────────────────────────────────────────────────────────────

    #[test]
    fn unknown_raw_is_treated_as_up() {
        let mut s = InputSignal::default();
        assert_eq!(s.raw(), None);
        let ev = s.step(true, 0, &InputPolicy::default());
        assert_eq!(ev, Some(InputEventKind::Down { down_count: 1 }));
        assert_eq!(s.raw(), Some(true));
    }

    #[test]
    fn first_sample_released_emits_nothing() {
        let mut s = InputSignal::default();
        assert_eq!(s.step(false, 0, &InputPolicy::default()), None);
        assert_eq!(s.state(), SignalState::Up);
    }

    #[test]
    fn release_emits_up_and_keeps_count() {
        let p = InputPolicy::default();
        let mut s = InputSignal::default();
        s.step(true, 0, &p);
        assert_eq!(s.step(false, 10 * MS, &p), Some(InputEventKind::Up));
        assert_eq!(s.down_count(), 1);
        assert_eq!(s.down_timestamp(), Some(0));
        assert!(!s.is_down());
    }

    #[test]
    fn steady_down_without_threshold_stays_quiet() {
        let p = InputPolicy::default();
        let mut s = InputSignal::default();
        s.step(true, 0, &p);
        for t in 1..100 {
            assert_eq!(s.step(true, t * 1_000 * MS, &p), None);
        }
        assert!(!s.is_held());
    }

    // ── multi-press ───────────────────────────────────────────────────────

    #[test]
    fn down_inside_delay_counts_double() {
        let p = InputPolicy::default();
        let mut s = InputSignal::default();
        s.step(true, 0, &p);
        s.step(false, 50 * MS, &p);
        let ev = s.step(true, 200 * MS - 1, &p);
        assert_eq!(ev, Some(InputEventKind::Down { down_count: 2 }));
    }

    #[test]
    fn down_exactly_at_delay_still_counts() {
        let p = InputPolicy::default();
        let mut s = InputSignal::default();
        s.step(true, 0, &p);
        s.step(false, 50 * MS, &p);
        assert_eq!(
            s.step(true, 200 * MS, &p),
            Some(InputEventKind::Down { down_count: 2 })
        );
    }

    #[test]
    fn down_after_delay_resets_count() {
        let p = InputPolicy::default();
        let mut s = InputSignal::default();
        s.step(true, 0, &p);
        s.step(false, 50 * MS, &p);
        let ev = s.step(true, 200 * MS + 1, &p);
        assert_eq!(ev, Some(InputEventKind::Down { down_count: 1 }));
    }

    #[test]
    fn triple_press() {
        let p = InputPolicy::default();
        let mut s = InputSignal::default();
        let mut last = None;
        for i in 0..3 {
            last = s.step(true, i * 100 * MS, &p);
            s.step(false, i * 100 * MS + 20 * MS, &p);
        }
        assert_eq!(last, Some(InputEventKind::Down { down_count: 3 }));
    }

    // ── hold & repeat ─────────────────────────────────────────────────────

    #[test]
    fn held_fires_once_at_threshold() {
        let p = armed(300, 50);
        let mut s = InputSignal::default();
        s.step(true, 0, &p);
        assert_eq!(s.step(true, 299 * MS, &p), None);
        assert_eq!(s.step(true, 300 * MS, &p), Some(InputEventKind::Held));
        assert!(s.is_held());
        assert_eq!(s.state(), SignalState::Held);
    }

    #[test]
    fn three_repeats_over_three_intervals() {
        let p = armed(100, 40);
        let mut s = InputSignal::default();
        s.step(true, 0, &p);
        assert_eq!(s.step(true, 100 * MS, &p), Some(InputEventKind::Held));

        let mut repeats = 0;
        let end = 100 * MS + 3 * 40 * MS + MS / 2;
        let mut t = 100 * MS;
        while t < end {
            t += 5 * MS;
            if s.step(true, t.min(end), &p) == Some(InputEventKind::Repeated) {
                repeats += 1;
            }
        }
        assert_eq!(repeats, 3);
    }

    #[test]
    fn three_repeats_with_uneven_sampling() {
        let p = armed(100, 40);
        let end = 100 * MS + 3 * 40 * MS + MS / 2;

        // Spacings that do not divide the frequency, plus a jittered pattern.
        for pattern in [&[7u64][..], &[13], &[3, 11, 29, 6, 17]] {
            let mut s = InputSignal::default();
            s.step(true, 0, &p);
            assert_eq!(s.step(true, 100 * MS, &p), Some(InputEventKind::Held));

            let mut repeats = 0;
            let mut t = 100 * MS;
            for step in pattern.iter().cycle() {
                if t >= end {
                    break;
                }
                t = (t + step * MS).min(end);
                if s.step(true, t, &p) == Some(InputEventKind::Repeated) {
                    repeats += 1;
                }
            }
            assert_eq!(repeats, 3, "pattern {pattern:?}");
        }
    }

    #[test]
    fn slow_ticks_never_burst_repeats() {
        let p = armed(0, 10);
        let mut s = InputSignal::default();
        s.step(true, 0, &p);
        s.step(true, 0, &p);
        assert_eq!(s.step(true, 55 * MS, &p), Some(InputEventKind::Repeated));
        assert_eq!(s.step(true, 56 * MS, &p), None);
        assert_eq!(s.step(true, 60 * MS, &p), Some(InputEventKind::Repeated));
    }

    #[test]
    fn release_from_held_clears_held() {
        let p = armed(10, 10);
        let mut s = InputSignal::default();
        s.step(true, 0, &p);
        s.step(true, 10 * MS, &p);
        assert_eq!(s.step(false, 15 * MS, &p), Some(InputEventKind::Up));
        assert!(!s.is_held());
    }

    #[test]
    fn own_policy_wins_over_fallback() {
        let mut s = InputSignal::default();
        s.set_policy(Some(armed(0, 10)));
        s.step(true, 0, &InputPolicy::default());
        assert_eq!(
            s.step(true, MS, &InputPolicy::default()),
            Some(InputEventKind::Held)
        );
    }

    #[test]
    fn reset_clears_count_and_policy() {
        let p = InputPolicy::default();
        let mut s = InputSignal::default();
        s.set_policy(Some(armed(5, 5)));
        s.step(true, 0, &p);
        s.reset();
        assert_eq!(s.down_count(), 0);
        assert_eq!(s.raw(), None);
        assert!(s.policy().is_none());
    }
}
