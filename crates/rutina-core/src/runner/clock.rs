//! Wall-clock anchor for elapsed-time accounting.

use serde::{Deserialize, Serialize};

/// Tracks a wall-clock anchor and doles out elapsed whole seconds.
///
/// Armed means "time is accruing since this epoch-millisecond". Observing
/// consumes the whole seconds since the anchor and moves the anchor forward
/// by exactly the consumed amount, so sub-second remainders carry over to
/// the next observation instead of being dropped. Over any run of
/// observations the total consumed equals the floor of the real elapsed
/// seconds, whether the host ticks every second or comes back from a long
/// suspension in one jump.
///
/// The anchor serializes with its owner, which is what lets a run cross a
/// process restart and still count the downtime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElapsedClock {
    #[serde(default)]
    anchor_ms: Option<u64>,
}

impl ElapsedClock {
    pub fn armed(&self) -> bool {
        self.anchor_ms.is_some()
    }

    /// Start accruing from `now_ms`. Re-arming an armed clock keeps the
    /// older anchor so no elapsed time is lost between commands.
    pub fn arm_at(&mut self, now_ms: u64) {
        if self.anchor_ms.is_none() {
            self.anchor_ms = Some(now_ms);
        }
    }

    /// Stop accruing and forget the anchor. Time until the next arm
    /// contributes nothing.
    pub fn clear(&mut self) {
        self.anchor_ms = None;
    }

    /// Consume the whole seconds elapsed since the anchor.
    ///
    /// An unarmed clock arms itself at `now_ms` and reports zero. A wall
    /// clock that moved backwards also reports zero and re-anchors at
    /// `now_ms`; negative elapsed time is never applied.
    pub fn observe_secs_at(&mut self, now_ms: u64) -> u64 {
        let Some(anchor) = self.anchor_ms else {
            self.anchor_ms = Some(now_ms);
            return 0;
        };
        if now_ms < anchor {
            self.anchor_ms = Some(now_ms);
            return 0;
        }
        let secs = (now_ms - anchor) / 1000;
        if secs > 0 {
            self.anchor_ms = Some(anchor + secs * 1000);
        }
        secs
    }
}
