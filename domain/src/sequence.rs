//! Redirect sequencing: entry → interstitial steps → final redirect.
//!
//! The sequence is stateless on the server. The current position travels in
//! the request path (`/s/<code>/<step>`), so any step URL can be opened
//! directly and waiting is enforced only by the client-side timer.

use crate::Code;

/// Policy values that shape the visitor sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SequencePolicy {
    /// Number of interstitial pages before the final redirect (at least 1).
    pub steps: u32,
    /// Client-side wait on each interstitial page.
    pub wait_seconds: u32,
    /// Auto-redirect delay on the final page.
    pub final_delay_ms: u32,
}

impl Default for SequencePolicy {
    fn default() -> Self {
        Self {
            steps: 1,
            wait_seconds: 20,
            final_delay_ms: 1200,
        }
    }
}

/// Position of a visitor in the sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Step(u32),
    Final,
}

impl Stage {
    /// Site-relative path serving this stage for `code`.
    pub fn path(&self, code: &Code) -> String {
        match self {
            Stage::Step(n) => format!("/s/{}/{}", code.as_str(), n),
            Stage::Final => format!("/final/{}", code.as_str()),
        }
    }
}

/// What to serve for a requested interstitial step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// Render a waiting page for `step` whose continue action leads to `next`.
    Wait {
        step: u32,
        next: Stage,
        wait_seconds: u32,
    },
    /// The step is past the end of the sequence.
    SkipToFinal,
}

impl SequencePolicy {
    /// First stage after the entry URL.
    pub fn entry(&self) -> Stage {
        Stage::Step(1)
    }

    pub fn advance(&self, step: u32) -> StepOutcome {
        let total = self.steps.max(1);
        if step > total {
            return StepOutcome::SkipToFinal;
        }
        let next = if step < total {
            Stage::Step(step + 1)
        } else {
            Stage::Final
        };
        StepOutcome::Wait {
            step,
            next,
            wait_seconds: self.wait_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code() -> Code {
        Code::new("abc123").unwrap()
    }

    #[test]
    fn paths() {
        assert_eq!(Stage::Step(1).path(&code()), "/s/abc123/1");
        assert_eq!(Stage::Final.path(&code()), "/final/abc123");
    }

    #[test]
    fn single_step_goes_straight_to_final() {
        let p = SequencePolicy::default();
        assert_eq!(p.entry(), Stage::Step(1));
        assert_eq!(
            p.advance(1),
            StepOutcome::Wait {
                step: 1,
                next: Stage::Final,
                wait_seconds: 20
            }
        );
        assert_eq!(p.advance(2), StepOutcome::SkipToFinal);
        assert_eq!(p.advance(u32::MAX), StepOutcome::SkipToFinal);
    }

    #[test]
    fn multi_step_chains_then_finishes() {
        let p = SequencePolicy {
            steps: 3,
            wait_seconds: 5,
            final_delay_ms: 0,
        };
        let nexts: Vec<_> = (1..=3)
            .map(|s| match p.advance(s) {
                StepOutcome::Wait { next, .. } => next,
                StepOutcome::SkipToFinal => panic!("step {s} should wait"),
            })
            .collect();
        assert_eq!(nexts, vec![Stage::Step(2), Stage::Step(3), Stage::Final]);
        assert_eq!(p.advance(4), StepOutcome::SkipToFinal);
    }

    #[test]
    fn zero_steps_behaves_like_one() {
        let p = SequencePolicy {
            steps: 0,
            ..SequencePolicy::default()
        };
        assert!(matches!(
            p.advance(1),
            StepOutcome::Wait {
                next: Stage::Final,
                ..
            }
        ));
    }
}
