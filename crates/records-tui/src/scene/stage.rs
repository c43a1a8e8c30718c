/// Where the selected item is in its present/dismiss sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Idle,
    Lifting,
    Centering,
    Sliding,
    Revealed,
    Concealing,
    Returning,
}

/// What the controller observed this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StageInput {
    /// The item is (still) wanted as the selection.
    pub selected: bool,
    /// The transform reached this stage's target.
    pub arrived: bool,
    pub compact: bool,
}

impl Stage {
    pub fn advance(self, input: StageInput) -> Stage {
        let StageInput {
            selected,
            arrived,
            compact,
        } = input;

        match self {
            Stage::Idle if selected => Stage::Lifting,
            Stage::Idle => Stage::Idle,

            Stage::Lifting | Stage::Centering if !selected => Stage::Returning,
            Stage::Lifting if arrived => Stage::Centering,
            Stage::Centering if arrived && compact => Stage::Revealed,
            Stage::Centering if arrived => Stage::Sliding,

            Stage::Sliding | Stage::Revealed if !selected => Stage::Concealing,
            Stage::Sliding if arrived => Stage::Revealed,

            Stage::Concealing if arrived => Stage::Returning,
            Stage::Returning if arrived => Stage::Idle,

            stage => stage,
        }
    }

    /// Resting states in which a click may start or end a selection.
    pub fn is_neutral(self) -> bool {
        matches!(self, Stage::Idle | Stage::Revealed)
    }

    /// Drawn as the large centred sleeve rather than a row in the stack.
    pub fn is_presented(self) -> bool {
        matches!(
            self,
            Stage::Centering | Stage::Sliding | Stage::Revealed | Stage::Concealing
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::Lifting => "lifting",
            Stage::Centering => "centering",
            Stage::Sliding => "sliding",
            Stage::Revealed => "revealed",
            Stage::Concealing => "concealing",
            Stage::Returning => "returning",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Stage; 7] = [
        Stage::Idle,
        Stage::Lifting,
        Stage::Centering,
        Stage::Sliding,
        Stage::Revealed,
        Stage::Concealing,
        Stage::Returning,
    ];

    fn input(selected: bool, arrived: bool, compact: bool) -> StageInput {
        StageInput {
            selected,
            arrived,
            compact,
        }
    }

    /// Follow arrivals from Idle until the stage stops changing.
    fn run(selected: bool, compact: bool, from: Stage) -> Vec<Stage> {
        let mut stages = vec![from];
        let mut stage = from;
        for _ in 0..10 {
            let next = stage.advance(input(selected, true, compact));
            if next == stage {
                break;
            }
            stages.push(next);
            stage = next;
        }
        stages
    }

    #[test]
    fn test_desktop_present_sequence() {
        assert_eq!(
            run(true, false, Stage::Idle),
            [
                Stage::Idle,
                Stage::Lifting,
                Stage::Centering,
                Stage::Sliding,
                Stage::Revealed
            ]
        );
    }

    #[test]
    fn test_compact_skips_slide() {
        assert_eq!(
            run(true, true, Stage::Idle),
            [Stage::Idle, Stage::Lifting, Stage::Centering, Stage::Revealed]
        );
    }

    #[test]
    fn test_dismiss_sequence() {
        assert_eq!(
            run(false, false, Stage::Revealed),
            [
                Stage::Revealed,
                Stage::Concealing,
                Stage::Returning,
                Stage::Idle
            ]
        );
    }

    #[test]
    fn test_early_deselect() {
        let deselect = input(false, false, false);
        assert_eq!(Stage::Lifting.advance(deselect), Stage::Returning);
        assert_eq!(Stage::Centering.advance(deselect), Stage::Returning);
        assert_eq!(Stage::Sliding.advance(deselect), Stage::Concealing);
    }

    #[test]
    fn test_waits_for_arrival() {
        for stage in ALL {
            let next = stage.advance(input(stage != Stage::Concealing && stage != Stage::Returning, false, false));
            if stage == Stage::Idle {
                assert_eq!(next, Stage::Lifting);
            } else {
                assert_eq!(next, stage, "{} advanced before arriving", stage.label());
            }
        }
    }

    #[test]
    fn test_idle_and_revealed_are_stable() {
        assert_eq!(Stage::Idle.advance(input(false, true, false)), Stage::Idle);
        assert_eq!(Stage::Revealed.advance(input(true, true, false)), Stage::Revealed);
        assert_eq!(Stage::Revealed.advance(input(true, true, true)), Stage::Revealed);
    }
}
