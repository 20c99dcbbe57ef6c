use crate::play_data::{PlayCall, PlayRow};

pub const BUCKET_WIDTH: u8 = 5;

/// 5-yard field-position bin: 47 -> 45, 50 -> 50, 0 -> 0.
pub fn yard_bin(yardline_100: u8) -> u8 {
    (yardline_100 / BUCKET_WIDTH) * BUCKET_WIDTH
}

/// Distance-filtered view of the analysis dataset, split into the three
/// decision options.
#[derive(Debug, Default)]
pub struct SituationSlice<'a> {
    pub go: Vec<&'a PlayRow>,
    pub punt: Vec<&'a PlayRow>,
    pub field_goal: Vec<&'a PlayRow>,
}

impl<'a> SituationSlice<'a> {
    pub fn partition(dataset: &'a [PlayRow], ydstogo: u8) -> Self {
        let mut slice = Self::default();
        for play in dataset.iter().filter(|play| play.ydstogo == ydstogo) {
            match play.call {
                PlayCall::Pass | PlayCall::Run => slice.go.push(play),
                PlayCall::Punt => slice.punt.push(play),
                PlayCall::FieldGoal => slice.field_goal.push(play),
            }
        }
        slice
    }
}

/// Every field-goal attempt in the dataset, regardless of distance to go.
/// The chart make-rate is computed over this set, not the distance slice.
pub fn field_goal_attempts(dataset: &[PlayRow]) -> Vec<&PlayRow> {
    dataset
        .iter()
        .filter(|play| play.call == PlayCall::FieldGoal)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(call: PlayCall, ydstogo: u8, yardline: u8) -> PlayRow {
        PlayRow {
            call,
            epa: 0.0,
            yardline_100: yardline,
            ydstogo,
            converted: false,
            failed: false,
            fg_made: false,
        }
    }

    #[test]
    fn bins_floor_to_five_yards() {
        assert_eq!(yard_bin(47), 45);
        assert_eq!(yard_bin(50), 50);
        assert_eq!(yard_bin(0), 0);
        assert_eq!(yard_bin(4), 0);
        assert_eq!(yard_bin(75), 75);
    }

    #[test]
    fn partition_is_disjoint_by_call() {
        let dataset = vec![
            play(PlayCall::Pass, 2, 40),
            play(PlayCall::Run, 2, 41),
            play(PlayCall::Punt, 2, 60),
            play(PlayCall::FieldGoal, 2, 25),
            play(PlayCall::Pass, 5, 40),
        ];

        let slice = SituationSlice::partition(&dataset, 2);
        assert_eq!(slice.go.len(), 2);
        assert_eq!(slice.punt.len(), 1);
        assert_eq!(slice.field_goal.len(), 1);
    }

    #[test]
    fn unmatched_distance_yields_empty_groups() {
        let dataset = vec![play(PlayCall::Pass, 2, 40)];
        let slice = SituationSlice::partition(&dataset, 9);
        assert!(slice.go.is_empty());
        assert!(slice.punt.is_empty());
        assert!(slice.field_goal.is_empty());
    }

    #[test]
    fn field_goal_attempts_ignore_distance() {
        let dataset = vec![
            play(PlayCall::FieldGoal, 2, 25),
            play(PlayCall::FieldGoal, 9, 30),
            play(PlayCall::Punt, 2, 60),
        ];
        assert_eq!(field_goal_attempts(&dataset).len(), 2);
    }
}
