use crate::types::{Landmark, MatchOutcome, MIN_LANDMARKS, SignReference};

/// Per-point distance below which an observed joint sits on the reference
/// pose, in normalized coordinate units. Strictly less-than: a distance of
/// exactly this value is a miss.
const MATCH_THRESHOLD: f32 = 0.1;

// The rule inspects exactly these two joints of the ~21-point hand.
const WRIST: usize = 0;
const INDEX_MCP: usize = 5;

/// Compares one frame's landmarks against an ordered table of per-letter
/// reference poses. The table order is part of the contract: the first
/// reference whose two distances both clear the threshold wins.
pub struct Matcher {
    references: Vec<SignReference>,
}

impl Matcher {
    pub fn new(references: Vec<SignReference>) -> Self {
        Self { references }
    }

    /// The built-in demo alphabet.
    pub fn builtin() -> Self {
        Self::new(vec![
            SignReference::new("A", Landmark::new(0.5, 0.8), Landmark::new(0.55, 0.7)),
            SignReference::new("B", Landmark::new(0.5, 0.8), Landmark::new(0.45, 0.7)),
        ])
    }

    pub fn references(&self) -> &[SignReference] {
        &self.references
    }

    /// Decide whether this frame shows a known letter.
    ///
    /// Sequences shorter than [`MIN_LANDMARKS`] yield `NoObservation`
    /// without any distance computation. Otherwise the wrist (index 0) and
    /// index-finger base (index 5) are compared against each reference in
    /// table order; both distances must be strictly below the threshold.
    pub fn match_observation(&self, landmarks: &[Landmark]) -> MatchOutcome {
        if landmarks.len() < MIN_LANDMARKS {
            return MatchOutcome::NoObservation;
        }

        let wrist = landmarks[WRIST];
        let index_base = landmarks[INDEX_MCP];

        for reference in &self.references {
            let d0 = distance(wrist, reference.points[0]);
            let d1 = distance(index_base, reference.points[1]);
            if d0 < MATCH_THRESHOLD && d1 < MATCH_THRESHOLD {
                return MatchOutcome::Match(reference.label.clone());
            }
        }

        MatchOutcome::NoMatch
    }
}

fn distance(a: Landmark, b: Landmark) -> f32 {
    (a.x - b.x).hypot(a.y - b.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// A full 21-point frame with everything except the two inspected
    /// joints parked at the origin.
    fn hand_with(wrist: Landmark, index_base: Landmark) -> Vec<Landmark> {
        let mut landmarks = vec![Landmark::new(0.0, 0.0); 21];
        landmarks[WRIST] = wrist;
        landmarks[INDEX_MCP] = index_base;
        landmarks
    }

    #[test]
    fn exact_reference_pose_matches_its_letter() {
        let matcher = Matcher::builtin();
        for reference in matcher.references() {
            let hand = hand_with(reference.points[0], reference.points[1]);
            assert_eq!(
                matcher.match_observation(&hand),
                MatchOutcome::Match(reference.label.clone()),
                "distance zero at both joints must match {}",
                reference.label
            );
        }
    }

    #[test]
    fn far_landmarks_match_nothing() {
        let matcher = Matcher::builtin();
        let hand = hand_with(Landmark::new(0.9, 0.9), Landmark::new(0.9, 0.9));
        assert_eq!(matcher.match_observation(&hand), MatchOutcome::NoMatch);
    }

    #[test]
    fn threshold_boundary_is_a_miss() {
        // 0.1 - 0.0 is exact in f32, so d0 lands exactly on the threshold;
        // d1 is zero. Strict less-than means no match.
        let matcher = Matcher::new(vec![SignReference::new(
            "X",
            Landmark::new(0.0, 0.8),
            Landmark::new(0.5, 0.5),
        )]);
        let hand = hand_with(Landmark::new(0.1, 0.8), Landmark::new(0.5, 0.5));
        assert_eq!(matcher.match_observation(&hand), MatchOutcome::NoMatch);
    }

    #[test]
    fn just_inside_threshold_matches() {
        let matcher = Matcher::new(vec![SignReference::new(
            "X",
            Landmark::new(0.0, 0.8),
            Landmark::new(0.5, 0.5),
        )]);
        let hand = hand_with(Landmark::new(0.099, 0.8), Landmark::new(0.5, 0.5));
        assert_eq!(
            matcher.match_observation(&hand),
            MatchOutcome::Match("X".into())
        );
    }

    #[test]
    fn first_reference_in_table_order_wins() {
        // Index 5 at x = 0.5 is within threshold of both 0.55 and 0.45.
        let ambiguous = hand_with(Landmark::new(0.5, 0.8), Landmark::new(0.5, 0.7));

        let matcher = Matcher::builtin();
        assert_eq!(
            matcher.match_observation(&ambiguous),
            MatchOutcome::Match("A".into())
        );

        let mut reversed = matcher.references().to_vec();
        reversed.reverse();
        let matcher = Matcher::new(reversed);
        assert_eq!(
            matcher.match_observation(&ambiguous),
            MatchOutcome::Match("B".into())
        );
    }

    #[test]
    fn near_a_frame_matches_a_not_b() {
        // Near-A frame: distances to A are ~0.022 and ~0.014, while B's
        // second distance is ~0.11 and out of range.
        let matcher = Matcher::builtin();
        let hand = hand_with(Landmark::new(0.52, 0.79), Landmark::new(0.56, 0.69));
        assert_eq!(
            matcher.match_observation(&hand),
            MatchOutcome::Match("A".into())
        );
    }

    #[test]
    fn short_sequence_is_no_observation() {
        let matcher = Matcher::builtin();
        let five_points = vec![Landmark::new(0.5, 0.8); 5];
        assert_eq!(
            matcher.match_observation(&five_points),
            MatchOutcome::NoObservation
        );
        assert_eq!(matcher.match_observation(&[]), MatchOutcome::NoObservation);
    }

    #[test]
    fn distance_is_euclidean() {
        let d = distance(Landmark::new(0.52, 0.79), Landmark::new(0.5, 0.8));
        assert_relative_eq!(d, 0.022360, epsilon = 1e-4);

        let d = distance(Landmark::new(0.56, 0.69), Landmark::new(0.45, 0.7));
        assert!(d >= MATCH_THRESHOLD, "B's second point must be out of range");
    }
}
