use crate::models::{ConsensusStatus, MemberProgress, RestaurantScore, SessionState, SwipeValue};

/// Minimum like fraction for the top pick to count as a decision
pub const DECISION_THRESHOLD: f64 = 0.6;

/// Summarize a ranked score list into a consensus percentage and a
/// decision-ready flag
///
/// `scores` must already be ranked (see [`super::aggregation::rank_scores`]).
/// The group is ready only when the top pick clears [`DECISION_THRESHOLD`]
/// and was liked by at least half the members, rounded up.
pub fn consensus_status(scores: &[RestaurantScore], member_count: usize) -> ConsensusStatus {
    if member_count == 0 {
        return ConsensusStatus::default();
    }

    let (top_score, top_likes) = scores
        .first()
        .map(|top| (top.score, top.like_count))
        .unwrap_or((0.0, 0));

    let majority = member_count.div_ceil(2);
    let decision_ready = top_score >= DECISION_THRESHOLD && top_likes >= majority;

    ConsensusStatus {
        consensus_score: (top_score.clamp(0.0, 1.0) * 100.0).round() as u8,
        decision_ready,
    }
}

/// Per-member swipe progress through a deck of `deck_size` cards
///
/// Neutral swipes count toward completion even though they never score.
pub fn member_progress(session: &SessionState, deck_size: usize) -> Vec<MemberProgress> {
    session
        .members
        .iter()
        .map(|member| {
            let (mut liked, mut disliked, mut neutral) = (0, 0, 0);
            if let Some(votes) = session.swipes.get(&member.id) {
                for vote in votes.values() {
                    match vote {
                        SwipeValue::Like => liked += 1,
                        SwipeValue::Dislike => disliked += 1,
                        SwipeValue::Neutral => neutral += 1,
                    }
                }
            }
            let total = liked + disliked + neutral;

            let progress = if deck_size > 0 {
                ((total as f64 / deck_size as f64) * 100.0).round().min(100.0) as u8
            } else {
                0
            };

            MemberProgress {
                id: member.id.clone(),
                name: member.name.clone(),
                total,
                liked,
                disliked,
                neutral,
                complete: total >= deck_size,
                progress,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cuisine, DistanceLevel, Member, PriceRange, Restaurant, SpiceLevel, SwipeMap};
    use chrono::Utc;
    use std::collections::{BTreeSet, HashMap};

    fn create_score(id: &str, like_count: usize, members: usize) -> RestaurantScore {
        RestaurantScore {
            restaurant: Restaurant {
                id: id.to_string(),
                name: id.to_string(),
                rating: 0.0,
                price_range: PriceRange::Budget,
                cuisine: Cuisine::Cafe,
                distance_level: DistanceLevel::Near,
                spiciness_level: SpiceLevel::Mild,
                diet_tags: BTreeSet::new(),
                hours: vec![],
                photos: vec![],
                comments: vec![],
                menu_sample: vec![],
                source: String::new(),
                description: None,
                aggregate_comment: None,
            },
            like_count,
            dislike_count: 0,
            score: like_count as f64 / members as f64,
            liked_by: vec![],
        }
    }

    #[test]
    fn test_two_of_three_is_ready() {
        let status = consensus_status(&[create_score("r", 2, 3)], 3);

        assert_eq!(status.consensus_score, 67);
        assert!(status.decision_ready);
    }

    #[test]
    fn test_one_of_three_is_not_ready() {
        let status = consensus_status(&[create_score("r", 1, 3)], 3);

        assert_eq!(status.consensus_score, 33);
        assert!(!status.decision_ready);
    }

    #[test]
    fn test_one_of_two_is_below_threshold() {
        let status = consensus_status(&[create_score("r", 1, 2)], 2);

        assert_eq!(status.consensus_score, 50);
        assert!(!status.decision_ready);
    }

    #[test]
    fn test_single_member_like_is_ready() {
        let status = consensus_status(&[create_score("r", 1, 1)], 1);

        assert_eq!(status.consensus_score, 100);
        assert!(status.decision_ready);
    }

    #[test]
    fn test_zero_members() {
        assert_eq!(consensus_status(&[], 0), ConsensusStatus::default());
        assert_eq!(
            consensus_status(&[], 0),
            ConsensusStatus {
                consensus_score: 0,
                decision_ready: false
            }
        );
    }

    #[test]
    fn test_no_scores_with_members() {
        let status = consensus_status(&[], 4);
        assert_eq!(status.consensus_score, 0);
        assert!(!status.decision_ready);
    }

    #[test]
    fn test_member_progress_counts() {
        let member = Member {
            id: "m1".to_string(),
            name: "User A".to_string(),
            joined_at: Utc::now(),
        };
        let idle = Member {
            id: "m2".to_string(),
            name: "User B".to_string(),
            joined_at: Utc::now(),
        };
        let mut votes = SwipeMap::new();
        votes.insert("r1".to_string(), SwipeValue::Like);
        votes.insert("r2".to_string(), SwipeValue::Dislike);
        votes.insert("r3".to_string(), SwipeValue::Neutral);

        let mut swipes = HashMap::new();
        swipes.insert("m1".to_string(), votes);

        let session = SessionState {
            code: "123456".to_string(),
            name: "Lunch".to_string(),
            created_at: Utc::now(),
            members: vec![member, idle],
            preferences: HashMap::new(),
            swipes,
        };

        let progress = member_progress(&session, 4);

        assert_eq!(progress[0].total, 3);
        assert_eq!((progress[0].liked, progress[0].disliked, progress[0].neutral), (1, 1, 1));
        assert_eq!(progress[0].progress, 75);
        assert!(!progress[0].complete);
        assert_eq!(progress[1].total, 0);
        assert_eq!(progress[1].progress, 0);

        let done = member_progress(&session, 3);
        assert!(done[0].complete);
        assert_eq!(done[0].progress, 100);
    }
}
