use watchlister_models::ACHIEVEMENT_THRESHOLDS;

/// Thresholds crossed by a count moving from `old_count` to `new_count`,
/// ascending direction only. Runs off the live count, so a threshold fires
/// again if the count later drops below it and climbs back.
pub fn thresholds_crossed(old_count: usize, new_count: usize) -> Vec<u32> {
    ACHIEVEMENT_THRESHOLDS
        .iter()
        .copied()
        .filter(|t| old_count < *t as usize && new_count >= *t as usize)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_exactly_on_threshold() {
        assert_eq!(thresholds_crossed(4, 5), vec![5]);
        assert!(thresholds_crossed(5, 5).is_empty());
        assert!(thresholds_crossed(3, 4).is_empty());
    }

    #[test]
    fn does_not_fire_descending() {
        assert!(thresholds_crossed(5, 4).is_empty());
        assert!(thresholds_crossed(10, 5).is_empty());
    }

    #[test]
    fn bulk_jump_fires_every_threshold_passed() {
        assert_eq!(thresholds_crossed(3, 12), vec![5, 10]);
    }

    #[test]
    fn refires_after_dropping_below() {
        // Documented quirk: no persisted high-water mark.
        assert_eq!(thresholds_crossed(4, 5), vec![5]);
        assert!(thresholds_crossed(5, 4).is_empty());
        assert_eq!(thresholds_crossed(4, 5), vec![5]);
    }
}
