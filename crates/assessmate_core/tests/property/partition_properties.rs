use assessmate_core::{biased_score, partition_team_sizes, SizeRange};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn bounded_partition_exists(n: usize, min: usize, max: usize) -> bool {
    n.div_ceil(max) <= n / min
}

proptest! {
    #[test]
    fn sizes_always_cover_every_student(
        n in 0usize..400,
        min in 1usize..10,
        extra in 0usize..8,
        seed in any::<u64>(),
    ) {
        let range = SizeRange::new(min, min + extra).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let sizes = partition_team_sizes(n, range, &mut rng);

        prop_assert_eq!(sizes.iter().sum::<usize>(), n);
        prop_assert!(sizes.iter().all(|&size| size > 0));
        prop_assert!(sizes.iter().all(|&size| size <= range.max()));
    }

    #[test]
    fn feasible_rosters_stay_inside_bounds(
        n in 1usize..400,
        min in 1usize..10,
        extra in 0usize..8,
        seed in any::<u64>(),
    ) {
        let max = min + extra;
        prop_assume!(n >= min && bounded_partition_exists(n, min, max));

        let range = SizeRange::new(min, max).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let sizes = partition_team_sizes(n, range, &mut rng);

        prop_assert!(
            sizes.iter().all(|&size| range.contains(size)),
            "{:?} outside {}..={}", sizes, min, max
        );
    }

    #[test]
    fn only_the_trailing_team_may_be_undersized(
        n in 1usize..400,
        min in 1usize..10,
        extra in 0usize..8,
        seed in any::<u64>(),
    ) {
        let range = SizeRange::new(min, min + extra).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let sizes = partition_team_sizes(n, range, &mut rng);

        if let Some((_, leading)) = sizes.split_last() {
            prop_assert!(leading.iter().all(|&size| size >= min), "{:?}", sizes);
        }
    }

    #[test]
    fn rosters_below_minimum_form_one_team(min in 2usize..10, seed in any::<u64>()) {
        let range = SizeRange::new(min, min + 2).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        for n in 1..min {
            prop_assert_eq!(partition_team_sizes(n, range, &mut rng), vec![n]);
        }
        prop_assert!(partition_team_sizes(0, range, &mut rng).is_empty());
    }

    #[test]
    fn same_seed_same_partition(n in 0usize..300, seed in any::<u64>()) {
        let range = SizeRange::new(4, 8).unwrap();
        let first = partition_team_sizes(n, range, &mut StdRng::seed_from_u64(seed));
        let second = partition_team_sizes(n, range, &mut StdRng::seed_from_u64(seed));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn biased_scores_stay_on_scale(max_score in 1u8..=10, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        for _ in 0..32 {
            let score = biased_score(&mut rng, max_score);
            prop_assert!((1..=max_score).contains(&score));
        }
    }
}
