//! Team-size partitioning.
//!
//! # Invariants
//! - Returned sizes always sum to the student count.
//! - When some team count `k` satisfies `k * min <= n <= k * max`, every
//!   size lies in `min..=max`.
//! - Otherwise only the trailing team may fall below `min`.

use crate::config::SizeRange;
use rand::seq::SliceRandom;
use rand::Rng;

/// Splits `student_count` students into team sizes bounded by `range`.
///
/// Teams start at `range.min()` and receive the surplus one student at a
/// time, in a freshly shuffled team order per pass, until everyone is
/// placed. Fewer students than `range.min()` form one undersized team.
///
/// # Panics
/// Panics if the sizes do not add up to `student_count`; that is a logic
/// defect, not bad input.
pub fn partition_team_sizes<R: Rng + ?Sized>(
    student_count: usize,
    range: SizeRange,
    rng: &mut R,
) -> Vec<usize> {
    let (min, max) = (range.min(), range.max());
    if student_count == 0 {
        return Vec::new();
    }
    if student_count < min {
        return vec![student_count];
    }

    let team_count = initial_team_count(student_count, min, max);
    let mut sizes = vec![min; team_count];
    let mut assigned = min * team_count;
    let mut order: Vec<usize> = Vec::with_capacity(team_count);

    while assigned < student_count {
        order.clear();
        order.extend(0..sizes.len());
        order.shuffle(rng);

        let mut progressed = false;
        for &index in &order {
            if assigned >= student_count {
                break;
            }
            if sizes[index] < max {
                sizes[index] += 1;
                assigned += 1;
                progressed = true;
            }
        }

        if !progressed {
            let extra = (student_count - assigned).clamp(min, max);
            sizes.push(extra);
            assigned += extra;
        }
    }

    if assigned > student_count {
        trim_overshoot(&mut sizes, assigned - student_count, min);
    }

    let total: usize = sizes.iter().sum();
    assert_eq!(
        total, student_count,
        "team partition {sizes:?} does not cover {student_count} students"
    );
    sizes
}

/// Midpoint-based team count, clamped into the feasible band when one exists.
fn initial_team_count(student_count: usize, min: usize, max: usize) -> usize {
    let by_max = student_count / max;
    let midpoint = (min + max) as f64 / 2.0;
    let by_midpoint = (student_count as f64 / midpoint).round() as usize;
    let estimate = by_max.max(by_midpoint).max(1);

    let fewest = student_count.div_ceil(max);
    let most = student_count / min;
    if fewest <= most {
        estimate.clamp(fewest, most)
    } else {
        estimate
    }
}

/// Removes `overshoot` seats, last teams first.
///
/// Teams are first lowered no further than `min`. Whatever is left comes
/// out of the trailing team, dropping it entirely if it empties.
fn trim_overshoot(sizes: &mut Vec<usize>, mut overshoot: usize, min: usize) {
    for size in sizes.iter_mut().rev() {
        if overshoot == 0 {
            return;
        }
        let take = overshoot.min(size.saturating_sub(min));
        *size -= take;
        overshoot -= take;
    }

    while overshoot > 0 {
        let Some(last) = sizes.last_mut() else {
            return;
        };
        let take = overshoot.min(*last);
        *last -= take;
        overshoot -= take;
        if *last == 0 {
            sizes.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{initial_team_count, partition_team_sizes, trim_overshoot};
    use crate::config::SizeRange;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn range(min: usize, max: usize) -> SizeRange {
        SizeRange::new(min, max).unwrap()
    }

    #[test]
    fn empty_roster_yields_no_teams() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(partition_team_sizes(0, range(4, 8), &mut rng).is_empty());
    }

    #[test]
    fn small_roster_forms_single_undersized_team() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(partition_team_sizes(3, range(4, 8), &mut rng), vec![3]);
    }

    #[test]
    fn thirty_students_split_within_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        let sizes = partition_team_sizes(30, range(4, 8), &mut rng);
        assert_eq!(sizes.iter().sum::<usize>(), 30);
        assert!(sizes.iter().all(|size| (4..=8).contains(size)), "{sizes:?}");
    }

    #[test]
    fn same_seed_yields_same_sizes() {
        let first = partition_team_sizes(77, range(4, 6), &mut StdRng::seed_from_u64(8));
        let second = partition_team_sizes(77, range(4, 6), &mut StdRng::seed_from_u64(8));
        assert_eq!(first, second);
    }

    #[test]
    fn infeasible_bounds_leave_one_short_trailing_team() {
        let mut rng = StdRng::seed_from_u64(2);
        let sizes = partition_team_sizes(10, range(4, 4), &mut rng);
        assert_eq!(sizes.iter().sum::<usize>(), 10);
        let (last, rest) = sizes.split_last().unwrap();
        assert!(rest.iter().all(|size| *size == 4), "{sizes:?}");
        assert!(*last < 4);
    }

    #[test]
    fn initial_count_lands_in_feasible_band() {
        assert_eq!(initial_team_count(30, 4, 8), 5);
        assert_eq!(initial_team_count(9, 4, 5), 2);
        // 7 students cannot fill teams of exactly 4; estimate is kept.
        assert_eq!(initial_team_count(7, 4, 4), 2);
    }

    #[test]
    fn trim_never_drops_below_min_while_slack_exists() {
        let mut sizes = vec![6, 6, 4];
        trim_overshoot(&mut sizes, 3, 4);
        assert_eq!(sizes, vec![5, 4, 4]);
    }
}
