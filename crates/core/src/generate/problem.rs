use rand::Rng;

use crate::model::{MULTIPLICAND_MAX, MULTIPLIER_MAX, Problem};

/// Draw a random problem with a four-digit multiplicand and three-digit multiplier.
///
/// Each operand is drawn from `0..=max` and both are redrawn together until
/// both have the right number of digits, which keeps each uniform over its
/// valid range.
pub fn generate_problem<R: Rng + ?Sized>(rng: &mut R) -> Problem {
    loop {
        let multiplicand = rng.random_range(0..=MULTIPLICAND_MAX);
        let multiplier = rng.random_range(0..=MULTIPLIER_MAX);
        if let Ok(problem) = Problem::new(multiplicand, multiplier) {
            return problem;
        }
    }
}

/// Range and consistency check, see [`Problem::is_valid`].
#[must_use]
pub fn is_valid(problem: &Problem) -> bool {
    problem.is_valid()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn generated_problems_are_valid() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..2_000 {
            let problem = generate_problem(&mut rng);
            assert!(is_valid(&problem), "{problem:?}");
        }
    }

    #[test]
    fn same_seed_same_problem() {
        let a = generate_problem(&mut StdRng::seed_from_u64(42));
        let b = generate_problem(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn works_through_a_trait_object() {
        let mut rng = StdRng::seed_from_u64(1);
        let dyn_rng: &mut dyn rand::RngCore = &mut rng;
        assert!(generate_problem(dyn_rng).is_valid());
    }
}
