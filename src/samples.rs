//! Sample instances and a random instance generator.
//!
//! # Reference
//! Fisher & Thompson (1963), "Probabilistic learning combinations of local
//! job-shop scheduling rules" (FT06)

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::InstanceError;
use crate::models::{Instance, TaskCoord};

const MINIMAL: [&[(i64, i64)]; 3] = [
    &[(0, 3), (1, 2), (2, 2)],
    &[(0, 2), (2, 1), (1, 4)],
    &[(1, 4), (2, 3)],
];

const SINGLE: [&[(i64, i64)]; 1] = [&[(0, 3), (1, 2), (2, 2)]];

const FT06: [[(i64, i64); 6]; 6] = [
    [(2, 1), (0, 3), (1, 6), (3, 7), (5, 3), (4, 6)],
    [(1, 8), (2, 5), (4, 10), (5, 10), (0, 10), (3, 4)],
    [(2, 5), (3, 4), (5, 8), (0, 9), (1, 1), (4, 7)],
    [(1, 5), (0, 5), (2, 5), (3, 3), (4, 8), (5, 9)],
    [(2, 9), (1, 3), (4, 5), (5, 4), (0, 3), (3, 1)],
    [(1, 3), (3, 3), (5, 9), (0, 10), (4, 4), (2, 1)],
];

/// Optimal makespan of [`ft06`].
pub const FT06_OPTIMUM: i64 = 55;

/// Three jobs on three machines; optimal makespan 11.
pub fn minimal_jobshop() -> Instance {
    from_static(MINIMAL.iter().map(|job| job.iter().copied()))
}

/// One job visiting machines 0, 1, 2; optimal makespan 7.
pub fn single_job() -> Instance {
    from_static(SINGLE.iter().map(|job| job.iter().copied()))
}

/// Fisher–Thompson 6×6 benchmark; optimal makespan [`FT06_OPTIMUM`].
pub fn ft06() -> Instance {
    from_static(FT06.iter().map(|job| job.iter().copied()))
}

fn from_static<J, O>(jobs: J) -> Instance
where
    J: IntoIterator<Item = O>,
    O: IntoIterator<Item = (i64, i64)>,
{
    match Instance::new(jobs) {
        Ok(instance) => instance,
        Err(e) => unreachable!("built-in instance is valid: {e}"),
    }
}

/// Generates a random instance where every job visits every machine once.
///
/// Machine order is a random permutation per job; durations are uniform in
/// `1..=max_duration`.
///
/// # Errors
/// [`InstanceError`] when `jobs` or `machines` is zero, or `max_duration < 1`.
///
/// # Example
/// ```
/// use rand::SeedableRng;
/// use rand::rngs::SmallRng;
/// use u_jobshop::samples::random_instance;
///
/// let mut rng = SmallRng::seed_from_u64(42);
/// let instance = random_instance(4, 3, 9, &mut rng).unwrap();
/// assert_eq!(instance.operation_count(), 12);
/// ```
pub fn random_instance<R: Rng>(
    jobs: usize,
    machines: usize,
    max_duration: i64,
    rng: &mut R,
) -> Result<Instance, InstanceError> {
    if max_duration < 1 {
        return Err(InstanceError::NonPositiveDuration {
            coord: TaskCoord::new(0, 0),
            duration: max_duration,
        });
    }

    let raw: Vec<Vec<(i64, i64)>> = (0..jobs)
        .map(|_| {
            let mut order: Vec<i64> = (0..machines as i64).collect();
            order.shuffle(rng);
            order
                .into_iter()
                .map(|m| (m, rng.random_range(1..=max_duration)))
                .collect()
        })
        .collect();

    Instance::new(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_builtin_instances() {
        assert_eq!(minimal_jobshop().operation_count(), 8);
        assert_eq!(single_job().horizon(), 7);

        let ft = ft06();
        assert_eq!(ft.job_count(), 6);
        assert_eq!(ft.machine_count(), 6);
        assert_eq!(ft.horizon(), 197);
        assert!(ft.lower_bound() <= FT06_OPTIMUM);
    }

    #[test]
    fn test_random_instance_shape() {
        let mut rng = SmallRng::seed_from_u64(7);
        let inst = random_instance(5, 4, 10, &mut rng).unwrap();

        assert_eq!(inst.job_count(), 5);
        assert_eq!(inst.machine_count(), 4);
        for job in inst.jobs() {
            let mut machines: Vec<usize> = job.operations.iter().map(|op| op.machine).collect();
            machines.sort_unstable();
            assert_eq!(machines, vec![0, 1, 2, 3]);
            assert!(job.operations.iter().all(|op| (1..=10).contains(&op.duration)));
        }
    }

    #[test]
    fn test_random_instance_is_seeded() {
        let a = random_instance(3, 3, 5, &mut SmallRng::seed_from_u64(1)).unwrap();
        let b = random_instance(3, 3, 5, &mut SmallRng::seed_from_u64(1)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_random_instance_rejects_degenerate() {
        let mut rng = SmallRng::seed_from_u64(0);
        assert_eq!(random_instance(0, 3, 5, &mut rng), Err(InstanceError::NoJobs));
        assert_eq!(
            random_instance(2, 0, 5, &mut rng),
            Err(InstanceError::EmptyJob { job_id: 0 })
        );
        assert!(random_instance(2, 2, 0, &mut rng).is_err());
    }
}
