//! Flat population arena of job permutations.
//!
//! # Layout
//!
//! `genes` holds `size x len` job indices back to back; individual `i`
//! occupies `genes[i * len..(i + 1) * len]`. A parallel `fitness` vector
//! stores one value per individual (higher = better).

use rand::seq::SliceRandom;
use rand::Rng;

/// A population of permutations of `0..len`.
#[derive(Debug, Clone)]
pub struct Population {
    genes: Vec<usize>,
    fitness: Vec<f64>,
    len: usize,
}

impl Population {
    /// Creates an empty population of permutations of `0..len`.
    pub fn with_capacity(size: usize, len: usize) -> Self {
        Self {
            genes: Vec::with_capacity(size * len),
            fitness: Vec::with_capacity(size),
            len,
        }
    }

    /// Creates `size` random permutations, scored by `evaluate`.
    pub fn random<R, F>(size: usize, len: usize, rng: &mut R, mut evaluate: F) -> Self
    where
        R: Rng,
        F: FnMut(&[usize]) -> f64,
    {
        let mut population = Self::with_capacity(size, len);
        let mut perm: Vec<usize> = (0..len).collect();
        for _ in 0..size {
            perm.shuffle(rng);
            let fitness = evaluate(&perm);
            population.push(&perm, fitness);
        }
        population
    }

    /// Appends an individual.
    pub fn push(&mut self, genes: &[usize], fitness: f64) {
        debug_assert_eq!(genes.len(), self.len);
        self.genes.extend_from_slice(genes);
        self.fitness.push(fitness);
    }

    /// Number of individuals.
    #[inline]
    pub fn size(&self) -> usize {
        self.fitness.len()
    }

    /// Permutation length.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the population has no individuals.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fitness.is_empty()
    }

    /// Genes of individual `i`.
    #[inline]
    pub fn individual(&self, i: usize) -> &[usize] {
        &self.genes[i * self.len..(i + 1) * self.len]
    }

    /// Fitness of individual `i`.
    #[inline]
    pub fn fitness(&self, i: usize) -> f64 {
        self.fitness[i]
    }

    /// Index of the fittest individual (first on ties).
    pub fn best(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, &f) in self.fitness.iter().enumerate() {
            match best {
                Some(b) if self.fitness[b] >= f => {}
                _ => best = Some(i),
            }
        }
        best
    }

    /// Removes all individuals, keeping allocations.
    pub fn clear(&mut self) {
        self.genes.clear();
        self.fitness.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn is_permutation(genes: &[usize]) -> bool {
        let mut sorted = genes.to_vec();
        sorted.sort_unstable();
        sorted.iter().enumerate().all(|(i, &g)| i == g)
    }

    #[test]
    fn test_random_population() {
        let mut rng = SmallRng::seed_from_u64(42);
        let pop = Population::random(10, 6, &mut rng, |g| g[0] as f64);

        assert_eq!(pop.size(), 10);
        assert_eq!(pop.len(), 6);
        for i in 0..pop.size() {
            assert!(is_permutation(pop.individual(i)));
            assert_eq!(pop.fitness(i), pop.individual(i)[0] as f64);
        }
    }

    #[test]
    fn test_best_first_on_ties() {
        let mut pop = Population::with_capacity(3, 2);
        pop.push(&[0, 1], 1.0);
        pop.push(&[1, 0], 5.0);
        pop.push(&[0, 1], 5.0);
        assert_eq!(pop.best(), Some(1));
        assert_eq!(pop.individual(1), &[1, 0]);
    }

    #[test]
    fn test_clear() {
        let mut pop = Population::with_capacity(1, 2);
        pop.push(&[1, 0], 0.0);
        pop.clear();
        assert!(pop.is_empty());
        assert_eq!(pop.best(), None);
    }
}
