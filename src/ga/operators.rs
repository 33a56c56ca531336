//! Permutation operators: selection, crossover and mutation.
//!
//! All operators work on job-index permutations and keep them valid
//! (every index exactly once).

use rand::Rng;

use super::population::Population;

/// Tournament selection with replacement.
///
/// Draws `k` random individuals and returns the fittest (first drawn on
/// ties).
///
/// # Reference
/// Goldberg & Deb (1991), "A Comparative Analysis of Selection Schemes"
pub fn tournament_select<R: Rng>(population: &Population, k: usize, rng: &mut R) -> usize {
    let size = population.size();
    let mut best = rng.random_range(0..size);
    for _ in 1..k.max(1) {
        let candidate = rng.random_range(0..size);
        if population.fitness(candidate) > population.fitness(best) {
            best = candidate;
        }
    }
    best
}

/// Order crossover (OX) over a random segment.
///
/// Child 1 keeps `p1[i..=j]` in place and fills the remaining positions,
/// left to right, with the genes of `p2` in their order in `p2`, skipping
/// genes already in the segment. Child 2 uses the same segment with the
/// parents swapped.
///
/// # Reference
/// Davis (1985), "Applying Adaptive Algorithms to Epistatic Domains"
pub fn order_crossover<R: Rng>(
    p1: &[usize],
    p2: &[usize],
    rng: &mut R,
) -> (Vec<usize>, Vec<usize>) {
    let n = p1.len();
    if n < 2 {
        return (p1.to_vec(), p2.to_vec());
    }

    let a = rng.random_range(0..n);
    let b = rng.random_range(0..n);
    let (i, j) = if a <= b { (a, b) } else { (b, a) };

    (ox_child(p1, p2, i, j), ox_child(p2, p1, i, j))
}

fn ox_child(keep: &[usize], fill: &[usize], i: usize, j: usize) -> Vec<usize> {
    let n = keep.len();
    let mut child = vec![usize::MAX; n];
    let mut used = vec![false; n];

    child[i..=j].copy_from_slice(&keep[i..=j]);
    for &gene in &keep[i..=j] {
        used[gene] = true;
    }

    let mut donors = fill.iter().copied().filter(|&gene| !used[gene]);
    for (pos, slot) in child.iter_mut().enumerate() {
        if (i..=j).contains(&pos) {
            continue;
        }
        if let Some(gene) = donors.next() {
            *slot = gene;
        }
    }
    child
}

/// Swap mutation: exchanges two random positions.
pub fn swap_mutation<R: Rng>(genes: &mut [usize], rng: &mut R) {
    let len = genes.len();
    if len < 2 {
        return;
    }
    let i = rng.random_range(0..len);
    let j = rng.random_range(0..len);
    genes.swap(i, j);
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
    fn test_ox_child_fixed_segment() {
        let p1 = [0, 1, 2, 3, 4, 5, 6, 7];
        let p2 = [7, 6, 5, 4, 3, 2, 1, 0];
        // Keep p1[2..=4] = [2, 3, 4]; the rest comes from p2 read left to right
        let child = ox_child(&p1, &p2, 2, 4);
        assert_eq!(child, vec![7, 6, 2, 3, 4, 5, 1, 0]);
    }

    #[test]
    fn test_ox_child_keeps_donor_relative_order() {
        let p1 = [3, 1, 4, 0, 2, 5];
        let p2 = [5, 4, 3, 2, 1, 0];
        // Segment [1..=2] = [1, 4]; donors in p2 order: 5, 3, 2, 0
        let child = ox_child(&p1, &p2, 1, 2);
        assert_eq!(child, vec![5, 1, 4, 3, 2, 0]);

        let donors: Vec<usize> = child
            .iter()
            .enumerate()
            .filter(|&(pos, _)| !(1..=2).contains(&pos))
            .map(|(_, &g)| g)
            .collect();
        let expected: Vec<usize> = p2.iter().copied().filter(|g| ![1, 4].contains(g)).collect();
        assert_eq!(donors, expected);
    }

    #[test]
    fn test_ox_full_segment_copies_parent() {
        let p1 = [2, 0, 1];
        let p2 = [0, 1, 2];
        assert_eq!(ox_child(&p1, &p2, 0, 2), vec![2, 0, 1]);
    }

    #[test]
    fn test_order_crossover_keeps_permutations() {
        let mut rng = SmallRng::seed_from_u64(42);
        let p1: Vec<usize> = (0..10).collect();
        let p2: Vec<usize> = (0..10).rev().collect();
        for _ in 0..50 {
            let (c1, c2) = order_crossover(&p1, &p2, &mut rng);
            assert!(is_permutation(&c1));
            assert!(is_permutation(&c2));
        }
    }

    #[test]
    fn test_order_crossover_tiny() {
        let mut rng = SmallRng::seed_from_u64(42);
        let (c1, c2) = order_crossover(&[0], &[0], &mut rng);
        assert_eq!((c1, c2), (vec![0], vec![0]));
    }

    #[test]
    fn test_swap_mutation() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut genes: Vec<usize> = (0..6).collect();
        for _ in 0..100 {
            swap_mutation(&mut genes, &mut rng);
        }
        assert!(is_permutation(&genes));
    }

    #[test]
    fn test_tournament_prefers_fitter() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut pop = Population::with_capacity(4, 1);
        pop.push(&[0], 1.0);
        pop.push(&[0], 2.0);
        pop.push(&[0], 3.0);
        pop.push(&[0], 100.0);

        // Full-size tournament over many draws should pick the best often
        let picks: Vec<usize> = (0..200).map(|_| tournament_select(&pop, 4, &mut rng)).collect();
        let best = picks.iter().filter(|&&i| i == 3).count();
        assert!(best > 100);

        // k = 1 is uniform random
        let any = tournament_select(&pop, 1, &mut rng);
        assert!(any < 4);
    }
}
