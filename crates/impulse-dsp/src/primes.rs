//! Prime number utilities.

/// All primes up to and including `limit`, by the sieve of Eratosthenes.
pub fn sieve(limit: usize) -> Vec<usize> {
    if limit < 2 {
        return Vec::new();
    }

    let mut composite = vec![false; limit + 1];
    let mut p = 2;
    while p * p <= limit {
        if !composite[p] {
            for multiple in (p * p..=limit).step_by(p) {
                composite[multiple] = true;
            }
        }
        p += 1;
    }

    composite
        .iter()
        .enumerate()
        .skip(2)
        .filter(|(_, &c)| !c)
        .map(|(n, _)| n)
        .collect()
}

/// Trial division by 2, 3 and numbers of the form 6k ± 1.
pub fn is_prime(n: u64) -> bool {
    if n < 4 {
        return n >= 2;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }

    let mut i = 5u64;
    while i.saturating_mul(i) <= n {
        if n % i == 0 || n % (i + 2) == 0 {
            return false;
        }
        i += 6;
    }
    true
}
