use rand::Rng;

use crate::Identifier;

/// Returns every id in `1..=n` exactly once, shuffled.
/// The thread RNG is seeded from the OS, so no two runs walk the ids in the same order.
pub fn generate(n: Identifier) -> Vec<Identifier> {
    generate_with(n, &mut rand::rng())
}

pub fn generate_with<R: Rng>(n: Identifier, rng: &mut R) -> Vec<Identifier> {
    let mut ids: Vec<Identifier> = (1..=n).collect();
    shuffle(&mut ids, rng);
    ids
}

/// Fisher–Yates.
fn shuffle<R: Rng>(ids: &mut [Identifier], rng: &mut R) {
    for i in (1..ids.len()).rev() {
        let j = rng.random_range(0..=i);
        ids.swap(i, j);
    }
}
