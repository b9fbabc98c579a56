//! Randomness adapter: uniform float, uniform direction choice, and the
//! Fisher-Yates index callback used by the shuffle opcode.

use rand::Rng;

const DIRECTIONS: [char; 4] = ['<', '>', '^', 'v'];

pub fn random_float(rng: &mut impl Rng) -> f64 {
    rng.gen_range(0.0..1.0)
}

pub fn random_direction(rng: &mut impl Rng) -> char {
    DIRECTIONS[rng.gen_range(0..DIRECTIONS.len())]
}

pub fn random_index(rng: &mut impl Rng, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        rng.gen_range(0..len)
    }
}
