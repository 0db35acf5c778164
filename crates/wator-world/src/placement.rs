//! Collision-free random scattering of the initial population.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use wator_core::{Error, Result};

/// Every cell index of a grid exactly once, in uniformly shuffled order
#[derive(Debug, Clone)]
pub struct Placement {
    order: Vec<usize>,
    cursor: usize,
}

impl Placement {
    pub fn new(size: usize, rng: &mut ChaCha8Rng) -> Self {
        let mut order: Vec<usize> = (0..size).collect();
        order.shuffle(rng);
        Self { order, cursor: 0 }
    }

    /// Take the next cell index from the sequence
    pub fn draw(&mut self) -> Result<usize> {
        let index = *self.order.get(self.cursor).ok_or(Error::SequenceExhausted {
            size: self.order.len(),
        })?;
        self.cursor += 1;
        Ok(index)
    }

    pub fn remaining(&self) -> usize {
        self.order.len() - self.cursor
    }
}
