//! Injectable randomness for cosmetic choices.

use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Source of uniform draws in `[0, 1)`.
pub trait RandomSource: Send + Sync {
    fn next_float(&self) -> f64;

    /// Index in `0..len`; `len` must be non-zero.
    fn next_index(&self, len: usize) -> usize {
        ((self.next_float() * len as f64) as usize).min(len.saturating_sub(1))
    }
}

/// Thread-local RNG from `rand`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_float(&self) -> f64 {
        rand::thread_rng().r#gen::<f64>()
    }
}

/// Replays a fixed sequence of draws, cycling when exhausted.
#[derive(Debug)]
pub struct FixedRandom {
    values: Vec<f64>,
    cursor: AtomicUsize,
}

impl FixedRandom {
    pub fn sequence(values: impl Into<Vec<f64>>) -> Self {
        let mut values: Vec<f64> = values.into();
        if values.is_empty() {
            values.push(0.0);
        }
        for value in &mut values {
            *value = value.clamp(0.0, 1.0 - f64::EPSILON);
        }
        Self {
            values,
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn constant(value: f64) -> Self {
        Self::sequence(vec![value])
    }
}

impl RandomSource for FixedRandom {
    fn next_float(&self) -> f64 {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.values[index % self.values.len()]
    }
}
