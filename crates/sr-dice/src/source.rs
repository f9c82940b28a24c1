//! Random sources for die faces.
//!
//! Rolls never touch a global generator. Callers pass a [`DieSource`]: either
//! an [`RngSource`] wrapping any `rand` generator, or a [`Scripted`] source
//! that replays fixed faces.

use std::collections::VecDeque;

use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};

/// Something that produces die faces.
pub trait DieSource {
    /// Return a face in `1..=faces`.
    fn face(&mut self, faces: u32) -> u32;
}

impl<T: DieSource + ?Sized> DieSource for &mut T {
    fn face(&mut self, faces: u32) -> u32 {
        (**self).face(faces)
    }
}

/// A die source backed by a `rand` generator.
#[derive(Debug, Clone)]
pub struct RngSource<R>(pub R);

impl RngSource<StdRng> {
    /// A deterministic source seeded with `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl RngSource<ThreadRng> {
    /// A source backed by the thread-local generator.
    pub fn thread() -> Self {
        Self(rand::rng())
    }
}

impl<R: Rng> DieSource for RngSource<R> {
    fn face(&mut self, faces: u32) -> u32 {
        self.0.random_range(1..=faces.max(1))
    }
}

/// A source that replays a fixed list of faces, cycling when exhausted.
///
/// Faces are clamped into the die's range, so a scripted 20 on a d6 shows 6.
#[derive(Debug, Clone, Default)]
pub struct Scripted {
    faces: VecDeque<u32>,
    script: Vec<u32>,
    consumed: usize,
}

impl Scripted {
    /// Replay `faces` in order.
    pub fn new(faces: impl IntoIterator<Item = u32>) -> Self {
        let script: Vec<u32> = faces.into_iter().collect();
        Self {
            faces: script.iter().copied().collect(),
            script,
            consumed: 0,
        }
    }

    /// How many faces have been drawn so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }
}

impl DieSource for Scripted {
    fn face(&mut self, faces: u32) -> u32 {
        if self.faces.is_empty() {
            self.faces.extend(self.script.iter().copied());
        }
        self.consumed += 1;
        self.faces.pop_front().unwrap_or(1).clamp(1, faces.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_replays_in_order() {
        let mut source = Scripted::new([3, 14]);
        assert_eq!(source.face(20), 3);
        assert_eq!(source.face(20), 14);
        assert_eq!(source.face(20), 3);
        assert_eq!(source.consumed(), 3);
    }

    #[test]
    fn scripted_clamps_to_die() {
        let mut source = Scripted::new([20, 0]);
        assert_eq!(source.face(6), 6);
        assert_eq!(source.face(6), 1);
    }

    #[test]
    fn empty_script_shows_one() {
        assert_eq!(Scripted::default().face(8), 1);
    }

    #[test]
    fn seeded_source_is_deterministic() {
        let mut a = RngSource::seeded(99);
        let mut b = RngSource::seeded(99);
        for _ in 0..20 {
            assert_eq!(a.face(20), b.face(20));
        }
    }

    #[test]
    fn rng_faces_in_range() {
        let mut source = RngSource::seeded(42);
        for _ in 0..200 {
            let face = source.face(6);
            assert!((1..=6).contains(&face));
        }
    }
}
