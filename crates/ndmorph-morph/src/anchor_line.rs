//! Sliding-window minimum and maximum along one line of pixels
//!
//! The processor keeps a monotonic deque of candidate indices: every index
//! in the deque holds a value strictly preferred over all later ones, so the
//! front is always the extremum of the current window. Each sample enters
//! and leaves the deque at most once, which makes a whole line O(n)
//! regardless of the window length.

use crate::{MorphError, MorphResult};
use ndmorph_core::Pixel;
use std::collections::VecDeque;

/// Which extremum a sliding window keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extremum {
    /// Keep the minimum (erosion)
    Min,
    /// Keep the maximum (dilation)
    Max,
}

impl Extremum {
    /// Whether `a` is strictly preferred over `b`
    #[inline]
    pub fn prefers<T: PartialOrd + Copy>(self, a: T, b: T) -> bool {
        match self {
            Extremum::Min => a < b,
            Extremum::Max => a > b,
        }
    }

    /// The preferred of two values; ties keep `a`
    #[inline]
    pub fn pick<T: PartialOrd + Copy>(self, a: T, b: T) -> T {
        if self.prefers(b, a) { b } else { a }
    }

    /// Value that never wins a comparison
    pub fn neutral<T: Pixel>(self) -> T {
        match self {
            Extremum::Min => T::max_value(),
            Extremum::Max => T::min_value(),
        }
    }

    /// The opposite extremum
    pub fn opposite(self) -> Self {
        match self {
            Extremum::Min => Extremum::Max,
            Extremum::Max => Extremum::Min,
        }
    }
}

/// 1-D anchor processor for a centered window of odd length
#[derive(Debug, Clone)]
pub struct AnchorLine {
    extremum: Extremum,
    length: usize,
    queue: VecDeque<usize>,
}

impl AnchorLine {
    /// Create a processor for windows of `length` pixels
    ///
    /// # Errors
    ///
    /// Returns [`MorphError::InvalidParameters`] unless `length` is odd.
    pub fn new(extremum: Extremum, length: usize) -> MorphResult<Self> {
        check_length(length)?;
        Ok(Self {
            extremum,
            length,
            queue: VecDeque::new(),
        })
    }

    /// Create a processor with a single-pixel window
    pub fn identity(extremum: Extremum) -> Self {
        Self {
            extremum,
            length: 1,
            queue: VecDeque::new(),
        }
    }

    /// Extremum kept by the window
    pub fn extremum(&self) -> Extremum {
        self.extremum
    }

    /// Window length in pixels
    pub fn length(&self) -> usize {
        self.length
    }

    /// Change the window length, keeping the scratch allocation
    ///
    /// # Errors
    ///
    /// Returns [`MorphError::InvalidParameters`] unless `length` is odd.
    pub fn set_length(&mut self, length: usize) -> MorphResult<()> {
        check_length(length)?;
        self.length = length;
        Ok(())
    }

    /// Slide the window over `input`, writing one result per sample
    ///
    /// `output[j]` is the extremum of `input[j - r..=j + r]` with
    /// `r = length / 2`. Whenever the window reaches past either end of the
    /// input, `boundary` takes part in the comparison in place of the
    /// missing samples.
    ///
    /// # Errors
    ///
    /// Returns [`MorphError::InvalidParameters`] if the slices differ in
    /// length.
    pub fn process<T: Pixel>(
        &mut self,
        input: &[T],
        output: &mut [T],
        boundary: T,
    ) -> MorphResult<()> {
        if input.len() != output.len() {
            return Err(MorphError::InvalidParameters(format!(
                "line output holds {} samples, input {}",
                output.len(),
                input.len()
            )));
        }
        let n = input.len();
        if n == 0 {
            return Ok(());
        }
        if self.length == 1 {
            output.copy_from_slice(input);
            return Ok(());
        }

        let r = self.length / 2;
        let ext = self.extremum;
        self.queue.clear();
        let mut next = 0;

        for (j, out) in output.iter_mut().enumerate() {
            let hi = (j + r).min(n - 1);
            while next <= hi {
                let v = input[next];
                while let Some(&back) = self.queue.back() {
                    if ext.prefers(input[back], v) {
                        break;
                    }
                    self.queue.pop_back();
                }
                self.queue.push_back(next);
                next += 1;
            }

            let lo = j.saturating_sub(r);
            while let Some(&front) = self.queue.front() {
                if front >= lo {
                    break;
                }
                self.queue.pop_front();
            }

            let best = match self.queue.front() {
                Some(&front) => input[front],
                None => boundary,
            };
            *out = if j < r || j + r >= n {
                ext.pick(best, boundary)
            } else {
                best
            };
        }
        Ok(())
    }
}

fn check_length(length: usize) -> MorphResult<()> {
    if length % 2 == 0 {
        return Err(MorphError::InvalidParameters(format!(
            "anchor window length must be odd, got {length}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute(input: &[i32], len: usize, ext: Extremum, boundary: i32) -> Vec<i32> {
        let r = len / 2;
        let n = input.len() as i64;
        (0..n)
            .map(|j| {
                let mut best = None;
                for k in j - r as i64..=j + r as i64 {
                    let v = if (0..n).contains(&k) { input[k as usize] } else { boundary };
                    best = Some(best.map_or(v, |b| ext.pick(b, v)));
                }
                best.unwrap()
            })
            .collect()
    }

    #[test]
    fn test_concrete_scenario() {
        let input = [5, 1, 4, 2, 3];
        let mut out = [0; 5];

        let mut erode = AnchorLine::new(Extremum::Min, 3).unwrap();
        erode.process(&input, &mut out, i32::MAX).unwrap();
        assert_eq!(out, [1, 1, 1, 2, 2]);

        let mut dilate = AnchorLine::new(Extremum::Max, 3).unwrap();
        dilate.process(&input, &mut out, i32::MIN).unwrap();
        assert_eq!(out, [5, 5, 4, 4, 3]);
    }

    #[test]
    fn test_length_one_is_identity() {
        let input = [9u8, 3, 7];
        let mut out = [0u8; 3];
        let mut line = AnchorLine::new(Extremum::Min, 1).unwrap();
        line.process(&input, &mut out, 0).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn test_even_length_rejected() {
        assert!(AnchorLine::new(Extremum::Max, 4).is_err());
        assert!(AnchorLine::new(Extremum::Max, 0).is_err());
        let mut line = AnchorLine::new(Extremum::Max, 5).unwrap();
        assert!(line.set_length(2).is_err());
        assert_eq!(line.length(), 5);
    }

    #[test]
    fn test_boundary_affects_edges_only() {
        let input = [4, 6, 8, 6, 4, 6, 8];
        let mut high = [0; 7];
        let mut low = [0; 7];
        let mut line = AnchorLine::new(Extremum::Min, 3).unwrap();
        line.process(&input, &mut high, i32::MAX).unwrap();
        line.process(&input, &mut low, 0).unwrap();
        assert_eq!(low[0], 0);
        assert_eq!(low[6], 0);
        assert_eq!(&high[1..6], &low[1..6]);
        assert_ne!(high[0], low[0]);
    }

    #[test]
    fn test_window_longer_than_line() {
        let input = [3, 1, 2];
        let mut out = [0; 3];
        let mut line = AnchorLine::new(Extremum::Max, 9).unwrap();
        line.process(&input, &mut out, -1).unwrap();
        assert_eq!(out, [3, 3, 3]);
        line.process(&input, &mut out, 10).unwrap();
        assert_eq!(out, [10, 10, 10]);
    }

    #[test]
    fn test_matches_brute_force() {
        let input = [7, -2, 5, 5, 0, 3, 9, -4, 1, 1, 6, 2];
        for len in [1, 3, 5, 7, 13] {
            for ext in [Extremum::Min, Extremum::Max] {
                let mut out = vec![0; input.len()];
                let mut line = AnchorLine::new(ext, len).unwrap();
                line.process(&input, &mut out, 3).unwrap();
                assert_eq!(out, brute(&input, len, ext, 3), "len {len} {ext:?}");
            }
        }
    }

    #[test]
    fn test_forward_and_reverse_agree() {
        let input = [2, 8, 1, 9, 3, 3, 7, 0, 5];
        let reversed: Vec<_> = input.iter().rev().copied().collect();
        let mut fwd = vec![0; 9];
        let mut back = vec![0; 9];
        let mut line = AnchorLine::new(Extremum::Min, 5).unwrap();
        line.process(&input, &mut fwd, 4).unwrap();
        line.process(&reversed, &mut back, 4).unwrap();
        back.reverse();
        assert_eq!(fwd, back);
    }

    #[test]
    fn test_length_mismatch() {
        let mut line = AnchorLine::new(Extremum::Min, 3).unwrap();
        let mut out = [0; 2];
        assert!(line.process(&[1, 2, 3], &mut out, 0).is_err());
    }

    #[test]
    fn test_extremum_helpers() {
        assert_eq!(Extremum::Min.pick(3, 2), 2);
        assert_eq!(Extremum::Max.pick(3, 2), 3);
        assert!(!Extremum::Max.prefers(2.5, 2.5));
        assert_eq!(Extremum::Min.pick(-0.0, 0.0), -0.0);
        assert_eq!(Extremum::Min.neutral::<u8>(), 255);
        assert_eq!(Extremum::Max.neutral::<i16>(), i16::MIN);
        assert_eq!(Extremum::Min.opposite(), Extremum::Max);
    }
}
