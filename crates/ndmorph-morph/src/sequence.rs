//! Morphological sequence operations
//!
//! A sequence string describes a chain of box-kernel operations applied one
//! after another to a grayscale image of any dimension.
//!
//! # Sequence String Format
//!
//! Operations are separated by `+` and whitespace is ignored.
//! Each operation begins with a case-insensitive character followed by the
//! box size on every axis, separated by `.`:
//!
//! - `d<w>.<h>[.<d>...]` - Dilation
//! - `e<w>.<h>[.<d>...]` - Erosion
//! - `o<w>.<h>[.<d>...]` - Opening
//! - `c<w>.<h>[.<d>...]` - Closing
//! - `tw<w>.<h>[.<d>...]` - White tophat (input - opening)
//! - `tb<w>.<h>[.<d>...]` - Black tophat (closing - input)
//!
//! Every size must be odd, and the number of sizes must match the image
//! dimension. A 1-D image takes a single size, e.g. `e5`.
//!
//! # Examples
//!
//! ```
//! use ndmorph_core::{Image, Region, Size};
//! use ndmorph_morph::sequence::{MorphSequence, gray_morph_sequence};
//!
//! let seq = MorphSequence::parse("o5.5 + e3.3").unwrap();
//! assert_eq!(seq.len(), 2);
//!
//! let volume = Image::<u8, 3>::allocate(Region::from_size(Size([8, 8, 4])));
//! let result = gray_morph_sequence(&volume, "c3.3.1 + tw5.5.3").unwrap();
//! assert_eq!(result.buffered_region(), volume.requested_region());
//! ```

use crate::grayscale::{bottom_hat, close, dilate, erode, open, top_hat};
use crate::kernel::FlatKernel;
use crate::{MorphError, MorphResult};
use ndmorph_core::{Image, Pixel, Size};
use std::ops::Sub;
use tracing::debug;

/// A parsed sequence operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceOp {
    /// Dilation with a box kernel
    Dilate { sizes: Vec<usize> },
    /// Erosion with a box kernel
    Erode { sizes: Vec<usize> },
    /// Opening (erosion followed by dilation)
    Open { sizes: Vec<usize> },
    /// Closing (dilation followed by erosion)
    Close { sizes: Vec<usize> },
    /// Tophat transform
    Tophat {
        /// true for white tophat (input - opening), false for black (closing - input)
        white: bool,
        sizes: Vec<usize>,
    },
}

impl SequenceOp {
    /// Box size on every axis
    pub fn sizes(&self) -> &[usize] {
        match self {
            SequenceOp::Dilate { sizes }
            | SequenceOp::Erode { sizes }
            | SequenceOp::Open { sizes }
            | SequenceOp::Close { sizes }
            | SequenceOp::Tophat { sizes, .. } => sizes,
        }
    }

    /// Check if every size is odd
    pub fn has_odd_sizes(&self) -> bool {
        self.sizes().iter().all(|w| w % 2 == 1)
    }
}

/// A parsed morphological sequence
#[derive(Debug, Clone)]
pub struct MorphSequence {
    ops: Vec<SequenceOp>,
}

impl MorphSequence {
    /// Parse a sequence string
    ///
    /// # Errors
    ///
    /// Returns [`MorphError::InvalidSequence`] for an empty sequence, an
    /// unknown operation or malformed sizes.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndmorph_morph::sequence::MorphSequence;
    ///
    /// let seq = MorphSequence::parse("d3.3 + e5.5").unwrap();
    /// assert_eq!(seq.ops().len(), 2);
    /// ```
    pub fn parse(sequence: &str) -> MorphResult<Self> {
        if sequence.trim().is_empty() {
            return Err(MorphError::InvalidSequence("empty sequence".to_string()));
        }

        let mut ops = Vec::new();
        for (i, part) in sequence.split('+').enumerate() {
            let op_str: String = part.chars().filter(|c| !c.is_whitespace()).collect();
            if op_str.is_empty() {
                return Err(MorphError::InvalidSequence(format!(
                    "empty operation at position {}",
                    i + 1
                )));
            }
            ops.push(Self::parse_operation(&op_str)?);
        }
        Ok(MorphSequence { ops })
    }

    fn parse_operation(op_str: &str) -> MorphResult<SequenceOp> {
        let mut chars = op_str.chars();
        let first = chars
            .next()
            .map(|c| c.to_ascii_lowercase())
            .ok_or_else(|| MorphError::InvalidSequence("empty operation".to_string()))?;
        let rest = chars.as_str();

        match first {
            'd' => Ok(SequenceOp::Dilate {
                sizes: Self::parse_sizes(rest)?,
            }),
            'e' => Ok(SequenceOp::Erode {
                sizes: Self::parse_sizes(rest)?,
            }),
            'o' => Ok(SequenceOp::Open {
                sizes: Self::parse_sizes(rest)?,
            }),
            'c' => Ok(SequenceOp::Close {
                sizes: Self::parse_sizes(rest)?,
            }),
            't' => {
                let mut rest_chars = rest.chars();
                let white = match rest_chars.next().map(|c| c.to_ascii_lowercase()) {
                    Some('w') => true,
                    Some('b') => false,
                    other => {
                        return Err(MorphError::InvalidSequence(format!(
                            "invalid tophat type {:?} in '{}', expected 'w' or 'b'",
                            other, op_str
                        )));
                    }
                };
                Ok(SequenceOp::Tophat {
                    white,
                    sizes: Self::parse_sizes(rest_chars.as_str())?,
                })
            }
            _ => Err(MorphError::InvalidSequence(format!(
                "unknown operation '{}' in '{}'",
                first, op_str
            ))),
        }
    }

    /// Parse sizes from a string like "3.5.7" -> [3, 5, 7]
    fn parse_sizes(size_str: &str) -> MorphResult<Vec<usize>> {
        if size_str.is_empty() {
            return Err(MorphError::InvalidSequence(
                "missing box sizes".to_string(),
            ));
        }
        size_str
            .split('.')
            .map(|part| {
                let w: usize = part.parse().map_err(|_| {
                    MorphError::InvalidSequence(format!(
                        "invalid size '{}' in '{}'",
                        part, size_str
                    ))
                })?;
                if w == 0 {
                    return Err(MorphError::InvalidSequence(format!(
                        "sizes must be > 0, got '{}'",
                        size_str
                    )));
                }
                Ok(w)
            })
            .collect()
    }

    /// Get the operations in this sequence
    pub fn ops(&self) -> &[SequenceOp] {
        &self.ops
    }

    /// Check the sequence against an image dimension
    ///
    /// # Errors
    ///
    /// Returns [`MorphError::DimensionMismatch`] if an operation has the
    /// wrong number of sizes and [`MorphError::InvalidSequence`] if a size
    /// is even.
    pub fn verify(&self, dim: usize) -> MorphResult<()> {
        for (i, op) in self.ops.iter().enumerate() {
            if op.sizes().len() != dim {
                return Err(MorphError::DimensionMismatch {
                    expected: dim,
                    actual: op.sizes().len(),
                });
            }
            if !op.has_odd_sizes() {
                return Err(MorphError::InvalidSequence(format!(
                    "operation {} has even sizes {:?}; grayscale sizes must be odd",
                    i + 1,
                    op.sizes()
                )));
            }
        }
        Ok(())
    }

    /// Get the number of operations in the sequence
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Check if the sequence is empty
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Execute a grayscale morphological sequence on an image
///
/// The result covers the input's requested region.
///
/// # Errors
///
/// Returns the parse and verification errors of [`MorphSequence`] before
/// any operation runs, and any error of the operations themselves.
pub fn gray_morph_sequence<T, const D: usize>(
    image: &Image<T, D>,
    sequence: &str,
) -> MorphResult<Image<T, D>>
where
    T: Pixel + Sub<Output = T>,
{
    let seq = MorphSequence::parse(sequence)?;
    seq.verify(D)?;
    debug!(ops = seq.len(), sequence, "grayscale morphology sequence");

    let mut result = image.clone();
    for op in seq.ops() {
        result = execute_gray_op(&result, op)?;
    }
    Ok(result)
}

fn execute_gray_op<T, const D: usize>(
    image: &Image<T, D>,
    op: &SequenceOp,
) -> MorphResult<Image<T, D>>
where
    T: Pixel + Sub<Output = T>,
{
    let kernel = box_from_sizes::<D>(op.sizes())?;
    match op {
        SequenceOp::Dilate { .. } => dilate(image, &kernel),
        SequenceOp::Erode { .. } => erode(image, &kernel),
        SequenceOp::Open { .. } => open(image, &kernel),
        SequenceOp::Close { .. } => close(image, &kernel),
        SequenceOp::Tophat { white: true, .. } => top_hat(image, &kernel),
        SequenceOp::Tophat { white: false, .. } => bottom_hat(image, &kernel),
    }
}

fn box_from_sizes<const D: usize>(sizes: &[usize]) -> MorphResult<FlatKernel<D>> {
    if sizes.len() != D {
        return Err(MorphError::DimensionMismatch {
            expected: D,
            actual: sizes.len(),
        });
    }
    let mut radius = Size::<D>::default();
    for (axis, &w) in sizes.iter().enumerate() {
        radius.0[axis] = w / 2;
    }
    Ok(FlatKernel::box_kernel(radius))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndmorph_core::{Index, Region};

    #[test]
    fn test_parse_single_operation() {
        let seq = MorphSequence::parse("d3.5").unwrap();
        assert_eq!(seq.len(), 1);
        assert_eq!(seq.ops()[0], SequenceOp::Dilate { sizes: vec![3, 5] });
    }

    #[test]
    fn test_parse_multiple_operations() {
        let seq = MorphSequence::parse("e3.3 + O5.5.5 + c7 + TW3.3 + tb1.1").unwrap();
        assert_eq!(
            seq.ops(),
            &[
                SequenceOp::Erode { sizes: vec![3, 3] },
                SequenceOp::Open { sizes: vec![5, 5, 5] },
                SequenceOp::Close { sizes: vec![7] },
                SequenceOp::Tophat {
                    white: true,
                    sizes: vec![3, 3]
                },
                SequenceOp::Tophat {
                    white: false,
                    sizes: vec![1, 1]
                },
            ]
        );
    }

    #[test]
    fn test_parse_whitespace_handling() {
        let seq = MorphSequence::parse("  d 3 . 3  +   e5.5 ").unwrap();
        assert_eq!(seq.len(), 2);
    }

    #[test]
    fn test_parse_errors() {
        assert!(MorphSequence::parse("").is_err());
        assert!(MorphSequence::parse("d3.3 + ").is_err());
        assert!(MorphSequence::parse("x3.3").is_err());
        assert!(MorphSequence::parse("d").is_err());
        assert!(MorphSequence::parse("d3.").is_err());
        assert!(MorphSequence::parse("d0.3").is_err());
        assert!(MorphSequence::parse("tx3.3").is_err());
        assert!(MorphSequence::parse("t").is_err());
    }

    #[test]
    fn test_verify() {
        let seq = MorphSequence::parse("d3.3 + e5.5").unwrap();
        assert!(seq.verify(2).is_ok());
        assert!(matches!(
            seq.verify(3),
            Err(MorphError::DimensionMismatch { expected: 3, actual: 2 })
        ));
        let even = MorphSequence::parse("d3.4").unwrap();
        assert!(matches!(even.verify(2), Err(MorphError::InvalidSequence(_))));
    }

    #[test]
    fn test_sequence_matches_direct_calls() {
        let region = Region::from_size(Size([9, 7]));
        let input = Image::<u8, 2>::from_fn(region, |p| ((p[0] * 37 + p[1] * 11) % 97) as u8);
        let k3 = FlatKernel::box_kernel(Size([1, 1]));
        let k5 = FlatKernel::box_kernel(Size([2, 1]));

        let via_seq = gray_morph_sequence(&input, "e3.3 + o5.3").unwrap();
        let direct = open(&erode(&input, &k3).unwrap(), &k5).unwrap();
        assert_eq!(via_seq, direct);

        let hat = gray_morph_sequence(&input, "tb3.3").unwrap();
        assert_eq!(hat, bottom_hat(&input, &k3).unwrap());
    }

    #[test]
    fn test_sequence_rejects_before_running() {
        let region = Region::from_size(Size([4, 4]));
        let input = Image::<u8, 2>::allocate(region);
        assert!(gray_morph_sequence(&input, "d3.3.3").is_err());
        assert!(gray_morph_sequence(&input, "d3.3 + e2.2").is_err());
    }

    #[test]
    fn test_identity_sizes() {
        let region = Region::from_size(Size([3, 3]));
        let mut input = Image::<u8, 2>::allocate(region);
        input.set_pixel_at(&Index([1, 1]), 5);
        let out = gray_morph_sequence(&input, "d1.1 + e1.1").unwrap();
        assert_eq!(out, input);
    }
}
