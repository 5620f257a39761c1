//! Pixel value trait

use num_traits::Bounded;
use std::fmt::Debug;

/// Scalar pixel value usable by the morphology filters
///
/// Blanket-implemented for every type that is ordered, bounded and cheap
/// to copy between threads, which covers the primitive integer and float
/// types.
pub trait Pixel:
    Copy + PartialOrd + Bounded + Default + Debug + Send + Sync + 'static
{
}

impl<T> Pixel for T where
    T: Copy + PartialOrd + Bounded + Default + Debug + Send + Sync + 'static
{
}
