//! Regression test parameters and operations

use crate::error::{TestError, TestResult};
use ndmorph_core::{Image, Pixel};

/// Regression test parameters
///
/// Tracks the test name, the index of the current comparison and every
/// failure seen so far. Comparisons never panic; the test asserts on
/// [`RegParams::cleanup`] at the end so that one run reports all failures.
pub struct RegParams {
    /// Name of the test (e.g., "anchor")
    pub test_name: String,
    /// Current comparison index (incremented before each comparison)
    index: usize,
    /// Overall success status
    success: bool,
    /// Recorded failures
    failures: Vec<TestError>,
}

impl RegParams {
    /// Create new regression test parameters
    pub fn new(test_name: &str) -> Self {
        eprintln!();
        eprintln!("////////////////////////////////////////////////");
        eprintln!("////////////////   {}_reg   ///////////////", test_name);
        eprintln!("////////////////////////////////////////////////");

        Self {
            test_name: test_name.to_string(),
            index: 0,
            success: true,
            failures: Vec::new(),
        }
    }

    /// Get the current comparison index
    pub fn index(&self) -> usize {
        self.index
    }

    fn fail(&mut self, err: TestError) {
        eprintln!("Failure in {}_reg: {}", self.test_name, err);
        self.failures.push(err);
        self.success = false;
    }

    /// Compare two floating-point values
    ///
    /// Returns `true` if the values match within `delta`.
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        self.index += 1;
        let diff = (expected - actual).abs();

        if diff > delta {
            self.fail(TestError::ValueMismatch {
                index: self.index,
                expected,
                actual,
                delta,
            });
            false
        } else {
            true
        }
    }

    /// Record a boolean check as a value comparison
    pub fn check(&mut self, ok: bool) -> bool {
        self.compare_values(1.0, if ok { 1.0 } else { 0.0 }, 0.0)
    }

    /// Compare two images for identical regions and pixels
    ///
    /// Returns `true` if the images are identical.
    pub fn compare_images<T: Pixel, const D: usize>(
        &mut self,
        expected: &Image<T, D>,
        actual: &Image<T, D>,
    ) -> bool {
        self.index += 1;

        if expected.buffered_region() != actual.buffered_region() {
            self.fail(TestError::ImageMismatch {
                index: self.index,
                detail: format!(
                    "region mismatch: {} vs {}",
                    expected.buffered_region(),
                    actual.buffered_region()
                ),
            });
            return false;
        }

        let region = expected.buffered_region();
        let mismatch = expected
            .data()
            .iter()
            .zip(actual.data())
            .position(|(a, b)| a != b);
        if let Some(offset) = mismatch {
            let at = region.index_at(offset);
            self.fail(TestError::ImageMismatch {
                index: self.index,
                detail: format!(
                    "pixel mismatch at {}: expected {:?}, got {:?}",
                    at,
                    expected.pixel_at(&at),
                    actual.pixel_at(&at)
                ),
            });
            return false;
        }

        true
    }

    /// Clean up and report results
    ///
    /// Returns `true` if all comparisons passed.
    pub fn cleanup(self) -> bool {
        if self.success {
            eprintln!("SUCCESS: {}_reg", self.test_name);
        } else {
            eprintln!("FAILURE: {}_reg", self.test_name);
            for failure in &self.failures {
                eprintln!("  {}", failure);
            }
        }
        eprintln!();

        self.success
    }

    /// Clean up and turn any failure into an error
    ///
    /// # Errors
    ///
    /// Returns [`TestError::Failed`] with the number of failed comparisons.
    pub fn finish(self) -> TestResult<()> {
        let test = self.test_name.clone();
        let count = self.failures.len();
        if self.cleanup() {
            Ok(())
        } else {
            Err(TestError::Failed { test, count })
        }
    }

    /// Check if all comparisons have passed so far
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Get list of failures
    pub fn failures(&self) -> &[TestError] {
        &self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndmorph_core::{Index, Region, Size};

    #[test]
    fn test_compare_values_success() {
        let mut rp = RegParams::new("test");
        assert!(rp.compare_values(100.0, 100.0, 0.0));
        assert!(rp.compare_values(100.0, 100.5, 1.0));
        assert!(rp.is_success());
        assert_eq!(rp.index(), 2);
    }

    #[test]
    fn test_compare_values_failure() {
        let mut rp = RegParams::new("test");
        assert!(!rp.compare_values(100.0, 200.0, 0.0));
        assert!(!rp.is_success());
        assert!(matches!(
            rp.failures()[0],
            TestError::ValueMismatch { index: 1, .. }
        ));
    }

    #[test]
    fn test_compare_images() {
        let region = Region::from_size(Size([3, 2]));
        let a = Image::<u8, 2>::new_filled(region, 4);
        let mut b = a.clone();
        let mut rp = RegParams::new("test");
        assert!(rp.compare_images(&a, &b));

        b.set_pixel_at(&Index([2, 1]), 5);
        assert!(!rp.compare_images(&a, &b));
        let c = Image::<u8, 2>::new_filled(Region::from_size(Size([2, 3])), 4);
        assert!(!rp.compare_images(&a, &c));
        assert_eq!(rp.failures().len(), 2);
    }

    #[test]
    fn test_finish_reports_count() {
        let mut rp = RegParams::new("test");
        rp.check(false);
        rp.check(true);
        rp.check(false);
        assert!(matches!(rp.finish(), Err(TestError::Failed { count: 2, .. })));
    }
}
