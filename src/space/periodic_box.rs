use ndarray::{Array1, ArrayView1};

/// A simulation cell with periodic boundary conditions.
///
/// The `PeriodicBox` struct provides the geometric primitives the
/// observable engines need: the minimum-image separation between two
/// positions, the corresponding distance, the cell volume, and wrapping
/// of a position to its fundamental image.
///
/// Edge lengths are stored per axis; a cubic cell is the special case
/// produced by [`PeriodicBox::cubic`].
#[derive(Debug, PartialEq)]
pub struct PeriodicBox<const D: usize> {
    /// The lengths of the box in each spatial dimension.
    length: [f64; D],
}

impl<const D: usize> PeriodicBox<D> {
    /// Creates a new `PeriodicBox` instance.
    ///
    /// # Arguments
    /// * `length` - The length of the box in each spatial dimension.
    ///
    /// # Panics
    /// Panics if any value in `length` is less than or equal to zero.
    pub fn new(length: [f64; D]) -> Self {
        assert!(
            length.iter().all(|&l| l > 0.0),
            "All box lengths must be positive."
        );
        Self { length }
    }

    /// Creates a cubic `PeriodicBox` with the given edge length.
    ///
    /// # Panics
    /// Panics if `side` is less than or equal to zero.
    pub fn cubic(side: f64) -> Self {
        Self::new([side; D])
    }

    /// Returns the edge lengths of the box.
    pub fn lengths(&self) -> &[f64; D] {
        &self.length
    }

    /// Returns the shortest edge length of the box.
    ///
    /// The minimum-image separation is unique only for distances up to
    /// half this value.
    pub fn shortest_length(&self) -> f64 {
        self.length.iter().cloned().fold(f64::INFINITY, f64::min)
    }

    /// D-dimensional volume of the cell.
    pub fn volume(&self) -> f64 {
        self.length.iter().product()
    }

    /// Computes the minimum-image separation between two positions.
    ///
    /// This function calculates the difference `r1 - r2` and folds each
    /// component back into `[-length/2, length/2]` by subtracting the
    /// nearest integer multiple of the corresponding box length:
    /// `d - length * (d / length).round()`. The inputs may be unwrapped
    /// or drifted arbitrarily far outside the cell.
    ///
    /// Rounding ties break half away from zero (`f64::round`): a
    /// component of exactly `+length/2` maps to `-length/2`, never the
    /// other way around.
    ///
    /// # Arguments
    /// * `r1` - The first position.
    /// * `r2` - The second position.
    ///
    /// # Returns
    /// A fixed-size array containing the minimum-image separation
    /// between `r1` and `r2` for each dimension.
    ///
    /// # Panics
    /// Panics in debug builds if the dimensions of `r1`, `r2`, and the
    /// box lengths do not match.
    pub fn difference<'a, A, B>(&self, r1: A, r2: B) -> [f64; D]
    where
        A: Into<ArrayView1<'a, f64>>,
        B: Into<ArrayView1<'a, f64>>,
    {
        let r1_view = r1.into();
        let r2_view = r2.into();

        debug_assert_eq!(
            r1_view.len(),
            r2_view.len(),
            "Arrays must have the same shape"
        );
        debug_assert_eq!(
            r1_view.len(),
            D,
            "Input array lengths must match the dimensionality of the box"
        );

        let mut result = [0.0; D];
        for i in 0..D {
            let diff = r1_view[i] - r2_view[i];
            result[i] = diff - self.length[i] * (diff / self.length[i]).round();
        }
        result
    }

    /// Computes the squared minimum-image distance between two positions.
    ///
    /// The pair-histogram loop compares squared norms against a squared
    /// cutoff, so the square root is deferred to the caller.
    pub fn distance_squared<'a, A, B>(&self, r1: A, r2: B) -> f64
    where
        A: Into<ArrayView1<'a, f64>>,
        B: Into<ArrayView1<'a, f64>>,
    {
        let diff = self.difference(r1, r2);
        diff.iter().map(|&d| d * d).sum()
    }

    /// Computes the Euclidean distance between two positions under
    /// periodic boundary conditions.
    ///
    /// # Arguments
    /// * `r1` - The first position.
    /// * `r2` - The second position.
    ///
    /// # Returns
    /// The distance between `r1` and `r2` under the minimum image
    /// convention.
    pub fn distance<'a, A, B>(&self, r1: A, r2: B) -> f64
    where
        A: Into<ArrayView1<'a, f64>>,
        B: Into<ArrayView1<'a, f64>>,
    {
        self.distance_squared(r1, r2).sqrt()
    }

    /// Maps a position to its fundamental image within the periodic box.
    ///
    /// The returned position has every component wrapped into
    /// `[0, length)` for the corresponding dimension.
    ///
    /// # Arguments
    /// * `r` - The position as an array view.
    ///
    /// # Returns
    /// A 1D array containing the position wrapped into the fundamental
    /// image.
    pub fn fundamental_image<'a, A>(&self, r: A) -> Array1<f64>
    where
        A: Into<ArrayView1<'a, f64>>,
    {
        r.into()
            .iter()
            .zip(&self.length)
            .map(|(&x, &l)| x.rem_euclid(l))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::PeriodicBox;
    use ndarray::array;

    #[test]
    fn test_difference_orthorhombic() {
        let pbc = PeriodicBox::new([1.0, 1.0, 2.0]);
        let diff = pbc.difference(&array![0.4, 1.1, 1.8], &array![0.0, 0.0, 0.0]);
        let expected = [0.4, 0.1, -0.2];
        for i in 0..3 {
            assert!((diff[i] - expected[i]).abs() < 1e-15);
        }
    }

    #[test]
    fn test_difference_golden_neighbor() {
        // Atoms at x = 0 and x = 9 in a box of side 10 are one unit
        // apart through the boundary, not nine.
        let pbc = PeriodicBox::cubic(10.0);
        let diff = pbc.difference(&array![9.0, 0.0, 0.0], &array![0.0, 0.0, 0.0]);
        assert_eq!(diff, [-1.0, 0.0, 0.0]);
        assert!((pbc.distance(&array![9.0, 0.0, 0.0], &array![0.0, 0.0, 0.0]) - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_difference_antisymmetry() {
        let pbc = PeriodicBox::new([3.0, 5.0, 7.0]);
        let r1 = array![2.9, -1.3, 10.2];
        let r2 = array![0.1, 4.8, -2.6];
        let forward = pbc.difference(&r1, &r2);
        let backward = pbc.difference(&r2, &r1);
        for i in 0..3 {
            assert!((forward[i] + backward[i]).abs() < 1e-12);
        }
        assert!((pbc.distance(&r1, &r2) - pbc.distance(&r2, &r1)).abs() < 1e-12);
    }

    #[test]
    fn test_difference_within_half_box() {
        let pbc = PeriodicBox::new([2.0, 4.0, 6.0]);
        let probes = [
            array![1.7, -3.9, 17.2],
            array![-25.0, 8.01, 2.99],
            array![0.5, 0.5, 0.5],
        ];
        let origin = array![0.2, -0.7, 1.3];
        for r in &probes {
            let diff = pbc.difference(r, &origin);
            for (i, &l) in pbc.lengths().iter().enumerate() {
                assert!(
                    diff[i].abs() <= l / 2.0 + 1e-12,
                    "component {} out of bounds: {}",
                    i,
                    diff[i]
                );
            }
        }
    }

    #[test]
    fn test_half_length_tie_break() {
        // A separation of exactly +L/2 wraps to -L/2 (round half away
        // from zero), deterministically.
        let pbc = PeriodicBox::<3>::cubic(10.0);
        let diff = pbc.difference(&array![5.0, 0.0, 0.0], &array![0.0, 0.0, 0.0]);
        assert_eq!(diff[0], -5.0);
        // The magnitude is unchanged either way.
        assert!((pbc.distance(&array![5.0, 0.0, 0.0], &array![0.0, 0.0, 0.0]) - 5.0).abs() < 1e-15);
    }

    #[test]
    fn test_distance_across_boundaries() {
        let pbc = PeriodicBox::new([1.0, 2.0, 3.0]);
        // Nearest image is 0.2 away along each axis.
        let dist = pbc.distance(&array![0.9, 1.9, 2.9], &array![0.1, 0.1, 0.1]);
        let expected = (3.0f64 * 0.2 * 0.2).sqrt();
        assert!((dist - expected).abs() < 1e-10);

        // Periodic images of the same point are at distance zero.
        let dist = pbc.distance(&array![0.5, 1.0, 1.0], &array![-0.5, 5.0, -5.0]);
        assert!(dist.abs() < 1e-10);
    }

    #[test]
    fn test_fundamental_image() {
        let pbc = PeriodicBox::new([1.0, 2.0, 4.0]);
        let image = pbc.fundamental_image(&array![0.6, -3.1, 10.8]);
        let expected = array![0.6, 0.9, 2.8];
        for i in 0..3 {
            assert!((image[i] - expected[i]).abs() < 1e-12);
        }
        let image = pbc.fundamental_image(&array![-3.0, 0.0, 8.0]);
        for i in 0..3 {
            assert!((image[i] - 0.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_volume() {
        assert!((PeriodicBox::new([2.0, 3.0, 4.0]).volume() - 24.0).abs() < 1e-15);
        assert!((PeriodicBox::<3>::cubic(2.0).volume() - 8.0).abs() < 1e-15);
    }

    #[test]
    #[should_panic(expected = "positive")]
    fn test_rejects_non_positive_length() {
        let _ = PeriodicBox::new([1.0, 0.0, 1.0]);
    }
}
