//! Box (bounded array) observation/action space

use super::Space;
use ndarray::{ArrayD, IxDyn, Zip};
use rand::distributions::uniform::SampleUniform;
use rand::Rng;
use rand_distr::{Distribution, Uniform};

/// Box space for bounded values of element type `T`
///
/// Image observations use `Box<u8>` with bounds `[0, 255]`.
#[derive(Clone, Debug)]
pub struct Box<T = f32> {
    /// Lower bound for each element
    pub low: ArrayD<T>,
    /// Upper bound for each element
    pub high: ArrayD<T>,
    /// Shape of the space
    shape: Vec<usize>,
}

impl<T> Box<T>
where
    T: Copy + PartialOrd,
{
    /// Create a new box space with given bounds
    pub fn new(low: ArrayD<T>, high: ArrayD<T>) -> Self {
        assert_eq!(low.shape(), high.shape(), "Low and high must have same shape");
        assert!(
            low.iter().zip(high.iter()).all(|(l, h)| l <= h),
            "Low must not exceed high"
        );
        let shape = low.shape().to_vec();
        Self { low, high, shape }
    }

    /// Create a box space with uniform bounds
    pub fn uniform(shape: &[usize], low: T, high: T) -> Self {
        let low_arr = ArrayD::from_elem(IxDyn(shape), low);
        let high_arr = ArrayD::from_elem(IxDyn(shape), high);
        Self::new(low_arr, high_arr)
    }

    /// Scalar bounds if every element shares the same range
    pub fn bounds(&self) -> Option<(T, T)> {
        let l = *self.low.iter().next()?;
        let h = *self.high.iter().next()?;
        let uniform = self.low.iter().all(|&v| v == l) && self.high.iter().all(|&v| v == h);
        uniform.then_some((l, h))
    }
}

impl Box<f32> {
    /// Create a unit box [0, 1] for all elements
    pub fn unit(shape: &[usize]) -> Self {
        Self::uniform(shape, 0.0, 1.0)
    }

    /// Create a symmetric box [-1, 1] for all elements
    pub fn symmetric(shape: &[usize]) -> Self {
        Self::uniform(shape, -1.0, 1.0)
    }
}

impl<T> Space for Box<T>
where
    T: Copy + PartialOrd + SampleUniform + Send + Sync,
{
    type Sample = ArrayD<T>;

    fn sample<R: Rng>(&self, rng: &mut R) -> Self::Sample {
        Zip::from(&self.low)
            .and(&self.high)
            .map_collect(|&l, &h| Uniform::new_inclusive(l, h).sample(rng))
    }

    fn contains(&self, value: &Self::Sample) -> bool {
        if value.shape() != self.low.shape() {
            return false;
        }
        value
            .iter()
            .zip(self.low.iter())
            .zip(self.high.iter())
            .all(|((v, l), h)| v >= l && v <= h)
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }
}
