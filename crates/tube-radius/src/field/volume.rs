//! Dense 3-D voxel volume with a physical-space transform.

use nalgebra::Vector3;

use super::SampleableField;

/// Errors returned when constructing a [`Volume`].
#[derive(Debug, Clone, PartialEq)]
pub enum VolumeError {
    /// Buffer length does not match the requested dimensions.
    SizeMismatch {
        /// `nx * ny * nz`.
        expected: usize,
        /// Provided buffer length.
        actual: usize,
    },
    /// A spacing component is not strictly positive and finite.
    InvalidSpacing([f64; 3]),
    /// The origin has a non-finite component.
    InvalidOrigin([f64; 3]),
}

impl std::fmt::Display for VolumeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SizeMismatch { expected, actual } => {
                write!(f, "size mismatch: expected {}, got {}", expected, actual)
            }
            Self::InvalidSpacing(s) => write!(f, "invalid voxel spacing {:?}", s),
            Self::InvalidOrigin(o) => write!(f, "invalid volume origin {:?}", o),
        }
    }
}

impl std::error::Error for VolumeError {}

/// Voxel grid stored x-fastest (`index = x + nx * (y + ny * z)`).
///
/// Voxel `(i, j, k)` sits at physical position
/// `origin + (i * sx, j * sy, k * sz)`. Sampling is trilinear; positions whose
/// 2x2x2 neighbourhood leaves the grid are out of bounds.
#[derive(Debug, Clone)]
pub struct Volume<T> {
    dims: [usize; 3],
    origin: Vector3<f64>,
    spacing: Vector3<f64>,
    data: Vec<T>,
}

impl<T: Copy + Into<f64>> Volume<T> {
    /// Wrap a voxel buffer with unit spacing and zero origin.
    pub fn from_vec(dims: [usize; 3], data: Vec<T>) -> Result<Self, VolumeError> {
        Self::with_geometry(dims, [0.0; 3], [1.0; 3], data)
    }

    /// Wrap a voxel buffer with explicit physical geometry.
    pub fn with_geometry(
        dims: [usize; 3],
        origin: [f64; 3],
        spacing: [f64; 3],
        data: Vec<T>,
    ) -> Result<Self, VolumeError> {
        let expected = dims[0] * dims[1] * dims[2];
        if data.len() != expected {
            return Err(VolumeError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        if spacing.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(VolumeError::InvalidSpacing(spacing));
        }
        if origin.iter().any(|o| !o.is_finite()) {
            return Err(VolumeError::InvalidOrigin(origin));
        }
        Ok(Self {
            dims,
            origin: Vector3::from(origin),
            spacing: Vector3::from(spacing),
            data,
        })
    }

    /// Build a volume by evaluating `f` at every voxel's physical position.
    pub fn from_fn(
        dims: [usize; 3],
        origin: [f64; 3],
        spacing: [f64; 3],
        mut f: impl FnMut(Vector3<f64>) -> T,
    ) -> Result<Self, VolumeError> {
        let mut data = Vec::with_capacity(dims[0] * dims[1] * dims[2]);
        for k in 0..dims[2] {
            for j in 0..dims[1] {
                for i in 0..dims[0] {
                    let p = Vector3::new(
                        origin[0] + i as f64 * spacing[0],
                        origin[1] + j as f64 * spacing[1],
                        origin[2] + k as f64 * spacing[2],
                    );
                    data.push(f(p));
                }
            }
        }
        Self::with_geometry(dims, origin, spacing, data)
    }

    /// Grid dimensions `[nx, ny, nz]`.
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Physical position of voxel `(0, 0, 0)`.
    pub fn origin(&self) -> Vector3<f64> {
        self.origin
    }

    /// Physical voxel size.
    pub fn spacing(&self) -> Vector3<f64> {
        self.spacing
    }

    /// Voxel value at integer index, if inside the grid.
    pub fn get(&self, i: usize, j: usize, k: usize) -> Option<T> {
        if i >= self.dims[0] || j >= self.dims[1] || k >= self.dims[2] {
            return None;
        }
        self.data
            .get(i + self.dims[0] * (j + self.dims[1] * k))
            .copied()
    }

    /// Map a physical position to continuous voxel coordinates.
    pub fn physical_to_index(&self, p: &Vector3<f64>) -> Vector3<f64> {
        (p - self.origin).component_div(&self.spacing)
    }

    /// Map continuous voxel coordinates to a physical position.
    pub fn index_to_physical(&self, idx: &Vector3<f64>) -> Vector3<f64> {
        self.origin + idx.component_mul(&self.spacing)
    }

    fn trilinear(&self, idx: &Vector3<f64>) -> Option<f64> {
        let mut base = [0usize; 3];
        let mut frac = [0.0f64; 3];
        for a in 0..3 {
            let c = idx[a];
            if !c.is_finite() || c < 0.0 || self.dims[a] < 2 {
                return None;
            }
            let c0 = c.floor();
            if c0 >= (self.dims[a] - 1) as f64 {
                return None;
            }
            base[a] = c0 as usize;
            frac[a] = c - c0;
        }

        let [nx, ny, _] = self.dims;
        let at = |i: usize, j: usize, k: usize| -> f64 { self.data[i + nx * (j + ny * k)].into() };
        let [i, j, k] = base;
        let [fx, fy, fz] = frac;

        let c00 = at(i, j, k) * (1.0 - fx) + at(i + 1, j, k) * fx;
        let c10 = at(i, j + 1, k) * (1.0 - fx) + at(i + 1, j + 1, k) * fx;
        let c01 = at(i, j, k + 1) * (1.0 - fx) + at(i + 1, j, k + 1) * fx;
        let c11 = at(i, j + 1, k + 1) * (1.0 - fx) + at(i + 1, j + 1, k + 1) * fx;
        let c0 = c00 * (1.0 - fy) + c10 * fy;
        let c1 = c01 * (1.0 - fy) + c11 * fy;
        Some(c0 * (1.0 - fz) + c1 * fz)
    }
}

impl<T: Copy + Into<f64>> SampleableField<3> for Volume<T> {
    #[inline]
    fn sample(&self, position: &Vector3<f64>) -> Option<f64> {
        let v = self.trilinear(&self.physical_to_index(position))?;
        v.is_finite().then_some(v)
    }

    fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
