//! Selections and source dimensions.
//!
//! A source's `shape` and `labels` describe an n-dimensional stack of 2D
//! planes. The `x` and `y` labels (plus `_rgb` for interleaved sources) are
//! plane axes; every other label is a selection axis, and a [`Selection`]
//! picks exactly one index along each of them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PixelSourceError;

/// Horizontal plane axis.
pub const X_LABEL: &str = "x";

/// Vertical plane axis.
pub const Y_LABEL: &str = "y";

/// Depth axis used by volume assembly.
pub const Z_LABEL: &str = "z";

/// Trailing axis of interleaved (pixel-major, multi-sample) sources.
pub const INTERLEAVE_LABEL: &str = "_rgb";

// =============================================================================
// Selection
// =============================================================================

/// Mapping from dimension label to index, identifying one plane.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection(BTreeMap<String, usize>);

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Selection::set`].
    pub fn with(mut self, label: impl Into<String>, index: usize) -> Self {
        self.set(label, index);
        self
    }

    pub fn set(&mut self, label: impl Into<String>, index: usize) {
        self.0.insert(label.into(), index);
    }

    pub fn get(&self, label: &str) -> Option<usize> {
        self.0.get(label).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(label, &index)| (label.as_str(), index))
    }
}

impl<K: Into<String>> FromIterator<(K, usize)> for Selection {
    fn from_iter<T: IntoIterator<Item = (K, usize)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<K: Into<String>, const N: usize> From<[(K, usize); N]> for Selection {
    fn from(entries: [(K, usize); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (label, index)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", label, index)?;
        }
        f.write_str("}")
    }
}

// =============================================================================
// Dimensions
// =============================================================================

/// Validated shape and labels of a pixel source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimensions {
    shape: Vec<usize>,
    labels: Vec<String>,
    width: u32,
    height: u32,
    interleaved: bool,
}

impl Dimensions {
    /// Validate `shape` against `labels`.
    ///
    /// Requires equal lengths, unique labels, non-empty `x` and `y` axes,
    /// and `_rgb` (if present) as the last label.
    pub fn new<S: Into<String>>(
        shape: Vec<usize>,
        labels: impl IntoIterator<Item = S>,
    ) -> Result<Self, PixelSourceError> {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();

        if shape.len() != labels.len() {
            return Err(PixelSourceError::invalid_shape(format!(
                "shape has {} entries but there are {} labels",
                shape.len(),
                labels.len()
            )));
        }

        for (i, label) in labels.iter().enumerate() {
            if labels[..i].contains(label) {
                return Err(PixelSourceError::invalid_shape(format!(
                    "duplicate label '{}'",
                    label
                )));
            }
        }

        let interleaved = match labels.iter().position(|l| l == INTERLEAVE_LABEL) {
            Some(i) if i + 1 == labels.len() => true,
            Some(_) => {
                return Err(PixelSourceError::invalid_shape(format!(
                    "'{}' must be the last label",
                    INTERLEAVE_LABEL
                )))
            }
            None => false,
        };

        let plane_extent = |axis: &str| -> Result<u32, PixelSourceError> {
            let i = labels
                .iter()
                .position(|l| l == axis)
                .ok_or_else(|| PixelSourceError::invalid_shape(format!("missing '{}' axis", axis)))?;
            match u32::try_from(shape[i]) {
                Ok(0) | Err(_) => Err(PixelSourceError::invalid_shape(format!(
                    "'{}' extent {} is not a valid plane size",
                    axis, shape[i]
                ))),
                Ok(extent) => Ok(extent),
            }
        };
        let width = plane_extent(X_LABEL)?;
        let height = plane_extent(Y_LABEL)?;

        Ok(Self {
            shape,
            labels,
            width,
            height,
            interleaved,
        })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Plane width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Plane height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether samples of a pixel are stored contiguously.
    pub fn is_interleaved(&self) -> bool {
        self.interleaved
    }

    /// Samples per pixel in a returned raster.
    pub fn bands(&self) -> usize {
        if self.interleaved {
            self.shape[self.shape.len() - 1]
        } else {
            1
        }
    }

    /// Extent of the axis named `label`.
    pub fn extent_of(&self, label: &str) -> Option<usize> {
        self.labels
            .iter()
            .position(|l| l == label)
            .map(|i| self.shape[i])
    }

    /// Labels a selection must index.
    pub fn selection_labels(&self) -> impl Iterator<Item = &str> {
        self.labels
            .iter()
            .map(String::as_str)
            .filter(|l| !is_plane_axis(l))
    }

    /// Check that `selection` names exactly the selection axes, in range.
    pub fn validate(&self, selection: &Selection) -> Result<(), PixelSourceError> {
        for (label, index) in selection.iter() {
            let extent = match self.labels.iter().position(|l| l == label) {
                Some(i) if !is_plane_axis(label) => self.shape[i],
                _ => {
                    return Err(PixelSourceError::invalid_selection(format!(
                        "unknown selection label '{}'",
                        label
                    )))
                }
            };
            if index >= extent {
                return Err(PixelSourceError::invalid_selection(format!(
                    "index {} out of range for '{}' (extent {})",
                    index, label, extent
                )));
            }
        }

        if let Some(missing) = self
            .selection_labels()
            .find(|label| selection.get(label).is_none())
        {
            return Err(PixelSourceError::invalid_selection(format!(
                "missing selection label '{}'",
                missing
            )));
        }

        Ok(())
    }
}

fn is_plane_axis(label: &str) -> bool {
    label == X_LABEL || label == Y_LABEL || label == INTERLEAVE_LABEL
}

// =============================================================================
// Tests
// =============================================================================
