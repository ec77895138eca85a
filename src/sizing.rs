//! Sizing modes and manual placement geometry.
//!
//! Computes the child box (width, height, top, left) that covers or fits a
//! container while preserving the child's aspect ratio. Pure geometry — no
//! host-tree access, no state.
//!
//! # Ratio convention
//!
//! Throughout this crate, **ratio = width / height** (landscape ratio: a
//! 1600×900 image has ratio ≈ 1.78). Callers holding the height/width
//! convention must invert (`1.0 / ratio`) before calling in.
//!
//! # Example
//!
//! ```
//! use fgsize::{SizingMode, compute_manual};
//!
//! // A 2:1 child covering a 400×200 container fits exactly.
//! let p = compute_manual(400.0, 200.0, 2.0, SizingMode::Cover);
//! assert_eq!((p.width, p.height, p.top, p.left), (400.0, 200.0, 0.0, 0.0));
//! ```

use core::fmt;
use core::str::FromStr;

use crate::LayoutError;

/// How the child's box relates to its container's box.
///
/// Closed set: every consumer matches exhaustively, so an unmapped mode is a
/// compile error rather than a runtime fallthrough. Unknown mode *tokens*
/// fail at parse time with [`LayoutError::InvalidSizingMode`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum SizingMode {
    /// Fill the container fully, cropping overflow symmetrically.
    #[default]
    Cover,
    /// Fit fully inside the container, possibly leaving empty space.
    Contain,
    /// Pin width to the container; height follows the ratio.
    ContainX,
    /// Pin height to the container; width follows the ratio.
    ContainY,
}

impl SizingMode {
    /// The CSS `background-size` value that delegates this mode to the host
    /// styling engine.
    pub const fn native_background_size(self) -> &'static str {
        match self {
            Self::Cover => "cover",
            Self::Contain => "contain",
            Self::ContainX => "100% auto",
            Self::ContainY => "auto 100%",
        }
    }
}

impl FromStr for SizingMode {
    type Err = LayoutError;

    /// Parse the legacy mode tokens: `cover`, `contain`, `containX`,
    /// `containY`. Anything else is [`LayoutError::InvalidSizingMode`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cover" => Ok(Self::Cover),
            "contain" => Ok(Self::Contain),
            "containX" => Ok(Self::ContainX),
            "containY" => Ok(Self::ContainY),
            other => Err(LayoutError::InvalidSizingMode(other.to_string())),
        }
    }
}

impl fmt::Display for SizingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cover => "cover",
            Self::Contain => "contain",
            Self::ContainX => "containX",
            Self::ContainY => "containY",
        })
    }
}

/// Computed child box in CSS pixels, centered within the container.
///
/// `top` and `left` may be negative — that is the symmetric crop overflow
/// [`SizingMode::Cover`] is meant to produce.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Placement {
    /// Child width.
    pub width: f64,
    /// Child height.
    pub height: f64,
    /// Offset from the container's top edge.
    pub top: f64,
    /// Offset from the container's left edge.
    pub left: f64,
}

/// Compute the manual placement of a child with the given aspect ratio
/// (width/height) inside a `container_w` × `container_h` box.
///
/// The result is always centered on both axes:
/// `top + height/2 == container_h/2` and `left + width/2 == container_w/2`.
///
/// Precondition (not guarded): a zero-area container or a non-positive ratio
/// produces non-finite geometry. Callers must treat a zero-area container as
/// "not laid out yet" and skip recomputation instead of calling in.
pub fn compute_manual(
    container_w: f64,
    container_h: f64,
    ratio: f64,
    mode: SizingMode,
) -> Placement {
    // One axis matches the container exactly; the other follows the ratio.
    let level_width = || (container_w, container_w / ratio);
    let level_height = || (container_h * ratio, container_h);

    let (width, height) = match mode {
        SizingMode::Contain => {
            if container_w / container_h < ratio {
                level_width()
            } else {
                level_height()
            }
        }
        SizingMode::Cover => {
            if container_w / container_h < ratio {
                level_height()
            } else {
                level_width()
            }
        }
        SizingMode::ContainX => level_width(),
        SizingMode::ContainY => level_height(),
    };

    Placement {
        width,
        height,
        top: (container_h - height) / 2.0,
        left: (container_w - width) / 2.0,
    }
}
