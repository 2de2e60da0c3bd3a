use core::ops::Sub;

/// Axis-aligned rectangle in bottom-up orientation (`top >= bottom`), matching the
/// viewport convention of the 3D engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rectangle<T> {
    pub left: T,
    pub top: T,
    pub right: T,
    pub bottom: T,
}

impl<T> Rectangle<T>
where
    T: Copy + Ord + Sub<Output = T>,
{
    pub fn new(left: T, top: T, right: T, bottom: T) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> T {
        self.right - self.left
    }

    pub fn height(&self) -> T {
        self.top - self.bottom
    }

    /// Returns the overlapping area of `self` and `other`.
    ///
    /// Disjoint rectangles produce a degenerate (zero width and/or height) rectangle anchored
    /// at the clipped lower-left corner.
    pub fn intersect(&self, other: &Self) -> Self {
        let left = self.left.max(other.left);
        let bottom = self.bottom.max(other.bottom);
        let right = self.right.min(other.right).max(left);
        let top = self.top.min(other.top).max(bottom);
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.top <= self.bottom
    }
}

impl Rectangle<u32> {
    /// Reinterprets the rectangle in signed coordinates, saturating at `i32::MAX`.
    pub fn to_signed(self) -> Rectangle<i32> {
        let conv = |v: u32| i32::try_from(v).unwrap_or(i32::MAX);
        Rectangle::new(
            conv(self.left),
            conv(self.top),
            conv(self.right),
            conv(self.bottom),
        )
    }
}

impl Rectangle<i32> {
    /// Clamps negative coordinates to zero.
    pub fn to_unsigned(self) -> Rectangle<u32> {
        let conv = |v: i32| u32::try_from(v).unwrap_or(0);
        Rectangle::new(
            conv(self.left),
            conv(self.top),
            conv(self.right),
            conv(self.bottom),
        )
    }
}
