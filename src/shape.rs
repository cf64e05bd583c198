/// Dimensions of a dense parameter tensor, stored row-major.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Shape {
    rows: usize,
    cols: usize,
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} x {}", self.rows, self.cols)
    }
}

impl Shape {
    pub fn new(rows: usize, cols: usize) -> Self {
        assert!(rows > 0, "Cannot have 0 rows!");
        assert!(cols > 0, "Cannot have 0 columns!");
        Self { rows, cols }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn size(&self) -> usize {
        self.rows * self.cols
    }
}

/// Dimensions of one batch element of a spatial feature tensor, laid out
/// height x width x channels with the channel index fastest.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaneShape {
    rows: usize,
    cols: usize,
    channels: usize,
}

impl std::fmt::Display for PlaneShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} x {} x {}", self.rows, self.cols, self.channels)
    }
}

impl PlaneShape {
    pub fn new(rows: usize, cols: usize, channels: usize) -> Self {
        assert!(rows > 0 && cols > 0, "Cannot have an empty board!");
        assert!(channels > 0, "Cannot have 0 channels!");
        Self { rows, cols, channels }
    }

    /// Square board of the given edge length.
    pub fn square(edge: usize, channels: usize) -> Self {
        Self::new(edge, edge, channels)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn spatial_size(&self) -> usize {
        self.rows * self.cols
    }

    pub fn size(&self) -> usize {
        self.rows * self.cols * self.channels
    }

    /// Same spatial extent with a different channel count.
    pub fn with_channels(&self, channels: usize) -> Self {
        Self::new(self.rows, self.cols, channels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_shape_sizes() {
        let shape = PlaneShape::square(11, 10);
        assert_eq!(shape.spatial_size(), 121);
        assert_eq!(shape.size(), 1210);
        assert_eq!(shape.with_channels(32), PlaneShape::new(11, 11, 32));
    }

    #[test]
    #[should_panic]
    fn zero_channels_rejected() {
        let _ = PlaneShape::new(11, 11, 0);
    }
}
