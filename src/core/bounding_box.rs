use cgmath::Point3;

/// An axis-aligned box in world space.
///
/// `min` is inclusive and `max` is exclusive on every axis, so the boxes of two
/// adjacent chunks share a face without overlapping.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingBox {
    /// The inclusive minimum corner
    pub min: Point3<f32>,
    /// The exclusive maximum corner
    pub max: Point3<f32>,
}

impl BoundingBox {
    /// Creates a box from its two corners.
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        BoundingBox { min, max }
    }

    /// Returns `true` if `point` lies inside the box.
    pub fn contains(&self, point: Point3<f32>) -> bool {
        point.x >= self.min.x
            && point.x < self.max.x
            && point.y >= self.min.y
            && point.y < self.max.y
            && point.z >= self.min.z
            && point.z < self.max.z
    }

    /// Returns `true` if the horizontal projection of `point` lies inside the box.
    ///
    /// Chunks span the full world height, so an observer flying above the top of
    /// the world is still "inside" the chunk below them.
    pub fn contains_horizontal(&self, point: Point3<f32>) -> bool {
        point.x >= self.min.x
            && point.x < self.max.x
            && point.z >= self.min.z
            && point.z < self.max.z
    }

    /// Returns `true` if the unit block whose minimum corner is `(x, y, z)` lies
    /// inside the box.
    pub fn contains_block(&self, x: i32, y: i32, z: i32) -> bool {
        self.contains(Point3::new(x as f32, y as f32, z as f32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_corner_is_exclusive() {
        let bb = BoundingBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(16.0, 128.0, 16.0));
        assert!(bb.contains_block(0, 0, 0));
        assert!(bb.contains_block(15, 127, 15));
        assert!(!bb.contains_block(16, 0, 0));
        assert!(!bb.contains_block(0, -1, 0));
    }

    #[test]
    fn horizontal_containment_ignores_height() {
        let bb = BoundingBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(16.0, 128.0, 16.0));
        assert!(bb.contains_horizontal(Point3::new(4.0, 500.0, 4.0)));
        assert!(!bb.contains(Point3::new(4.0, 500.0, 4.0)));
    }
}
