use egui::{Pos2, Vec2};

/// Axis-aligned Bounding Box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AaBB {
    pub min: Pos2,
    pub max: Pos2,
}

impl AaBB {
    pub fn from_min_size(
        min: Pos2,
        size: Vec2,
    ) -> Self {
        Self { min, max: min + size }
    }

    pub fn center(&self) -> Pos2 {
        Pos2::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    /// Overlap with a positive area; touching edges do not count
    pub fn intersects(
        &self,
        other: &AaBB,
    ) -> bool {
        self.min.x < other.max.x && other.min.x < self.max.x && self.min.y < other.max.y && other.min.y < self.max.y
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub center: Pos2,
    pub radius: f32,
}

impl Circle {
    pub fn bounding_box(&self) -> AaBB {
        AaBB {
            min: Pos2::new(self.center.x - self.radius, self.center.y - self.radius),
            max: Pos2::new(self.center.x + self.radius, self.center.y + self.radius),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn rect(
        min_x: f32,
        min_y: f32,
        max_x: f32,
        max_y: f32,
    ) -> AaBB {
        AaBB {
            min: Pos2::new(min_x, min_y),
            max: Pos2::new(max_x, max_y),
        }
    }

    #[rstest]
    #[case(rect(0.0, 0.0, 10.0, 10.0), rect(5.0, 5.0, 15.0, 15.0), true)]
    #[case(rect(0.0, 0.0, 10.0, 10.0), rect(2.0, 2.0, 3.0, 3.0), true)]
    #[case(rect(0.0, 0.0, 10.0, 10.0), rect(10.0, 0.0, 20.0, 10.0), false)]
    #[case(rect(0.0, 0.0, 10.0, 10.0), rect(0.0, 10.0, 10.0, 20.0), false)]
    #[case(rect(0.0, 0.0, 10.0, 10.0), rect(11.0, 11.0, 20.0, 20.0), false)]
    fn test_intersects(
        #[case] a: AaBB,
        #[case] b: AaBB,
        #[case] expected: bool,
    ) {
        assert_eq!(a.intersects(&b), expected);
        assert_eq!(b.intersects(&a), expected);
    }

    #[test]
    fn test_circle_bounding_box() {
        let circle = Circle {
            center: Pos2::new(20.0, 30.0),
            radius: 5.0,
        };
        let bb = circle.bounding_box();
        assert_eq!(bb, rect(15.0, 25.0, 25.0, 35.0));
        assert_eq!(bb.center(), circle.center);
    }
}
