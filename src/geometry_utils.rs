use crate::Point2D;

pub fn distance(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    ((x2 - x1).powf(2.0) + (y2 - y1).powf(2.0)).sqrt()
}

/// Displacement (dx, dy) from one point to the next
pub fn displacement(from: &Point2D, to: &Point2D) -> Point2D {
    (to.0 - from.0, to.1 - from.1)
}

/// Which axis dominates a displacement; None when both are equal in magnitude
pub fn dominant_axis(dx: f32, dy: f32) -> Option<Axis> {
    let (ax, ay) = (dx.abs(), dy.abs());
    if ax > ay {
        Some(Axis::Horizontal)
    } else if ay > ax {
        Some(Axis::Vertical)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        assert_eq!(distance(0., 0., 3., 4.), 5.);
        assert_eq!(distance(1., 1., 4., 5.), 5.);
        assert_eq!(distance(0.5, 0.5, 0.5, 0.5), 0.);
    }

    #[test]
    fn test_displacement() {
        assert_eq!(displacement(&(1., 1.), &(3., 0.)), (2., -1.));
    }

    #[test]
    fn test_dominant_axis() {
        assert_eq!(dominant_axis(0.2, 0.1), Some(Axis::Horizontal));
        assert_eq!(dominant_axis(-0.2, 0.1), Some(Axis::Horizontal));
        assert_eq!(dominant_axis(0.01, -0.3), Some(Axis::Vertical));
        assert_eq!(dominant_axis(0.1, -0.1), None); // tie
        assert_eq!(dominant_axis(0., 0.), None);
    }
}
