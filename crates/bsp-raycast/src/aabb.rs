//! Axis-aligned bounding boxes.

use nalgebra::{Point3, Vector3};

use crate::{Ray, Real};

/// An axis-aligned box given by its two extreme corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Corner with the smallest coordinate on every axis.
    pub min: Point3<Real>,
    /// Corner with the largest coordinate on every axis.
    pub max: Point3<Real>,
}

impl Aabb {
    /// Creates a box from its two corners.
    pub fn new(min: Point3<Real>, max: Point3<Real>) -> Self {
        Self { min, max }
    }

    /// Creates an empty-volume box around a single point.
    pub fn from_point(point: Point3<Real>) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Creates the smallest box containing all points.
    ///
    /// Returns `None` if the iterator is empty.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point3<Real>>,
    {
        let mut points = points.into_iter();
        let mut aabb = Self::from_point(points.next()?);
        for point in points {
            aabb.grow(point);
        }
        Some(aabb)
    }

    /// Extends the box to contain `point`.
    pub fn grow(&mut self, point: Point3<Real>) {
        for axis in 0..3 {
            self.min[axis] = self.min[axis].min(point[axis]);
            self.max[axis] = self.max[axis].max(point[axis]);
        }
    }

    /// Extends the box to contain `other`.
    pub fn merge(&mut self, other: &Aabb) {
        self.grow(other.min);
        self.grow(other.max);
    }

    /// Returns a copy grown by `amount` on every side.
    pub fn inflated(&self, amount: Real) -> Self {
        let delta = Vector3::repeat(amount);
        Self {
            min: self.min - delta,
            max: self.max + delta,
        }
    }

    /// Size of the box along each axis.
    #[inline]
    pub fn extent(&self) -> Vector3<Real> {
        self.max - self.min
    }

    /// Axis with the largest extent.
    ///
    /// Ties prefer x over y and y over z, except that z wins a tie against y
    /// only when y did not beat x.
    pub fn largest_axis(&self) -> usize {
        let ext = self.extent();
        if ext.y > ext.x {
            if ext.z > ext.y { 2 } else { 1 }
        } else if ext.z > ext.x {
            2
        } else {
            0
        }
    }

    /// Splits the box at `position` along `axis` into a low and a high half.
    pub fn split(&self, axis: usize, position: Real) -> (Aabb, Aabb) {
        let mut low = *self;
        let mut high = *self;
        low.max[axis] = position;
        high.min[axis] = position;
        (low, high)
    }

    /// Checks if `point` lies inside the box or on its boundary.
    pub fn contains_point(&self, point: &Point3<Real>) -> bool {
        (0..3).all(|axis| point[axis] >= self.min[axis] && point[axis] <= self.max[axis])
    }

    /// Checks if `point` lies strictly inside the box (not on its boundary).
    pub fn contains_point_strict(&self, point: &Point3<Real>) -> bool {
        (0..3).all(|axis| point[axis] > self.min[axis] && point[axis] < self.max[axis])
    }

    /// Checks if `other` lies entirely inside this box.
    pub fn contains(&self, other: &Aabb) -> bool {
        self.contains_point(&other.min) && self.contains_point(&other.max)
    }

    /// Checks if the two boxes share at least one point.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        (0..3).all(|axis| self.overlaps_on_axis(other, axis))
    }

    /// Checks if the two boxes overlap along a single axis (boundaries count).
    #[inline]
    pub fn overlaps_on_axis(&self, other: &Aabb, axis: usize) -> bool {
        self.max[axis] >= other.min[axis] && self.min[axis] <= other.max[axis]
    }

    /// Intersects a ray with the box using the slab method.
    ///
    /// Returns the entry and exit distances along the ray. The entry distance
    /// is negative when the origin lies inside the box. Returns `None` if the
    /// ray misses the box or the box lies entirely behind the origin.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<(Real, Real)> {
        let mut t_min = Real::NEG_INFINITY;
        let mut t_max = Real::INFINITY;

        for axis in 0..3 {
            let origin = ray.origin[axis];
            let direction = ray.direction[axis];

            // Parallel to this slab: either always inside it or never
            if direction == 0.0 {
                if origin < self.min[axis] || origin > self.max[axis] {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / direction;
            let mut t0 = (self.min[axis] - origin) * inv;
            let mut t1 = (self.max[axis] - origin) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }

            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }

        if t_max < 0.0 {
            return None;
        }
        Some((t_min, t_max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_box() -> Aabb {
        Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn from_points_covers_all() {
        let aabb = Aabb::from_points([
            Point3::new(1.0, -2.0, 0.5),
            Point3::new(-1.0, 3.0, 0.0),
            Point3::new(0.0, 0.0, 4.0),
        ])
        .unwrap();

        assert_eq!(aabb.min, Point3::new(-1.0, -2.0, 0.0));
        assert_eq!(aabb.max, Point3::new(1.0, 3.0, 4.0));
        assert!(Aabb::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn largest_axis_tie_rules() {
        let cube = unit_box();
        assert_eq!(cube.largest_axis(), 0);

        let tall = Aabb::new(Point3::origin(), Point3::new(1.0, 2.0, 1.0));
        assert_eq!(tall.largest_axis(), 1);

        let deep = Aabb::new(Point3::origin(), Point3::new(1.0, 2.0, 3.0));
        assert_eq!(deep.largest_axis(), 2);

        // y beats x, z only ties y: y wins
        let yz_tie = Aabb::new(Point3::origin(), Point3::new(1.0, 2.0, 2.0));
        assert_eq!(yz_tie.largest_axis(), 1);

        // x ties y, z beats x
        let xz = Aabb::new(Point3::origin(), Point3::new(2.0, 2.0, 3.0));
        assert_eq!(xz.largest_axis(), 2);
    }

    #[test]
    fn split_shares_plane() {
        let (low, high) = unit_box().split(1, 0.25);
        assert_eq!(low.max.y, 0.25);
        assert_eq!(high.min.y, 0.25);
        assert!(unit_box().contains(&low));
        assert!(unit_box().contains(&high));
    }

    #[test]
    fn strict_containment_excludes_boundary() {
        let aabb = unit_box();
        assert!(aabb.contains_point(&Point3::new(1.0, 0.5, 0.5)));
        assert!(!aabb.contains_point_strict(&Point3::new(1.0, 0.5, 0.5)));
        assert!(aabb.contains_point_strict(&Point3::new(0.5, 0.5, 0.5)));
    }

    #[test]
    fn ray_hits_from_outside() {
        let ray = Ray::new(Point3::new(-1.0, 0.5, 0.5), Vector3::x(), 1);
        let (t_min, t_max) = unit_box().intersect_ray(&ray).unwrap();
        assert_relative_eq!(t_min, 1.0);
        assert_relative_eq!(t_max, 2.0);
    }

    #[test]
    fn ray_from_inside_has_negative_entry() {
        let ray = Ray::new(Point3::new(0.5, 0.5, 0.5), Vector3::y(), 1);
        let (t_min, t_max) = unit_box().intersect_ray(&ray).unwrap();
        assert_relative_eq!(t_min, -0.5);
        assert_relative_eq!(t_max, 0.5);
    }

    #[test]
    fn ray_misses() {
        let beside = Ray::new(Point3::new(-1.0, 2.0, 0.5), Vector3::x(), 1);
        assert!(unit_box().intersect_ray(&beside).is_none());

        let behind = Ray::new(Point3::new(2.0, 0.5, 0.5), Vector3::x(), 1);
        assert!(unit_box().intersect_ray(&behind).is_none());
    }
}
