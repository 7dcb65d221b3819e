//! Planar convex hulls and perimeters.

use specs::Outcome;

pub type Point2 = [f64; 2];

fn cross(o: Point2, a: Point2, b: Point2) -> f64 {
    (a[0] - o[0]) * (b[1] - o[1]) - (a[1] - o[1]) * (b[0] - o[0])
}

fn distance(a: Point2, b: Point2) -> f64 {
    (b[0] - a[0]).hypot(b[1] - a[1])
}

/// Computes the convex hull of `points` with Andrew's monotone chain.
///
/// The hull is returned counter clockwise without repeating the first point. Collinear
/// points on an edge are dropped, so a degenerate input yields fewer than three points.
pub fn convex_hull(points: &[Point2]) -> Vec<Point2> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a[0].total_cmp(&b[0]).then(a[1].total_cmp(&b[1])));
    sorted.dedup();

    if sorted.len() < 3 {
        return sorted;
    }

    let mut hull: Vec<Point2> = Vec::with_capacity(sorted.len() * 2);

    for &p in &sorted {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }

    let lower = hull.len() + 1;
    for &p in sorted.iter().rev().skip(1) {
        while hull.len() >= lower && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(p);
    }

    hull.pop();
    hull
}

/// The perimeter of the convex hull, or `None` if the points don't span an area.
pub fn hull_perimeter(points: &[Point2]) -> Option<f64> {
    let hull = convex_hull(points);
    if hull.len() < 3 {
        return None;
    }

    let perimeter = hull
        .iter()
        .zip(hull.iter().cycle().skip(1))
        .map(|(&a, &b)| distance(a, b))
        .sum();

    Some(perimeter)
}

/// `2 * (width + depth)` of the axis aligned box around `points`, zero when empty.
pub fn bounding_box_perimeter(points: &[Point2]) -> f64 {
    let Some(&first) = points.first() else {
        return 0.0;
    };

    let (min, max) = points.iter().fold((first, first), |(min, max), p| {
        (
            [min[0].min(p[0]), min[1].min(p[1])],
            [max[0].max(p[0]), max[1].max(p[1])],
        )
    });

    2.0 * ((max[0] - min[0]) + (max[1] - min[1]))
}

/// The circumference around `points`.
///
/// Uses the hull perimeter, falling back to the bounding box perimeter when the hull
/// can't be formed.
pub fn circumference(points: &[Point2]) -> Outcome<f64> {
    match hull_perimeter(points) {
        Some(perimeter) => Outcome::Ok(perimeter),
        None => Outcome::degraded(
            bounding_box_perimeter(points),
            format!("degenerate slice of {} point(s), used bounding box", points.len()),
        ),
    }
}
