use slotcheck_core::mote::{MoteId, Point2D};
use slotcheck_core::neighbours::Positions;

pub fn point(x: f64, y: f64) -> Point2D {
    Point2D::builder().x(x).y(y).build()
}

pub fn positions(points: &[(u32, f64, f64)]) -> Positions {
    points
        .iter()
        .map(|(mote, x, y)| (MoteId::from(*mote), point(*x, *y)))
        .collect()
}

/// Motes on a square grid with the given spacing, numbered from 1 row by row.
pub fn grid(side: u32, spacing: f64) -> Positions {
    (0..side * side)
        .map(|idx| {
            let x = (idx % side) as f64 * spacing;
            let y = (idx / side) as f64 * spacing;
            (MoteId::from(idx + 1), point(x, y))
        })
        .collect()
}
