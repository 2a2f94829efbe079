use nalgebra::{Vector2, Vector3};

use head_track_core::{Affine, PointModel};

/// Normalized image points ordered to match the model reference points:
/// index 0 corresponds to the model origin, 1 to `m01`, 2 to `m02`.
pub type PointOrder = [Vector2<f64>; 3];

/// Rank indices of `points` by scalar projection onto `axis`, ascending.
fn rank_along(points: &[Vector2<f64>; 3], axis: Vector2<f64>) -> [usize; 3] {
    let mut keyed = [
        (axis.dot(&points[0]), 0usize),
        (axis.dot(&points[1]), 1),
        (axis.dot(&points[2]), 2),
    ];
    keyed.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    [keyed[0].1, keyed[1].1, keyed[2].1]
}

/// Deterministic correspondence from geometric ordering alone.
///
/// Both the detected points and the model reference points (projected to
/// the image plane) are ranked along the model's `m01 - m02` axis and
/// paired by rank. For a given point set the mapping is unique, which
/// makes the first solve after (re)initialization reproducible.
pub fn order_by_axis(points: &[Vector2<f64>; 3], model: &PointModel) -> PointOrder {
    let axis = Vector2::new(
        model.m01().x - model.m02().x,
        model.m01().y - model.m02().y,
    );

    let model_points = [
        Vector2::zeros(),
        Vector2::new(model.m01().x, model.m01().y),
        Vector2::new(model.m02().x, model.m02().y),
    ];

    let point_rank = rank_along(points, axis);
    let model_rank = rank_along(&model_points, axis);

    let mut order = [Vector2::zeros(); 3];
    for i in 0..3 {
        order[model_rank[i]] = points[point_rank[i]];
    }
    order
}

/// Correspondence by continuity: project the model through the previously
/// accepted pose and assign each projected point its nearest detection.
///
/// Returns `None` when the projection is degenerate (a model point behind
/// the camera) or ambiguous (two projected points claiming the same
/// detection); callers fall back to [`order_by_axis`] for that frame.
pub fn order_from_previous(
    points: &[Vector2<f64>; 3],
    model: &PointModel,
    previous: &Affine,
    focal_length: f64,
) -> Option<PointOrder> {
    let model_points = [Vector3::zeros(), model.m01(), model.m02()];

    let mut order = [Vector2::zeros(); 3];
    let mut claimed = [false; 3];

    for (slot, m) in model_points.iter().enumerate() {
        let p = *previous * *m;
        if p.z <= 0.0 {
            return None;
        }
        let projected = Vector2::new(p.x, p.y) * (focal_length / p.z);

        let mut nearest = 0;
        let mut nearest_d2 = f64::INFINITY;
        for (i, q) in points.iter().enumerate() {
            let d2 = (q - projected).norm_squared();
            if d2 < nearest_d2 {
                nearest_d2 = d2;
                nearest = i;
            }
        }
        if claimed[nearest] {
            return None;
        }
        claimed[nearest] = true;
        order[slot] = points[nearest];
    }

    Some(order)
}
