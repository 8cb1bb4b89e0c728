//! Геометрия 2D: расстояние до отрезка, обход препятствий, центроид
//!
//! Чистые функции, без состояния.

use bevy::prelude::*;

/// Расстояние от точки `p` до отрезка `a→b` (проекция с clamp на [0, 1])
///
/// Вырожденный отрезок (a == b): расстояние до `a`.
pub fn point_segment_distance(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    let closest = if len_sq > 0.0 {
        let t = (p - a).dot(ab) / len_sq;
        a + ab * t.clamp(0.0, 1.0)
    } else {
        a
    };
    p.distance(closest)
}

/// Точка уклонения: `distance` от `origin`, повёрнуто на +90° от направления на препятствие
///
/// Фиксированный перпендикулярный сдвиг, не path planner.
pub fn avoidance_offset(origin: Vec2, obstacle: Vec2, distance: f32) -> Vec2 {
    let bearing = (obstacle - origin).try_normalize().unwrap_or(Vec2::X);
    origin + bearing.perp() * distance
}

/// Центр масс набора точек (среднее). Пустой набор: None
pub fn centroid<I: IntoIterator<Item = Vec2>>(points: I) -> Option<Vec2> {
    let mut count = 0usize;
    let total = points.into_iter().fold(Vec2::ZERO, |acc, p| {
        count += 1;
        acc + p
    });
    (count > 0).then(|| total / count as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    #[test]
    fn test_point_segment_distance_projection() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);

        // Над серединой
        assert!((point_segment_distance(a, b, Vec2::new(5.0, 3.0)) - 3.0).abs() < EPS);
        // За концом: до b
        assert!((point_segment_distance(a, b, Vec2::new(13.0, 4.0)) - 5.0).abs() < EPS);
        // До начала: до a
        assert!((point_segment_distance(a, b, Vec2::new(-3.0, -4.0)) - 5.0).abs() < EPS);
    }

    #[test]
    fn test_point_segment_distance_degenerate() {
        let a = Vec2::new(1.0, 1.0);
        assert!((point_segment_distance(a, a, Vec2::new(4.0, 5.0)) - 5.0).abs() < EPS);
    }

    #[test]
    fn test_avoidance_offset_is_perpendicular() {
        let origin = Vec2::new(100.0, 100.0);
        let dodge = avoidance_offset(origin, Vec2::new(200.0, 100.0), 150.0);

        // Препятствие справа (+X) → уходим вверх (+Y)
        assert!((dodge - Vec2::new(100.0, 250.0)).length() < EPS);
        assert!((dodge.distance(origin) - 150.0).abs() < EPS);
    }

    #[test]
    fn test_avoidance_offset_coincident_points() {
        let origin = Vec2::new(5.0, 5.0);
        let dodge = avoidance_offset(origin, origin, 10.0);
        assert!((dodge - Vec2::new(5.0, 15.0)).length() < EPS);
    }

    #[test]
    fn test_centroid_empty() {
        assert_eq!(centroid(Vec::<Vec2>::new()), None);
    }

    #[test]
    fn test_centroid() {
        let c = centroid([Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(5.0, 15.0)]);
        assert_eq!(c, Some(Vec2::new(5.0, 5.0)));
    }
}
