use std::collections::hash_map::DefaultHasher;
use std::f32::consts::TAU;
use std::hash::{Hash, Hasher};

use eframe::egui::{Vec2, vec2};

/// Deterministic jitter pair in [-1, 1]² derived from a hashable id.
pub fn stable_pair(id: impl Hash) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

/// Unit direction spread around the circle by the golden ratio, used whenever
/// two points coincide and a separating direction is still needed.
pub fn golden_direction(seed: usize) -> Vec2 {
    let angle = ((seed as f32) * 0.618_034 + 0.11) * TAU;
    vec2(angle.cos(), angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_pair_is_deterministic_and_bounded() {
        let (x1, y1) = stable_pair(42u64);
        let (x2, y2) = stable_pair(42u64);
        assert_eq!((x1, y1), (x2, y2));
        assert!((-1.0..=1.0).contains(&x1));
        assert!((-1.0..=1.0).contains(&y1));
    }

    #[test]
    fn golden_direction_is_unit_length() {
        for seed in 0..16 {
            let dir = golden_direction(seed);
            assert!((dir.length() - 1.0).abs() < 1e-4);
        }
    }
}
