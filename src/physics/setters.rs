use std::f64::consts::PI;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::particle::{Bounds, Category, Position};

/// Places a freshly spawned particle. Setters work in normalized
/// coordinates (`[-1, 1]` on both axes) that are then stretched onto the
/// bounds, so every result lies inside them.
pub trait PositionSetter: Send + Sync {
    fn set_position(
        &self,
        position: &mut Position,
        category: Category,
        category_count: usize,
        bounds: &Bounds,
        rng: &mut dyn RngCore,
    );
}

fn to_bounds(x: f64, y: f64, bounds: &Bounds) -> Position {
    let center = bounds.center();
    Position::new(
        center.x + x.clamp(-1.0, 1.0) * bounds.size[0] * 0.5,
        center.y + y.clamp(-1.0, 1.0) * bounds.size[1] * 0.5,
    )
}

pub struct RandomPositionSetter;

impl PositionSetter for RandomPositionSetter {
    fn set_position(
        &self,
        position: &mut Position,
        _category: Category,
        _category_count: usize,
        bounds: &Bounds,
        rng: &mut dyn RngCore,
    ) {
        let (min, max) = (bounds.min(), bounds.max());
        position.x = rng.gen_range(min.x..=max.x);
        position.y = rng.gen_range(min.y..=max.y);
    }
}

pub struct CenterPositionSetter;

impl PositionSetter for CenterPositionSetter {
    fn set_position(
        &self,
        position: &mut Position,
        _category: Category,
        _category_count: usize,
        bounds: &Bounds,
        rng: &mut dyn RngCore,
    ) {
        let scale = 0.3;
        *position = to_bounds(
            rng.gen_range(-1.0..1.0) * scale,
            rng.gen_range(-1.0..1.0) * scale,
            bounds,
        );
    }
}

pub struct RingPositionSetter;

impl PositionSetter for RingPositionSetter {
    fn set_position(
        &self,
        position: &mut Position,
        _category: Category,
        _category_count: usize,
        bounds: &Bounds,
        rng: &mut dyn RngCore,
    ) {
        let angle = rng.gen_range(0.0..2.0 * PI);
        let radius = 0.7 + 0.02 * rng.gen_range(-1.0..1.0);
        *position = to_bounds(angle.cos() * radius, angle.sin() * radius, bounds);
    }
}

pub struct RainbowRingPositionSetter;

impl PositionSetter for RainbowRingPositionSetter {
    fn set_position(
        &self,
        position: &mut Position,
        category: Category,
        category_count: usize,
        bounds: &Bounds,
        rng: &mut dyn RngCore,
    ) {
        let angle = (0.3 * rng.gen_range(-1.0..1.0) + category.index() as f64)
            / category_count as f64
            * 2.0
            * PI;
        let radius = 0.7 + 0.02 * rng.gen_range(-1.0..1.0);
        *position = to_bounds(angle.cos() * radius, angle.sin() * radius, bounds);
    }
}

pub struct ColorBattlePositionSetter;

impl PositionSetter for ColorBattlePositionSetter {
    fn set_position(
        &self,
        position: &mut Position,
        category: Category,
        category_count: usize,
        bounds: &Bounds,
        rng: &mut dyn RngCore,
    ) {
        let center_angle = category.index() as f64 / category_count as f64 * 2.0 * PI;
        let center_radius = 0.5;

        let angle = rng.gen_range(0.0..2.0 * PI);
        let radius = rng.gen_range(0.0..0.1);

        *position = to_bounds(
            center_radius * center_angle.cos() + angle.cos() * radius,
            center_radius * center_angle.sin() + angle.sin() * radius,
            bounds,
        );
    }
}

/// Setter selectable from the settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    #[default]
    Random,
    Center,
    Ring,
    RainbowRing,
    ColorBattle,
}

impl Placement {
    pub fn setter(self) -> Box<dyn PositionSetter> {
        match self {
            Placement::Random => Box::new(RandomPositionSetter),
            Placement::Center => Box::new(CenterPositionSetter),
            Placement::Ring => Box::new(RingPositionSetter),
            Placement::RainbowRing => Box::new(RainbowRingPositionSetter),
            Placement::ColorBattle => Box::new(ColorBattlePositionSetter),
        }
    }
}
