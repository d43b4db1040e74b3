use glam::Vec3;

use crate::color::Rgb;
use crate::math::float::{FloatAsExt, Vec3AsNonZero};

use super::{Engine, EngineError, Entity};

/// Luminous efficiency of an LED bulb, fraction of the 683 lm/W ideal.
pub const EFFICIENCY_LED: f32 = 0.1171;

const LUMENS_PER_WATT: f32 = 683.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightType {
    Sun,
    Directional,
    Point,
    Spot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub ty: LightType,
    pub color: Rgb,
    /// Lux for directional lights, lumens for punctual ones.
    pub intensity: f32,
    pub position: Vec3,
    pub direction: Vec3,
    /// Degrees.
    pub sun_angular_radius: f32,
    pub cast_shadows: bool,
    pub channels: u8,
}

#[derive(Debug, Clone)]
pub struct LightBuilder {
    light: Light,
}

impl LightBuilder {
    pub fn new(ty: LightType) -> Self {
        Self {
            light: Light {
                ty,
                color: crate::color::linear::WHITE,
                intensity: 100_000.0,
                position: Vec3::ZERO,
                direction: Vec3::NEG_Z,
                sun_angular_radius: 0.545,
                cast_shadows: false,
                channels: 1,
            },
        }
    }

    pub fn color(mut self, color: Rgb) -> Self {
        self.light.color = color;
        self
    }

    pub fn intensity(mut self, intensity: f32) -> Self {
        self.light.intensity = intensity;
        self
    }

    /// Sets the intensity from an electrical power and a luminous efficiency.
    pub fn intensity_watts(mut self, watts: f32, efficiency: f32) -> Self {
        self.light.intensity = watts * LUMENS_PER_WATT * efficiency;
        self
    }

    pub fn position(mut self, position: Vec3) -> Self {
        self.light.position = position;
        self
    }

    pub fn direction(mut self, direction: Vec3) -> Self {
        self.light.direction = direction;
        self
    }

    /// Clamped to [0.25, 20] degrees.
    pub fn sun_angular_radius(mut self, degrees: f32) -> Self {
        self.light.sun_angular_radius = degrees.clamp(0.25, 20.0);
        self
    }

    pub fn cast_shadows(mut self, enabled: bool) -> Self {
        self.light.cast_shadows = enabled;
        self
    }

    pub fn light_channel(mut self, channel: u8, enabled: bool) -> Self {
        let bit = 1u8 << (channel & 7);
        if enabled {
            self.light.channels |= bit;
        } else {
            self.light.channels &= !bit;
        }
        self
    }

    pub fn build(mut self, engine: &mut Engine, entity: Entity) -> Result<(), EngineError> {
        engine.check_entity(entity)?;
        if engine.lights.contains_key(&entity) {
            return Err(EngineError::DuplicateComponent {
                entity,
                component: "light",
            });
        }
        self.light.intensity = self
            .light
            .intensity
            .into_finite()
            .filter(|i| *i >= 0.0)
            .ok_or_else(|| EngineError::InvalidBuilder {
                what: "light",
                reason: format!("intensity {} is not a finite positive value", self.light.intensity),
            })?;
        if self.light.ty != LightType::Point {
            self.light.direction = self
                .light
                .direction
                .into_non_zero(1e-6)
                .ok_or_else(|| EngineError::InvalidBuilder {
                    what: "light",
                    reason: "direction is zero".into(),
                })?
                .normalize();
        }
        log::trace!("{:?} light on {entity}", self.light.ty);
        engine.lights.insert(entity, self.light);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::sRgb;

    #[test]
    fn sun_light() {
        let mut engine = Engine::default();
        let sun = engine.create_entity();
        LightBuilder::new(LightType::Sun)
            .color(sRgb::from_array([0.98, 0.92, 0.89]).to_linear())
            .intensity(110_000.0)
            .direction(Vec3::new(0.7, -1.0, -0.8))
            .sun_angular_radius(1.9)
            .build(&mut engine, sun)
            .unwrap();

        let light = engine.light(sun).unwrap();
        assert!((light.direction.length() - 1.0).abs() < 1e-6);
        assert_eq!(light.sun_angular_radius, 1.9);
        assert!(!light.cast_shadows);

        let again = LightBuilder::new(LightType::Sun).build(&mut engine, sun);
        assert!(matches!(again, Err(EngineError::DuplicateComponent { .. })));
        engine.destroy(sun).unwrap();
        assert!(engine.light(sun).is_err());
    }

    #[test]
    fn point_light_power() {
        let mut engine = Engine::default();
        let e = engine.create_entity();
        LightBuilder::new(LightType::Point)
            .intensity_watts(1000.0, EFFICIENCY_LED)
            .position(Vec3::new(0.0, 0.0, -3.0))
            .light_channel(0, true)
            .light_channel(2, true)
            .build(&mut engine, e)
            .unwrap();
        let light = engine.light(e).unwrap();
        assert!((light.intensity - 79_979.3).abs() < 0.5);
        assert_eq!(light.channels, 0b101);
    }

    #[test]
    fn directional_light_needs_a_direction() {
        let mut engine = Engine::default();
        let e = engine.create_entity();
        let res = LightBuilder::new(LightType::Directional)
            .direction(Vec3::ZERO)
            .build(&mut engine, e);
        assert!(res.is_err());

        let res = LightBuilder::new(LightType::Point)
            .intensity(f32::NAN)
            .build(&mut engine, e);
        assert!(res.is_err());
    }
}
