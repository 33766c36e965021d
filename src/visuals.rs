//! Color modes and lighting overlays.
//!
//! Both are closed enums with one pure function per variant; the fragment
//! stage evaluates the previous and current color mode and blends them by the
//! mode-transition progress, so switching modes crossfades instead of
//! popping. The CPU functions here mirror the generated WGSL arm for arm.

use glam::Vec3;

/// Fixed hot/cold endpoints for the temperature mode.
pub const TEMPERATURE_HOT: Vec3 = Vec3::new(1.0, 0.25, 0.05);
pub const TEMPERATURE_COLD: Vec3 = Vec3::new(0.1, 0.3, 1.0);

/// How fragments derive their color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// The particle's own vertex color.
    #[default]
    Original,
    /// Linear blend of two configurable colors by view depth.
    Gradient,
    /// Hue cycling by depth and time.
    Rainbow,
    /// Luminance of the original color, tinted by a configurable color.
    Monochrome,
    /// Depth-based blend between fixed hot and cold colors.
    Temperature,
}

impl ColorMode {
    pub const ALL: [ColorMode; 5] = [
        ColorMode::Original,
        ColorMode::Gradient,
        ColorMode::Rainbow,
        ColorMode::Monochrome,
        ColorMode::Temperature,
    ];

    pub fn index(self) -> u32 {
        match self {
            ColorMode::Original => 0,
            ColorMode::Gradient => 1,
            ColorMode::Rainbow => 2,
            ColorMode::Monochrome => 3,
            ColorMode::Temperature => 4,
        }
    }

    pub fn from_index(i: u32) -> ColorMode {
        ColorMode::ALL
            .get(i as usize)
            .copied()
            .unwrap_or(ColorMode::Original)
    }

    /// Evaluate this mode for one fragment.
    ///
    /// `depth01` is the normalized view depth in [0, 1], `base` the
    /// interpolated vertex color.
    pub fn shade(
        self,
        base: Vec3,
        depth01: f32,
        time: f32,
        color_a: Vec3,
        color_b: Vec3,
    ) -> Vec3 {
        match self {
            ColorMode::Original => base,
            ColorMode::Gradient => color_a.lerp(color_b, depth01),
            ColorMode::Rainbow => {
                let hue = (depth01 + time * 0.05).fract();
                hsv_to_rgb(hue, 0.8, 1.0)
            }
            ColorMode::Monochrome => {
                let lum = base.dot(Vec3::new(0.299, 0.587, 0.114));
                color_a * lum
            }
            ColorMode::Temperature => TEMPERATURE_HOT.lerp(TEMPERATURE_COLD, depth01),
        }
    }

    fn wgsl_arm(self) -> String {
        let body = match self {
            ColorMode::Original => "return base;".to_string(),
            ColorMode::Gradient => "return mix(u.color_a.rgb, u.color_b.rgb, depth01);".to_string(),
            ColorMode::Rainbow => {
                "return hsv_to_rgb(fract(depth01 + u.time * 0.05), 0.8, 1.0);".to_string()
            }
            ColorMode::Monochrome => {
                r#"let lum = dot(base, vec3<f32>(0.299, 0.587, 0.114));
            return u.color_a.rgb * lum;"#
                    .to_string()
            }
            ColorMode::Temperature => format!(
                "return mix(vec3<f32>({}, {}, {}), vec3<f32>({}, {}, {}), depth01);",
                TEMPERATURE_HOT.x,
                TEMPERATURE_HOT.y,
                TEMPERATURE_HOT.z,
                TEMPERATURE_COLD.x,
                TEMPERATURE_COLD.y,
                TEMPERATURE_COLD.z,
            ),
        };
        format!("        case {}u: {{\n            {}\n        }}", self.index(), body)
    }
}

/// WGSL `mode_color` dispatch for the fragment stage.
pub fn color_dispatch_wgsl() -> String {
    let arms: String = ColorMode::ALL
        .iter()
        .map(|m| m.wgsl_arm())
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        r#"
fn mode_color(mode: u32, base: vec3<f32>, depth01: f32) -> vec3<f32> {{
    switch mode {{
{arms}
        default: {{
            return base;
        }}
    }}
}}
"#
    )
}

/// Lighting overlays: a scalar glow per particle, clamped to [0, 1].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LightingMode {
    #[default]
    None,
    /// A band sweeping along the X axis, periodic.
    Move,
    /// A ring expanding radially from the origin, fading out near the rim.
    Expand,
    /// The mirror of expand: collapses toward the center, fading in.
    Contract,
    /// Global sinusoidal brightness shared by all particles.
    Pulse,
    /// 2D sinusoidal pattern in the horizontal plane.
    Wave,
}

impl LightingMode {
    pub const ALL: [LightingMode; 6] = [
        LightingMode::None,
        LightingMode::Move,
        LightingMode::Expand,
        LightingMode::Contract,
        LightingMode::Pulse,
        LightingMode::Wave,
    ];

    pub fn index(self) -> u32 {
        match self {
            LightingMode::None => 0,
            LightingMode::Move => 1,
            LightingMode::Expand => 2,
            LightingMode::Contract => 3,
            LightingMode::Pulse => 4,
            LightingMode::Wave => 5,
        }
    }

    pub fn from_index(i: u32) -> LightingMode {
        LightingMode::ALL
            .get(i as usize)
            .copied()
            .unwrap_or(LightingMode::None)
    }

    /// Glow for a particle at `pos`, given the smoothed lighting parameters.
    pub fn glow(self, pos: Vec3, time: f32, speed: f32, intensity: f32, radius: f32) -> f32 {
        let g = match self {
            LightingMode::None => 0.0,
            LightingMode::Move => {
                let center = ((time * speed * 0.1).fract() * 2.0 - 1.0) * radius;
                (1.0 - (pos.x - center).abs() / (radius * 0.3)).max(0.0) * intensity
            }
            LightingMode::Expand => {
                let r = (time * speed * 0.2).fract() * radius;
                let d = pos.length();
                (1.0 - (d - r).abs() / (radius * 0.15)).max(0.0) * (1.0 - r / radius) * intensity
            }
            LightingMode::Contract => {
                let r = (1.0 - (time * speed * 0.2).fract()) * radius;
                let d = pos.length();
                (1.0 - (d - r).abs() / (radius * 0.15)).max(0.0) * (1.0 - r / radius) * intensity
            }
            LightingMode::Pulse => ((time * speed).sin() * 0.5 + 0.5) * intensity,
            LightingMode::Wave => {
                ((pos.x * 0.1 + time * speed).sin() * (pos.z * 0.1 + time * speed * 0.8).sin()
                    * 0.5
                    + 0.5)
                    * intensity
            }
        };
        g.clamp(0.0, 1.0)
    }

    fn wgsl_arm(self) -> String {
        let body = match self {
            LightingMode::None => "g = 0.0;".to_string(),
            LightingMode::Move => r#"let center = (fract(lt * 0.1) * 2.0 - 1.0) * u.lighting_radius;
            g = max(1.0 - abs(pos.x - center) / (u.lighting_radius * 0.3), 0.0) * u.lighting_intensity;"#
                .to_string(),
            LightingMode::Expand => r#"let r = fract(lt * 0.2) * u.lighting_radius;
            let d = length(pos);
            g = max(1.0 - abs(d - r) / (u.lighting_radius * 0.15), 0.0)
                * (1.0 - r / u.lighting_radius) * u.lighting_intensity;"#
                .to_string(),
            LightingMode::Contract => r#"let r = (1.0 - fract(lt * 0.2)) * u.lighting_radius;
            let d = length(pos);
            g = max(1.0 - abs(d - r) / (u.lighting_radius * 0.15), 0.0)
                * (1.0 - r / u.lighting_radius) * u.lighting_intensity;"#
                .to_string(),
            LightingMode::Pulse => "g = (sin(lt) * 0.5 + 0.5) * u.lighting_intensity;".to_string(),
            LightingMode::Wave => r#"g = (sin(pos.x * 0.1 + lt) * sin(pos.z * 0.1 + lt * 0.8) * 0.5 + 0.5)
                * u.lighting_intensity;"#
                .to_string(),
        };
        format!("        case {}u: {{\n            {}\n        }}", self.index(), body)
    }
}

/// WGSL `lighting_glow` dispatch for the vertex stage.
pub fn lighting_dispatch_wgsl() -> String {
    let arms: String = LightingMode::ALL
        .iter()
        .map(|m| m.wgsl_arm())
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        r#"
fn lighting_glow(pos: vec3<f32>) -> f32 {{
    let lt = u.time * u.lighting_speed;
    var g = 0.0;
    switch u.lighting_mode {{
{arms}
        default: {{
            g = 0.0;
        }}
    }}
    return clamp(g, 0.0, 1.0);
}}
"#
    )
}

/// CPU twin of the WGSL `hsv_to_rgb`.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Vec3 {
    let c = v * s;
    let hp = h * 6.0;
    let x = c * (1.0 - ((hp % 2.0) - 1.0).abs());
    let m = v - c;
    let rgb = if hp < 1.0 {
        Vec3::new(c, x, 0.0)
    } else if hp < 2.0 {
        Vec3::new(x, c, 0.0)
    } else if hp < 3.0 {
        Vec3::new(0.0, c, x)
    } else if hp < 4.0 {
        Vec3::new(0.0, x, c)
    } else if hp < 5.0 {
        Vec3::new(x, 0.0, c)
    } else {
        Vec3::new(c, 0.0, x)
    };
    rgb + Vec3::splat(m)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glow_is_always_clamped() {
        for mode in LightingMode::ALL {
            for step in 0..200 {
                let t = step as f32 * 0.173;
                let pos = Vec3::new((t * 3.0).sin() * 60.0, t.cos() * 40.0, t * 7.0 % 50.0);
                // Deliberately out-of-scale intensity.
                let g = mode.glow(pos, t, 2.0, 10.0, 30.0);
                assert!((0.0..=1.0).contains(&g), "{mode:?} glow {g}");
            }
        }
    }

    #[test]
    fn none_mode_never_glows() {
        assert_eq!(LightingMode::None.glow(Vec3::ONE, 5.0, 1.0, 1.0, 30.0), 0.0);
    }

    #[test]
    fn pulse_is_position_independent() {
        let a = LightingMode::Pulse.glow(Vec3::ZERO, 2.0, 1.0, 1.0, 30.0);
        let b = LightingMode::Pulse.glow(Vec3::new(40.0, -10.0, 3.0), 2.0, 1.0, 1.0, 30.0);
        assert_eq!(a, b);
    }

    #[test]
    fn original_mode_passes_base_color() {
        let base = Vec3::new(0.2, 0.4, 0.8);
        let out = ColorMode::Original.shade(base, 0.5, 1.0, Vec3::ONE, Vec3::ZERO);
        assert_eq!(out, base);
    }

    #[test]
    fn gradient_blends_endpoints() {
        let a = Vec3::new(1.0, 0.0, 0.0);
        let b = Vec3::new(0.0, 0.0, 1.0);
        assert_eq!(ColorMode::Gradient.shade(Vec3::ZERO, 0.0, 0.0, a, b), a);
        assert_eq!(ColorMode::Gradient.shade(Vec3::ZERO, 1.0, 0.0, a, b), b);
    }

    #[test]
    fn monochrome_preserves_luminance_ordering() {
        let tint = Vec3::ONE;
        let dark = ColorMode::Monochrome.shade(Vec3::splat(0.1), 0.0, 0.0, tint, tint);
        let bright = ColorMode::Monochrome.shade(Vec3::splat(0.9), 0.0, 0.0, tint, tint);
        assert!(bright.x > dark.x);
    }

    #[test]
    fn hsv_primaries() {
        assert!((hsv_to_rgb(0.0, 1.0, 1.0) - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-5);
        assert!((hsv_to_rgb(1.0 / 3.0, 1.0, 1.0) - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-5);
        assert!((hsv_to_rgb(2.0 / 3.0, 1.0, 1.0) - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn dispatch_wgsl_is_exhaustive() {
        let color = color_dispatch_wgsl();
        for m in ColorMode::ALL {
            assert!(color.contains(&format!("case {}u:", m.index())));
        }
        let lighting = lighting_dispatch_wgsl();
        for m in LightingMode::ALL {
            assert!(lighting.contains(&format!("case {}u:", m.index())));
        }
    }
}
