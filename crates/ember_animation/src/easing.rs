//! Easing functions for animations
//!
//! Curves are named the way scene authors write them (`"power2.inOut"`,
//! `"sine.inOut"`, `"none"`). Unknown names resolve to [`Easing::default`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Easing function type
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Easing {
    Linear,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    #[default]
    EaseInOutCubic,
    EaseInQuart,
    EaseOutQuart,
    EaseInOutQuart,
    EaseInOutSine,
}

impl Easing {
    /// Apply the easing function to a progress value (0.0 to 1.0)
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseInQuad => t * t,
            Easing::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::EaseInCubic => t * t * t,
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::EaseInQuart => t * t * t * t,
            Easing::EaseOutQuart => 1.0 - (1.0 - t).powi(4),
            Easing::EaseInOutQuart => {
                if t < 0.5 {
                    8.0 * t * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(4) / 2.0
                }
            }
            Easing::EaseInOutSine => -((std::f32::consts::PI * t).cos() - 1.0) / 2.0,
        }
    }

    /// Resolve an authoring name such as `"power2.inOut"`.
    ///
    /// `powerN` is a polynomial of degree N+1; `power0` and `none` are linear.
    pub fn from_name(name: &str) -> Option<Self> {
        let easing = match name {
            "none" | "linear" | "power0" | "power0.inOut" => Easing::Linear,
            "power1.in" => Easing::EaseInQuad,
            "power1.out" | "power1" => Easing::EaseOutQuad,
            "power1.inOut" => Easing::EaseInOutQuad,
            "power2.in" => Easing::EaseInCubic,
            "power2.out" | "power2" => Easing::EaseOutCubic,
            "power2.inOut" => Easing::EaseInOutCubic,
            "power3.in" => Easing::EaseInQuart,
            "power3.out" | "power3" => Easing::EaseOutQuart,
            "power3.inOut" => Easing::EaseInOutQuart,
            "sine.inOut" => Easing::EaseInOutSine,
            _ => return None,
        };
        Some(easing)
    }

    /// Authoring name of this curve
    pub fn name(&self) -> &'static str {
        match self {
            Easing::Linear => "none",
            Easing::EaseInQuad => "power1.in",
            Easing::EaseOutQuad => "power1.out",
            Easing::EaseInOutQuad => "power1.inOut",
            Easing::EaseInCubic => "power2.in",
            Easing::EaseOutCubic => "power2.out",
            Easing::EaseInOutCubic => "power2.inOut",
            Easing::EaseInQuart => "power3.in",
            Easing::EaseOutQuart => "power3.out",
            Easing::EaseInOutQuart => "power3.inOut",
            Easing::EaseInOutSine => "sine.inOut",
        }
    }
}

impl Serialize for Easing {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Easing {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Easing::from_name(&name).unwrap_or_else(|| {
            tracing::warn!(easing = %name, "unknown easing, using power2.inOut");
            Easing::default()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 11] = [
        Easing::Linear,
        Easing::EaseInQuad,
        Easing::EaseOutQuad,
        Easing::EaseInOutQuad,
        Easing::EaseInCubic,
        Easing::EaseOutCubic,
        Easing::EaseInOutCubic,
        Easing::EaseInQuart,
        Easing::EaseOutQuart,
        Easing::EaseInOutQuart,
        Easing::EaseInOutSine,
    ];

    #[test]
    fn test_endpoints_are_exact() {
        for easing in ALL {
            assert!(easing.apply(0.0).abs() < 1e-6, "{easing:?} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6, "{easing:?} at 1");
        }
    }

    #[test]
    fn test_names_round_trip() {
        for easing in ALL {
            assert_eq!(Easing::from_name(easing.name()), Some(easing));
        }
    }

    #[test]
    fn test_out_curves_decelerate() {
        assert!(Easing::EaseOutCubic.apply(0.5) > 0.5);
        assert!(Easing::EaseInCubic.apply(0.5) < 0.5);
    }

    #[test]
    fn test_unknown_name_deserializes_to_default() {
        let easing: Easing = serde_json::from_str("\"elastic.out\"").unwrap();
        assert_eq!(easing, Easing::EaseInOutCubic);
    }
}
