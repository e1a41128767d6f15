use crate::foundation::error::{ReelError, ReelResult};

/// Direction a wipe travels across the frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WipeDir {
    /// Incoming image enters from the left edge.
    #[default]
    #[serde(alias = "ltr")]
    LeftToRight,
    /// Incoming image enters from the right edge.
    #[serde(alias = "rtl")]
    RightToLeft,
    /// Incoming image enters from the top edge.
    #[serde(alias = "ttb")]
    TopToBottom,
    /// Incoming image enters from the bottom edge.
    #[serde(alias = "btt")]
    BottomToTop,
}

/// Visual effect occupying the transition gap between two segments.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransitionKind {
    /// Hold the outgoing background through the gap, then switch.
    Cut,
    /// Blend outgoing into incoming background.
    #[default]
    Crossfade,
    /// Reveal the incoming background behind a moving edge.
    Wipe {
        /// Travel direction.
        #[serde(default)]
        dir: WipeDir,
        /// Softness of the edge as a fraction of the travel axis, clamped to `[0, 1]`.
        #[serde(default)]
        soft_edge: f32,
    },
}

impl TransitionKind {
    /// Validate and normalize parameters (soft edge is clamped into `[0, 1]`).
    pub fn normalized(self) -> ReelResult<Self> {
        match self {
            Self::Wipe { dir, soft_edge } => {
                if !soft_edge.is_finite() {
                    return Err(ReelError::validation(
                        "wipe.soft_edge must be finite when set",
                    ));
                }
                Ok(Self::Wipe {
                    dir,
                    soft_edge: soft_edge.clamp(0.0, 1.0),
                })
            }
            other => Ok(other),
        }
    }
}

/// Easing curve applied to normalized transition progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionEase {
    /// Constant-rate progress.
    Linear,
    /// Quadratic ease-in/out.
    #[default]
    InOutQuad,
    /// Cubic ease-in/out.
    InOutCubic,
    /// Cubic ease-out.
    OutCubic,
}

impl TransitionEase {
    /// Map progress `t` in `[0, 1]` through the curve.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/transitions.rs"]
mod tests;
