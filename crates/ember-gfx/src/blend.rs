//! Blend state model.
//!
//! The render core speaks in terms of three high-level [`BlendMode`]s; the
//! backend receives the fully resolved [`BlendTriple`]. The mapping is fixed
//! and exhaustive, so a backend never has to interpret a mode itself.

// ---------------------------------------------------------------------------
// BlendMode
// ---------------------------------------------------------------------------

/// High-level blend mode attached to a sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum BlendMode {
    /// Standard alpha blending.
    #[default]
    Transparent,
    /// Additive blending (used for the glow pass and for emissive sprites).
    Additive,
    /// No blending; source overwrites destination.
    Overwrite,
}

// ---------------------------------------------------------------------------
// Blend factors / equation
// ---------------------------------------------------------------------------

/// Source/destination blend factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BlendFactor {
    Zero,
    One,
    SrcAlpha,
    OneMinusSrcAlpha,
}

/// Blend equation combining the weighted source and destination terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BlendEquation {
    Add,
}

/// A fully resolved `(src, dst, equation)` blend state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BlendTriple {
    pub src: BlendFactor,
    pub dst: BlendFactor,
    pub equation: BlendEquation,
}

impl BlendMode {
    /// Resolve the mode to its backend blend triple.
    pub fn triple(self) -> BlendTriple {
        match self {
            BlendMode::Transparent => BlendTriple {
                src: BlendFactor::SrcAlpha,
                dst: BlendFactor::OneMinusSrcAlpha,
                equation: BlendEquation::Add,
            },
            BlendMode::Additive => BlendTriple {
                src: BlendFactor::SrcAlpha,
                dst: BlendFactor::One,
                equation: BlendEquation::Add,
            },
            BlendMode::Overwrite => BlendTriple {
                src: BlendFactor::One,
                dst: BlendFactor::Zero,
                equation: BlendEquation::Add,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_to_triple_mapping_is_fixed() {
        assert_eq!(
            BlendMode::Transparent.triple(),
            BlendTriple {
                src: BlendFactor::SrcAlpha,
                dst: BlendFactor::OneMinusSrcAlpha,
                equation: BlendEquation::Add,
            }
        );
        assert_eq!(
            BlendMode::Additive.triple(),
            BlendTriple {
                src: BlendFactor::SrcAlpha,
                dst: BlendFactor::One,
                equation: BlendEquation::Add,
            }
        );
        assert_eq!(
            BlendMode::Overwrite.triple(),
            BlendTriple {
                src: BlendFactor::One,
                dst: BlendFactor::Zero,
                equation: BlendEquation::Add,
            }
        );
    }
}
