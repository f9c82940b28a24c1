//! Error types for roll composition and item use.

use sr_dice::DiceError;

/// Errors that end a roll interaction.
#[derive(Debug, thiserror::Error)]
pub enum MechError {
    /// No actor is available to roll for.
    #[error("no actor to roll for")]
    MissingActorContext,

    /// A resource cannot cover the cost of an activation.
    #[error("not enough {resource}: need {required}, have {available}")]
    InsufficientResource {
        /// The resource being consumed.
        resource: String,
        /// The amount the activation costs.
        required: i64,
        /// The amount currently available.
        available: i64,
    },

    /// An attribute name does not match any attribute.
    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),

    /// A skill name does not match any skill.
    #[error("unknown skill: {0}")]
    UnknownSkill(String),

    /// A resource name does not match any resource.
    #[error("unknown resource: {0}")]
    UnknownResource(String),

    /// The item has no uses left.
    #[error("'{0}' has no uses left")]
    NotEnoughUses(String),

    /// A formula could not be parsed or evaluated.
    #[error("malformed formula: {0}")]
    MalformedFormula(#[from] DiceError),

    /// The item has nothing to roll.
    #[error("'{0}' has nothing to roll")]
    NoRoll(String),

    /// The item has no activation and cannot be used.
    #[error("'{0}' cannot be activated")]
    NotActivatable(String),

    /// The item data is inconsistent.
    #[error("invalid item '{item}': {reason}")]
    InvalidItem {
        /// Item name.
        item: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Opportunity and complication thresholds overlap.
    #[error("opportunity threshold {opportunity} must exceed complication threshold {complication}")]
    InvalidThresholds {
        /// The opportunity threshold.
        opportunity: u32,
        /// The complication threshold.
        complication: u32,
    },

    /// A retroactive upgrade does not apply to this roll.
    #[error("cannot apply retroactive {0}")]
    RetroUnavailable(&'static str),

    /// The user closed a configuration prompt.
    #[error("cancelled")]
    Cancelled,

    /// The rules configuration is invalid.
    #[error("invalid config: {0}")]
    Config(String),

    /// Reading a configuration or document file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MechError {
    /// Returns true if the error only ends the current interaction.
    ///
    /// Configuration and I/O failures are the only errors a host should
    /// surface as more than a warning.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Config(_) | Self::Io(_))
    }
}

/// Convenience result type for mechanics operations.
pub type MechResult<T> = Result<T, MechError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dice_errors_convert() {
        let err: MechError = DiceError::Empty.into();
        assert!(matches!(err, MechError::MalformedFormula(DiceError::Empty)));
        assert_eq!(err.to_string(), "malformed formula: empty formula");
    }

    #[test]
    fn interaction_errors_are_recoverable() {
        assert!(MechError::MissingActorContext.is_recoverable());
        assert!(MechError::Cancelled.is_recoverable());
        assert!(
            MechError::InsufficientResource {
                resource: "focus".into(),
                required: 2,
                available: 1,
            }
            .is_recoverable()
        );
        assert!(!MechError::Config("bad".into()).is_recoverable());
    }

    #[test]
    fn insufficient_resource_message() {
        let err = MechError::InsufficientResource {
            resource: "focus".into(),
            required: 3,
            available: 1,
        };
        assert_eq!(err.to_string(), "not enough focus: need 3, have 1");
    }
}
