use crate::assembler::SequenceRole;
use thiserror::Error;

/// Failures of a splice request. None of them are worth retrying with the
/// same enzyme selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpliceError {
    #[error("Enzyme '{enzyme}' cuts the {role} {found} time(s), {expected} required")]
    AmbiguousCut {
        enzyme: String,
        role: SequenceRole,
        found: usize,
        expected: usize,
    },
    #[error("Backbone enzymes {backbone:?} cannot be paired with insert enzymes {insert:?}")]
    IncompatibleSelection {
        backbone: Vec<String>,
        insert: Vec<String>,
    },
    #[error("An enzyme selection needs one or two enzyme names, got {0}")]
    InvalidEnzymeCount(usize),
    #[error("No enzymes left in the panel")]
    EmptyPanel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_enzyme() {
        let err = SpliceError::AmbiguousCut {
            enzyme: "ScaI".to_string(),
            role: SequenceRole::Backbone,
            found: 2,
            expected: 1,
        };
        assert_eq!(
            err.to_string(),
            "Enzyme 'ScaI' cuts the backbone 2 time(s), 1 required"
        );
        assert_eq!(
            SpliceError::InvalidEnzymeCount(3).to_string(),
            "An enzyme selection needs one or two enzyme names, got 3"
        );
    }
}
