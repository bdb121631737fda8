//! Game mode selection and player naming.

use derive_new::new;

/// Who sits in the second seat. The first seat is always a local human.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "kebab-case")]
pub enum GameMode {
    /// Two humans sharing one board.
    HumanVsHuman,
    /// A human against a local computer strategy.
    #[default]
    HumanVsComputer,
    /// A human against the remote service.
    HumanVsRemote,
}

impl GameMode {
    /// Returns the display label for this option.
    pub fn label(self) -> &'static str {
        match self {
            Self::HumanVsHuman => "Human vs Human",
            Self::HumanVsComputer => "Human vs Computer",
            Self::HumanVsRemote => "Human vs Remote",
        }
    }
}

/// Display names entered for the two seats. Empty names get seat defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default, new)]
pub struct PlayerNames {
    /// Name for the first seat.
    pub first: String,
    /// Name for the second seat.
    pub second: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_mode_round_trips_through_cli_names() {
        for mode in GameMode::iter() {
            assert_eq!(GameMode::from_str(&mode.to_string()).unwrap(), mode);
        }
        assert_eq!(
            GameMode::from_str("human-vs-remote").unwrap(),
            GameMode::HumanVsRemote
        );
    }

    #[test]
    fn test_labels() {
        assert_eq!(GameMode::HumanVsHuman.label(), "Human vs Human");
        assert_eq!(GameMode::HumanVsRemote.label(), "Human vs Remote");
    }

    #[test]
    fn test_default_mode() {
        assert_eq!(GameMode::default(), GameMode::HumanVsComputer);
    }
}
