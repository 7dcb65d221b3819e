use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::SpecErr;

/// Which body model a mesh is generated with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyVariant {
    #[default]
    Neutral,
    Male,
    Female,
}

impl BodyVariant {
    pub const ALL: [Self; 3] = [Self::Neutral, Self::Male, Self::Female];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Male => "male",
            Self::Female => "female",
        }
    }

    /// The model file name for this variant, relative to the `smpl` models directory.
    pub fn model_file_name(self) -> &'static str {
        match self {
            Self::Neutral => "SMPL_NEUTRAL.safetensors",
            Self::Male => "SMPL_MALE.safetensors",
            Self::Female => "SMPL_FEMALE.safetensors",
        }
    }
}

impl fmt::Display for BodyVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BodyVariant {
    type Err = SpecErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|variant| variant.as_str() == s)
            .ok_or_else(|| SpecErr::InvalidVariant(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_only_the_three_variants() {
        assert_eq!("neutral".parse::<BodyVariant>().unwrap(), BodyVariant::Neutral);
        assert_eq!("female".parse::<BodyVariant>().unwrap(), BodyVariant::Female);
        assert!(matches!(
            "robot".parse::<BodyVariant>(),
            Err(SpecErr::InvalidVariant(got)) if got == "robot"
        ));
        assert!("Male".parse::<BodyVariant>().is_err());
    }
}
