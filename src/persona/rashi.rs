//! The twelve zodiac signs offered for one-shot horoscopes

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rashi {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl Rashi {
    pub const ALL: [Rashi; 12] = [
        Rashi::Aries,
        Rashi::Taurus,
        Rashi::Gemini,
        Rashi::Cancer,
        Rashi::Leo,
        Rashi::Virgo,
        Rashi::Libra,
        Rashi::Scorpio,
        Rashi::Sagittarius,
        Rashi::Capricorn,
        Rashi::Aquarius,
        Rashi::Pisces,
    ];

    /// Stable identifier used in URLs and JSON
    pub fn id(self) -> &'static str {
        match self {
            Rashi::Aries => "aries",
            Rashi::Taurus => "taurus",
            Rashi::Gemini => "gemini",
            Rashi::Cancer => "cancer",
            Rashi::Leo => "leo",
            Rashi::Virgo => "virgo",
            Rashi::Libra => "libra",
            Rashi::Scorpio => "scorpio",
            Rashi::Sagittarius => "sagittarius",
            Rashi::Capricorn => "capricorn",
            Rashi::Aquarius => "aquarius",
            Rashi::Pisces => "pisces",
        }
    }

    /// Display label, Nepali name first
    pub fn label(self) -> &'static str {
        match self {
            Rashi::Aries => "मेष (Aries)",
            Rashi::Taurus => "वृष (Taurus)",
            Rashi::Gemini => "मिथुन (Gemini)",
            Rashi::Cancer => "कर्कट (Cancer)",
            Rashi::Leo => "सिंह (Leo)",
            Rashi::Virgo => "कन्या (Virgo)",
            Rashi::Libra => "तुला (Libra)",
            Rashi::Scorpio => "वृश्चिक (Scorpio)",
            Rashi::Sagittarius => "धनु (Sagittarius)",
            Rashi::Capricorn => "मकर (Capricorn)",
            Rashi::Aquarius => "कुम्भ (Aquarius)",
            Rashi::Pisces => "मीन (Pisces)",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Rashi::Aries => "♈",
            Rashi::Taurus => "♉",
            Rashi::Gemini => "♊",
            Rashi::Cancer => "♋",
            Rashi::Leo => "♌",
            Rashi::Virgo => "♍",
            Rashi::Libra => "♎",
            Rashi::Scorpio => "♏",
            Rashi::Sagittarius => "♐",
            Rashi::Capricorn => "♑",
            Rashi::Aquarius => "♒",
            Rashi::Pisces => "♓",
        }
    }

    /// Static one-phrase outlook shown on the sign card
    pub fn outlook(self) -> &'static str {
        match self {
            Rashi::Aries => "शुभ फल",
            Rashi::Taurus | Rashi::Virgo | Rashi::Aquarius => "सामान्य",
            Rashi::Gemini => "आर्थिक लाभ",
            Rashi::Cancer => "यात्रा योग",
            Rashi::Leo => "कार्य सिद्धि",
            Rashi::Libra => "पारिवारिक सुख",
            Rashi::Scorpio => "स्वास्थ्य लाभ",
            Rashi::Sagittarius => "शुभ समाचार",
            Rashi::Capricorn => "व्यवसाय वृद्धि",
            Rashi::Pisces => "आध्यात्मिक लाभ",
        }
    }
}

impl fmt::Display for Rashi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown rashi: {0}")]
pub struct UnknownRashi(pub String);

impl FromStr for Rashi {
    type Err = UnknownRashi;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Rashi::ALL
            .into_iter()
            .find(|r| r.id() == wanted)
            .ok_or_else(|| UnknownRashi(s.to_string()))
    }
}

impl Serialize for Rashi {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}
