use phf::{Map, phf_map};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// An atomic electron subshell capable of holding a vacancy.
///
/// The discriminant of each variant is its ENDF subshell designator, so the
/// numeric values used by the nuclear-data layer convert directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Subshell {
    K = 1,
    L1 = 2,
    L2 = 3,
    L3 = 4,
    M1 = 5,
    M2 = 6,
    M3 = 7,
    M4 = 8,
    M5 = 9,
    N1 = 10,
    N2 = 11,
    N3 = 12,
    N4 = 13,
    N5 = 14,
    N6 = 15,
    N7 = 16,
    O1 = 17,
    O2 = 18,
    O3 = 19,
    O4 = 20,
    O5 = 21,
    O6 = 22,
    O7 = 23,
    O8 = 24,
    O9 = 25,
    P1 = 26,
    P2 = 27,
    P3 = 28,
    P4 = 29,
    P5 = 30,
    P6 = 31,
    P7 = 32,
    P8 = 33,
    P9 = 34,
    P10 = 35,
    P11 = 36,
    Q1 = 37,
    Q2 = 38,
    Q3 = 39,
}

static SUBSHELL_NAMES: Map<&'static str, Subshell> = phf_map! {
    "K" => Subshell::K,
    "L1" => Subshell::L1, "L2" => Subshell::L2, "L3" => Subshell::L3,
    "M1" => Subshell::M1, "M2" => Subshell::M2, "M3" => Subshell::M3,
    "M4" => Subshell::M4, "M5" => Subshell::M5,
    "N1" => Subshell::N1, "N2" => Subshell::N2, "N3" => Subshell::N3,
    "N4" => Subshell::N4, "N5" => Subshell::N5, "N6" => Subshell::N6, "N7" => Subshell::N7,
    "O1" => Subshell::O1, "O2" => Subshell::O2, "O3" => Subshell::O3,
    "O4" => Subshell::O4, "O5" => Subshell::O5, "O6" => Subshell::O6,
    "O7" => Subshell::O7, "O8" => Subshell::O8, "O9" => Subshell::O9,
    "P1" => Subshell::P1, "P2" => Subshell::P2, "P3" => Subshell::P3,
    "P4" => Subshell::P4, "P5" => Subshell::P5, "P6" => Subshell::P6,
    "P7" => Subshell::P7, "P8" => Subshell::P8, "P9" => Subshell::P9,
    "P10" => Subshell::P10, "P11" => Subshell::P11,
    "Q1" => Subshell::Q1, "Q2" => Subshell::Q2, "Q3" => Subshell::Q3,
};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid subshell name '{0}'")]
pub struct ParseSubshellError(pub String);

impl Subshell {
    /// Every subshell, in ENDF designator order.
    pub const ALL: [Subshell; 39] = [
        Self::K,
        Self::L1,
        Self::L2,
        Self::L3,
        Self::M1,
        Self::M2,
        Self::M3,
        Self::M4,
        Self::M5,
        Self::N1,
        Self::N2,
        Self::N3,
        Self::N4,
        Self::N5,
        Self::N6,
        Self::N7,
        Self::O1,
        Self::O2,
        Self::O3,
        Self::O4,
        Self::O5,
        Self::O6,
        Self::O7,
        Self::O8,
        Self::O9,
        Self::P1,
        Self::P2,
        Self::P3,
        Self::P4,
        Self::P5,
        Self::P6,
        Self::P7,
        Self::P8,
        Self::P9,
        Self::P10,
        Self::P11,
        Self::Q1,
        Self::Q2,
        Self::Q3,
    ];

    /// Converts an ENDF subshell designator into a subshell.
    ///
    /// Designator `0` is the data convention for "no subshell" (e.g. the
    /// secondary vacancy of a radiative transition) and maps to `None`, as
    /// does any designator past `Q3`.
    pub fn from_endf_designator(designator: u32) -> Option<Self> {
        match designator {
            1..=39 => Some(Self::ALL[designator as usize - 1]),
            _ => None,
        }
    }

    pub fn endf_designator(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::K => "K",
            Self::L1 => "L1",
            Self::L2 => "L2",
            Self::L3 => "L3",
            Self::M1 => "M1",
            Self::M2 => "M2",
            Self::M3 => "M3",
            Self::M4 => "M4",
            Self::M5 => "M5",
            Self::N1 => "N1",
            Self::N2 => "N2",
            Self::N3 => "N3",
            Self::N4 => "N4",
            Self::N5 => "N5",
            Self::N6 => "N6",
            Self::N7 => "N7",
            Self::O1 => "O1",
            Self::O2 => "O2",
            Self::O3 => "O3",
            Self::O4 => "O4",
            Self::O5 => "O5",
            Self::O6 => "O6",
            Self::O7 => "O7",
            Self::O8 => "O8",
            Self::O9 => "O9",
            Self::P1 => "P1",
            Self::P2 => "P2",
            Self::P3 => "P3",
            Self::P4 => "P4",
            Self::P5 => "P5",
            Self::P6 => "P6",
            Self::P7 => "P7",
            Self::P8 => "P8",
            Self::P9 => "P9",
            Self::P10 => "P10",
            Self::P11 => "P11",
            Self::Q1 => "Q1",
            Self::Q2 => "Q2",
            Self::Q3 => "Q3",
        }
    }
}

impl FromStr for Subshell {
    type Err = ParseSubshellError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SUBSHELL_NAMES
            .get(s.trim().to_ascii_uppercase().as_str())
            .copied()
            .ok_or_else(|| ParseSubshellError(s.to_string()))
    }
}

impl fmt::Display for Subshell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
