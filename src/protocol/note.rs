use serde::{Deserialize, Serialize};
use std::fmt;

/// The twelve symbols an instrument can announce, in staff order.
///
/// The discriminant is the visual slot index, so the order of the variants
/// must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteToken {
    La,
    Si,
    Do,
    DoSharp,
    Re,
    ReSharp,
    Mi,
    Fa,
    FaSharp,
    Sol,
    SolSharp,
    Rest,
}

/// How sharps are spelled on the wire. Older firmware sent `DOd` where the
/// current one sends `DO#`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Dialect {
    #[default]
    Sharp,
    Suffix,
}

impl NoteToken {
    pub const COUNT: usize = 12;

    pub const ALL: [NoteToken; Self::COUNT] = [
        NoteToken::La,
        NoteToken::Si,
        NoteToken::Do,
        NoteToken::DoSharp,
        NoteToken::Re,
        NoteToken::ReSharp,
        NoteToken::Mi,
        NoteToken::Fa,
        NoteToken::FaSharp,
        NoteToken::Sol,
        NoteToken::SolSharp,
        NoteToken::Rest,
    ];

    pub fn slot(self) -> usize {
        self as usize
    }

    pub fn from_slot(slot: usize) -> Option<Self> {
        Self::ALL.get(slot).copied()
    }

    pub fn is_sharp(self) -> bool {
        matches!(
            self,
            NoteToken::DoSharp
                | NoteToken::ReSharp
                | NoteToken::FaSharp
                | NoteToken::SolSharp
        )
    }

    pub fn is_rest(self) -> bool {
        self == NoteToken::Rest
    }

    /// Spelling used by the default dialect, also used for display.
    pub fn name(self) -> &'static str {
        self.spelling(Dialect::Sharp)
    }

    pub fn spelling(self, dialect: Dialect) -> &'static str {
        match (self, dialect) {
            (NoteToken::La, _) => "LA",
            (NoteToken::Si, _) => "SI",
            (NoteToken::Do, _) => "DO",
            (NoteToken::DoSharp, Dialect::Sharp) => "DO#",
            (NoteToken::DoSharp, Dialect::Suffix) => "DOd",
            (NoteToken::Re, _) => "RE",
            (NoteToken::ReSharp, Dialect::Sharp) => "RE#",
            (NoteToken::ReSharp, Dialect::Suffix) => "REd",
            (NoteToken::Mi, _) => "MI",
            (NoteToken::Fa, _) => "FA",
            (NoteToken::FaSharp, Dialect::Sharp) => "FA#",
            (NoteToken::FaSharp, Dialect::Suffix) => "FAd",
            (NoteToken::Sol, _) => "SOL",
            (NoteToken::SolSharp, Dialect::Sharp) => "SOL#",
            (NoteToken::SolSharp, Dialect::Suffix) => "SOLd",
            (NoteToken::Rest, _) => "pausa",
        }
    }

    /// Exact, case-sensitive lookup.
    pub fn parse(text: &str, dialect: Dialect) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|token| token.spelling(dialect) == text)
    }
}

impl fmt::Display for NoteToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_follow_staff_order() {
        for (i, token) in NoteToken::ALL.iter().enumerate() {
            assert_eq!(token.slot(), i);
            assert_eq!(NoteToken::from_slot(i), Some(*token));
        }
        assert_eq!(NoteToken::La.slot(), 0);
        assert_eq!(NoteToken::DoSharp.slot(), 3);
        assert_eq!(NoteToken::Rest.slot(), 11);
        assert_eq!(NoteToken::from_slot(12), None);
    }

    #[test]
    fn eleven_pitches_and_one_rest() {
        let rests = NoteToken::ALL.iter().filter(|t| t.is_rest()).count();
        let sharps = NoteToken::ALL.iter().filter(|t| t.is_sharp()).count();
        assert_eq!(rests, 1);
        assert_eq!(sharps, 4);
        assert!(!NoteToken::Rest.is_sharp());
    }

    #[test]
    fn parse_is_exact_per_dialect() {
        assert_eq!(NoteToken::parse("DO#", Dialect::Sharp), Some(NoteToken::DoSharp));
        assert_eq!(NoteToken::parse("DOd", Dialect::Sharp), None);
        assert_eq!(NoteToken::parse("DOd", Dialect::Suffix), Some(NoteToken::DoSharp));
        assert_eq!(NoteToken::parse("DO#", Dialect::Suffix), None);
        assert_eq!(NoteToken::parse("pausa", Dialect::Suffix), Some(NoteToken::Rest));
        assert_eq!(NoteToken::parse("la", Dialect::Sharp), None);
        assert_eq!(NoteToken::parse("PAUSA", Dialect::Sharp), None);
        assert_eq!(NoteToken::parse(" LA", Dialect::Sharp), None);
    }

    #[test]
    fn every_spelling_round_trips() {
        for dialect in [Dialect::Sharp, Dialect::Suffix] {
            for token in NoteToken::ALL {
                assert_eq!(NoteToken::parse(token.spelling(dialect), dialect), Some(token));
            }
        }
    }
}
