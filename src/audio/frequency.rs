use crate::protocol::NoteToken;

/// Pitch of every token in Hz. The rest maps to 0, which the synthesizer
/// treats as silence.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyTable {
    hz: [f64; NoteToken::COUNT],
}

impl FrequencyTable {
    pub fn new(hz: [f64; NoteToken::COUNT]) -> Self {
        Self { hz }
    }

    pub fn frequency(&self, token: NoteToken) -> f64 {
        self.hz[token.slot()]
    }
}

impl Default for FrequencyTable {
    /// The tuning the instruments were built around: LA..RE# sit in the
    /// second octave, MI..SOL# one octave below.
    fn default() -> Self {
        Self::new([
            110.0, // LA
            123.5, // SI
            130.8, // DO
            138.6, // DO#
            146.8, // RE
            155.6, // RE#
            82.4,  // MI
            87.3,  // FA
            92.5,  // FA#
            98.0,  // SOL
            103.8, // SOL#
            0.0,   // pausa
        ])
    }
}
