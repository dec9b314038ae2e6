use super::{Dialect, NoteToken};
use crate::events::NoteEvent;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed line {line:?}: expected <note>,<duration_ms>")]
    Malformed { line: String },
    #[error("unknown note {note:?}")]
    UnknownNote { note: String },
    #[error("invalid duration {duration:?}")]
    InvalidDuration { duration: String },
}

/// Decodes one line using the default (`DO#`) spelling of sharps.
pub fn decode(line: &[u8]) -> Result<NoteEvent, DecodeError> {
    decode_with(line, Dialect::Sharp)
}

/// Decodes one protocol line into a [`NoteEvent`].
///
/// Surrounding whitespace and line terminators are ignored. The line must
/// hold exactly two comma-separated fields: a note spelled exactly as the
/// dialect spells it, and a strictly positive decimal duration. The note is
/// checked before the duration, so a line with both fields wrong reports
/// [`DecodeError::UnknownNote`].
pub fn decode_with(line: &[u8], dialect: Dialect) -> Result<NoteEvent, DecodeError> {
    let text = std::str::from_utf8(line).map_err(|_| DecodeError::Malformed {
        line: String::from_utf8_lossy(line).into_owned(),
    })?;
    let text = text.trim();

    let mut fields = text.split(',');
    let (Some(note), Some(duration), None) = (fields.next(), fields.next(), fields.next()) else {
        return Err(DecodeError::Malformed {
            line: text.to_string(),
        });
    };

    let token = NoteToken::parse(note, dialect).ok_or_else(|| DecodeError::UnknownNote {
        note: note.to_string(),
    })?;

    let invalid = || DecodeError::InvalidDuration {
        duration: duration.to_string(),
    };
    let duration_ms = duration.trim().parse::<i64>().map_err(|_| invalid())?;
    if duration_ms <= 0 {
        return Err(invalid());
    }
    let duration_ms = u32::try_from(duration_ms).map_err(|_| invalid())?;

    Ok(NoteEvent::new(token, duration_ms))
}
