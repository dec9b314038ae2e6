use crate::protocol::NoteToken;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Slot {
    lit: bool,
    generation: u64,
}

/// Lit/unlit state of the twelve slots of one source's staff.
///
/// Every call to [`Staff::light`] hands out a new generation for the slot; a
/// hide only takes effect if it carries the slot's current generation, so a
/// retriggered note stays lit until its latest duration runs out.
#[derive(Debug, Clone, Default)]
pub struct Staff {
    slots: [Slot; NoteToken::COUNT],
}

impl Staff {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn light(&mut self, token: NoteToken) -> u64 {
        let slot = &mut self.slots[token.slot()];
        slot.generation += 1;
        slot.lit = true;
        slot.generation
    }

    /// Returns whether the slot went dark.
    pub fn hide(&mut self, slot: usize, generation: u64) -> bool {
        match self.slots.get_mut(slot) {
            Some(s) if s.lit && s.generation == generation => {
                s.lit = false;
                true
            }
            _ => false,
        }
    }

    pub fn is_lit(&self, token: NoteToken) -> bool {
        self.slots[token.slot()].lit
    }

    /// The `#` drawn next to a sharp note follows its note head.
    pub fn sharp_marker_lit(&self, token: NoteToken) -> bool {
        token.is_sharp() && self.is_lit(token)
    }

    pub fn rest_marker_lit(&self) -> bool {
        self.is_lit(NoteToken::Rest)
    }

    pub fn lit(&self) -> impl Iterator<Item = NoteToken> + '_ {
        NoteToken::ALL.into_iter().filter(|token| self.is_lit(*token))
    }

    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.lit = false;
        }
    }
}
