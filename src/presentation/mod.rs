//! Presentation side of the pipeline: everything here runs on the single
//! presentation thread and is only ever touched through `&mut`.

mod schedule;
mod staff;

pub use schedule::{HideSchedule, ScheduledHide};
pub use staff::Staff;

use crate::audio::{FrequencyTable, ToneBuffer, synth};
use crate::events::{NoteEvent, SourceId};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Longest tone handed to the audio output. Longer notes still light their
/// slot for the full duration.
pub const MAX_TONE_MS: u32 = 60_000;

/// Consumer of dispatched events. Called once per delivered event, never
/// concurrently with itself.
pub trait PresentationSink {
    fn show(&mut self, source: SourceId, event: NoteEvent, now: Instant);
}

/// Audio back end fed by the [`Presenter`].
pub trait TonePlayer {
    fn play(&mut self, tone: ToneBuffer);
}

/// Staffs for every source, the hide schedule and an optional tone player.
pub struct Presenter {
    staffs: Vec<Staff>,
    schedule: HideSchedule,
    frequencies: FrequencyTable,
    player: Option<Box<dyn TonePlayer>>,
}

impl Presenter {
    pub fn new(source_count: usize) -> Self {
        Self {
            staffs: vec![Staff::new(); source_count],
            schedule: HideSchedule::new(),
            frequencies: FrequencyTable::default(),
            player: None,
        }
    }

    pub fn with_player(mut self, player: Box<dyn TonePlayer>) -> Self {
        self.player = Some(player);
        self
    }

    pub fn with_frequencies(mut self, frequencies: FrequencyTable) -> Self {
        self.frequencies = frequencies;
        self
    }

    pub fn has_audio(&self) -> bool {
        self.player.is_some()
    }

    pub fn staff(&self, source: SourceId) -> Option<&Staff> {
        self.staffs.get(source.index())
    }

    /// Runs every hide due at `now`. Returns how many slots went dark.
    pub fn expire(&mut self, now: Instant) -> usize {
        let mut hidden = 0;
        while let Some(hide) = self.schedule.pop_due(now) {
            let Some(staff) = self.staffs.get_mut(hide.source.index()) else {
                continue;
            };
            if staff.hide(hide.slot, hide.generation) {
                hidden += 1;
            }
        }
        hidden
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.schedule.next_deadline()
    }

    pub fn pending_hides(&self) -> usize {
        self.schedule.len()
    }

    /// Darkens every slot of one source, dropping nothing from the schedule;
    /// the stale hides are ignored when they fire.
    pub fn reset(&mut self, source: SourceId) {
        if let Some(staff) = self.staffs.get_mut(source.index()) {
            staff.clear();
        }
    }
}

impl PresentationSink for Presenter {
    fn show(&mut self, source: SourceId, event: NoteEvent, now: Instant) {
        let Some(staff) = self.staffs.get_mut(source.index()) else {
            warn!("event for unconfigured {}", source);
            return;
        };

        let generation = staff.light(event.token);
        let fire_at = now + Duration::from_millis(u64::from(event.duration_ms));
        self.schedule
            .schedule(fire_at, source, event.token.slot(), generation);

        if let Some(player) = self.player.as_mut() {
            let duration_ms = event.duration_ms.min(MAX_TONE_MS);
            if duration_ms < event.duration_ms {
                debug!("{}: tone for {} capped at {} ms", source, event.token, MAX_TONE_MS);
            }
            if let Some(tone) = synth(self.frequencies.frequency(event.token), duration_ms) {
                player.play(tone);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::NoteToken;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<ToneBuffer>>>);

    impl TonePlayer for Recorder {
        fn play(&mut self, tone: ToneBuffer) {
            self.0.borrow_mut().push(tone);
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn shows_then_hides_after_duration() {
        let t0 = Instant::now();
        let mut presenter = Presenter::new(1);
        presenter.show(SourceId(0), NoteEvent::new(NoteToken::La, 500), t0);

        let staff = presenter.staff(SourceId(0)).unwrap();
        assert_eq!(staff.lit().collect::<Vec<_>>(), vec![NoteToken::La]);
        assert_eq!(presenter.next_deadline(), Some(t0 + ms(500)));

        assert_eq!(presenter.expire(t0 + ms(499)), 0);
        assert!(presenter.staff(SourceId(0)).unwrap().is_lit(NoteToken::La));
        assert_eq!(presenter.expire(t0 + ms(500)), 1);
        assert!(!presenter.staff(SourceId(0)).unwrap().is_lit(NoteToken::La));
        assert_eq!(presenter.pending_hides(), 0);
    }

    #[test]
    fn sharp_note_lights_its_marker() {
        let t0 = Instant::now();
        let mut presenter = Presenter::new(1);
        presenter.show(SourceId(0), NoteEvent::new(NoteToken::DoSharp, 300), t0);
        let staff = presenter.staff(SourceId(0)).unwrap();
        assert!(staff.is_lit(NoteToken::DoSharp));
        assert!(staff.sharp_marker_lit(NoteToken::DoSharp));
        assert!(!staff.is_lit(NoteToken::Do));

        presenter.expire(t0 + ms(300));
        let staff = presenter.staff(SourceId(0)).unwrap();
        assert!(!staff.sharp_marker_lit(NoteToken::DoSharp));
    }

    #[test]
    fn retrigger_extends_instead_of_cutting_short() {
        let t0 = Instant::now();
        let mut presenter = Presenter::new(1);
        presenter.show(SourceId(0), NoteEvent::new(NoteToken::Mi, 500), t0);
        presenter.show(SourceId(0), NoteEvent::new(NoteToken::Mi, 500), t0 + ms(300));

        // first hide fires, but the slot belongs to the second note now
        assert_eq!(presenter.expire(t0 + ms(600)), 0);
        assert!(presenter.staff(SourceId(0)).unwrap().is_lit(NoteToken::Mi));

        assert_eq!(presenter.expire(t0 + ms(800)), 1);
        assert!(!presenter.staff(SourceId(0)).unwrap().is_lit(NoteToken::Mi));
    }

    #[test]
    fn sources_have_separate_staffs() {
        let t0 = Instant::now();
        let mut presenter = Presenter::new(2);
        presenter.show(SourceId(0), NoteEvent::new(NoteToken::Re, 100), t0);
        presenter.show(SourceId(1), NoteEvent::new(NoteToken::Re, 400), t0);

        presenter.expire(t0 + ms(100));
        assert!(!presenter.staff(SourceId(0)).unwrap().is_lit(NoteToken::Re));
        assert!(presenter.staff(SourceId(1)).unwrap().is_lit(NoteToken::Re));
    }

    #[test]
    fn unknown_source_is_dropped() {
        let mut presenter = Presenter::new(1);
        presenter.show(SourceId(3), NoteEvent::new(NoteToken::Re, 100), Instant::now());
        assert_eq!(presenter.pending_hides(), 0);
    }

    #[test]
    fn plays_tones_but_not_rests() {
        let recorder = Recorder::default();
        let mut presenter = Presenter::new(1).with_player(Box::new(recorder.clone()));
        let t0 = Instant::now();

        presenter.show(SourceId(0), NoteEvent::new(NoteToken::Rest, 200), t0);
        assert!(recorder.0.borrow().is_empty());
        assert!(presenter.staff(SourceId(0)).unwrap().rest_marker_lit());

        presenter.show(SourceId(0), NoteEvent::new(NoteToken::La, 1000), t0);
        let tones = recorder.0.borrow();
        assert_eq!(tones.len(), 1);
        assert_eq!(tones[0], synth(110.0, 1000).unwrap());
    }

    #[test]
    fn long_notes_cap_the_tone_only() {
        let recorder = Recorder::default();
        let mut presenter = Presenter::new(1).with_player(Box::new(recorder.clone()));
        let t0 = Instant::now();
        presenter.show(SourceId(0), NoteEvent::new(NoteToken::Si, MAX_TONE_MS + 1), t0);
        assert_eq!(recorder.0.borrow()[0].len(), crate::audio::sample_count(MAX_TONE_MS));
        assert_eq!(
            presenter.next_deadline(),
            Some(t0 + ms(u64::from(MAX_TONE_MS) + 1))
        );
    }
}
