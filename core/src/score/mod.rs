pub mod note;
mod validate;

pub use self::note::{sort_by_start_time, Lane, Note, NoteId};

use std::collections::HashMap;

use failure::Fail;
use log::{debug, trace};

use crate::time::{SecondsTime, TimeError, TimeMapper, TimelineConfig};

#[derive(Debug, Fail, PartialEq, Clone)]
pub enum ScoreError {
  #[fail(display = "Invalid score: {}", cause)]
  InvalidScore { cause: String },

  #[fail(display = "Failed to build the score timeline: {}", cause)]
  Timeline {
    #[fail(cause)]
    cause: TimeError,
  },
}

impl From<TimeError> for ScoreError {
  fn from(cause: TimeError) -> Self {
    ScoreError::Timeline { cause }
  }
}

pub type ScoreResult<T> = Result<T, ScoreError>;

pub type NoteSchedule = HashMap<NoteId, SecondsTime>;

/// The notes of a chart spread over its lanes, together with when each note
/// starts and ends in seconds.
///
/// Notes are always kept sorted by their start position. Every change to the
/// notes or to the timeline computes the schedule again, and the score is left
/// untouched if that fails.
#[derive(Debug, Clone)]
pub struct Score {
  notes: Vec<Note>,
  lane_count: Lane,
  config: TimelineConfig,
  mapper: TimeMapper,
  start_seconds: NoteSchedule,
  end_seconds: NoteSchedule,
}

impl Score {
  pub fn new(notes: Vec<Note>, lane_count: Lane, config: TimelineConfig) -> ScoreResult<Score> {
    let mut notes = notes;
    sort_by_start_time(&mut notes);

    validate::check_structure(&notes, lane_count, &config)?;

    let mapper = TimeMapper::from_config(&config, total_measures(&notes))?;

    validate::check_beats(&notes, &mapper)?;

    let (start_seconds, end_seconds) = schedule(&notes, &mapper)?;

    debug!(
      "Score ready with {} notes in {} lanes",
      notes.len(),
      lane_count
    );

    Ok(Score {
      notes,
      lane_count,
      config,
      mapper,
      start_seconds,
      end_seconds,
    })
  }

  pub fn notes(&self) -> &[Note] {
    &self.notes
  }

  pub fn note(&self, id: NoteId) -> Option<&Note> {
    self.notes.iter().find(|note| note.get_id() == id)
  }

  pub fn lane_count(&self) -> Lane {
    self.lane_count
  }

  pub fn config(&self) -> &TimelineConfig {
    &self.config
  }

  pub fn mapper(&self) -> &TimeMapper {
    &self.mapper
  }

  pub fn start_seconds(&self) -> &NoteSchedule {
    &self.start_seconds
  }

  pub fn end_seconds(&self) -> &NoteSchedule {
    &self.end_seconds
  }

  pub fn start_seconds_of(&self, id: NoteId) -> Option<SecondsTime> {
    self.start_seconds.get(&id).cloned()
  }

  pub fn end_seconds_of(&self, id: NoteId) -> Option<SecondsTime> {
    self.end_seconds.get(&id).cloned()
  }

  /// Time at which the last note ends.
  pub fn duration(&self) -> SecondsTime {
    self
      .end_seconds
      .values()
      .max()
      .cloned()
      .unwrap_or_else(SecondsTime::zero)
  }

  pub fn notes_in_lane<'a>(&'a self, lane: Lane) -> impl Iterator<Item = &'a Note> + 'a {
    self
      .notes
      .iter()
      .filter(move |note| note.get_lane() == lane)
  }

  /// Notes starting within `[from, to)`, in start order.
  pub fn notes_starting_between<'a>(
    &'a self,
    from: SecondsTime,
    to: SecondsTime,
  ) -> impl Iterator<Item = &'a Note> + 'a {
    self.notes.iter().filter(move |note| {
      self
        .start_seconds
        .get(&note.get_id())
        .map_or(false, |start| from <= *start && *start < to)
    })
  }

  pub fn sort_all_notes(&mut self) {
    sort_by_start_time(&mut self.notes);
  }

  pub fn add_note(&mut self, note: Note) -> ScoreResult<&mut Self> {
    self.add_notes(vec![note])
  }

  pub fn add_notes(&mut self, notes: Vec<Note>) -> ScoreResult<&mut Self> {
    let mut all_notes = self.notes.clone();
    all_notes.extend(notes);
    *self = Score::new(all_notes, self.lane_count, self.config.clone())?;
    Ok(self)
  }

  pub fn remove_note(&mut self, id: NoteId) -> ScoreResult<Option<Note>> {
    match self.notes.iter().position(|note| note.get_id() == id) {
      Some(index) => {
        let mut notes = self.notes.clone();
        let removed = notes.remove(index);
        *self = Score::new(notes, self.lane_count, self.config.clone())?;
        Ok(Some(removed))
      }
      None => Ok(None),
    }
  }

  pub fn set_timeline(&mut self, config: TimelineConfig) -> ScoreResult<&mut Self> {
    *self = Score::new(self.notes.clone(), self.lane_count, config)?;
    Ok(self)
  }
}

/// The timeline has to cover up to the measure where the last note ends.
fn total_measures(notes: &[Note]) -> u32 {
  notes
    .iter()
    .map(|note| note.get_end().get_measure())
    .max()
    .unwrap_or(0)
    .saturating_add(1)
}

fn schedule(notes: &[Note], mapper: &TimeMapper) -> ScoreResult<(NoteSchedule, NoteSchedule)> {
  let mut start_seconds = NoteSchedule::with_capacity(notes.len());
  let mut end_seconds = NoteSchedule::with_capacity(notes.len());

  for note in notes {
    let start = mapper.to_seconds(note.get_start())?;
    let end = mapper.to_seconds(note.get_end())?;
    trace!(
      "Note {} in lane {}: [{}, {}] -> [{:.3}s, {:.3}s]",
      note.get_id(),
      note.get_lane(),
      note.get_start(),
      note.get_end(),
      start.get_seconds(),
      end.get_seconds()
    );
    start_seconds.insert(note.get_id(), start);
    end_seconds.insert(note.get_id(), end);
  }

  Ok((start_seconds, end_seconds))
}
