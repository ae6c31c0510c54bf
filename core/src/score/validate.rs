use std::collections::HashSet;

use crate::score::{Lane, Note, ScoreError, ScoreResult};
use crate::time::{MeasureTime, TimeMapper, TimelineConfig};

fn invalid<T>(cause: String) -> ScoreResult<T> {
  Err(ScoreError::InvalidScore { cause })
}

/// Checks that only depend on the notes and the configuration as given.
pub(super) fn check_structure(notes: &[Note], lane_count: Lane, config: &TimelineConfig) -> ScoreResult<()> {
  if lane_count == 0 {
    return invalid("a score needs at least one lane".to_string());
  }

  let mut ids = HashSet::with_capacity(notes.len());
  for note in notes {
    let lane = note.get_lane();
    if lane == 0 || lane > lane_count {
      return invalid(format!(
        "note {} is in lane {} but lanes go from 1 to {}",
        note.get_id(),
        lane,
        lane_count
      ));
    }

    if note.get_end() < note.get_start() {
      return invalid(format!(
        "note {} ends at {} before it starts at {}",
        note.get_id(),
        note.get_end(),
        note.get_start()
      ));
    }

    if !ids.insert(note.get_id()) {
      return invalid(format!("note {} appears more than once", note.get_id()));
    }
  }

  for (at, tempo) in config.tempos() {
    if !tempo.is_valid() {
      return invalid(format!("the tempo at {} is {} bpm", at, tempo.get_value()));
    }
  }

  Ok(())
}

/// Checks that every note position fits in the meter in force at its measure.
pub(super) fn check_beats(notes: &[Note], mapper: &TimeMapper) -> ScoreResult<()> {
  for note in notes {
    for time in [note.get_start(), note.get_end()].iter() {
      check_beat(note, *time, mapper)?;
    }
  }
  Ok(())
}

fn check_beat(note: &Note, time: MeasureTime, mapper: &TimeMapper) -> ScoreResult<()> {
  let meter = mapper.meter_at(time.get_measure()).map_err(ScoreError::from)?;
  if time.is_within(meter) {
    Ok(())
  } else {
    invalid(format!(
      "note {} has a position at {} that does not fit in a measure of {}",
      note.get_id(),
      time,
      meter
    ))
  }
}
