use std::fmt;

use uuid::Uuid;

use crate::time::MeasureTime;

pub type Lane = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoteId(Uuid);

impl NoteId {
  pub fn new() -> NoteId {
    NoteId(Uuid::new_v4())
  }
}

impl Default for NoteId {
  fn default() -> Self {
    NoteId::new()
  }
}

impl fmt::Display for NoteId {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Something the player has to react to when it reaches the hit line of its lane.
///
/// A tap note starts and ends at the same position, a hold note has to be held
/// until its end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
  id: NoteId,
  start: MeasureTime,
  end: MeasureTime,
  lane: Lane,
}

impl Note {
  pub fn new(start: MeasureTime, end: MeasureTime, lane: Lane) -> Note {
    Note {
      id: NoteId::new(),
      start,
      end,
      lane,
    }
  }

  pub fn tap(at: MeasureTime, lane: Lane) -> Note {
    Note::new(at, at, lane)
  }

  pub fn get_id(&self) -> NoteId {
    self.id
  }

  pub fn get_start(&self) -> MeasureTime {
    self.start
  }

  pub fn get_end(&self) -> MeasureTime {
    self.end
  }

  pub fn get_lane(&self) -> Lane {
    self.lane
  }

  pub fn is_hold(&self) -> bool {
    self.start < self.end
  }
}

/// Stable sort by start position, notes starting together keep their relative order.
pub fn sort_by_start_time(notes: &mut [Note]) {
  notes.sort_by(|a, b| a.start.cmp(&b.start));
}
