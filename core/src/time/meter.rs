use std::fmt;

use crate::time::{Seconds, Tempo, TimeError, TimeResult};

const SECONDS_PER_WHOLE_NOTE_AT_ONE_BPM: f64 = 240.0;

/// Time signature: how many beats make a measure and which note value gets one beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Meter {
  beats_per_measure: u32, // numerator
  beat_unit: u32,         // denominator
}

impl Meter {
  pub fn new(beats_per_measure: u32, beat_unit: u32) -> TimeResult<Meter> {
    let invalid = |cause: &str| TimeError::InvalidMeter {
      beats_per_measure,
      beat_unit,
      cause: cause.to_string(),
    };

    if beats_per_measure == 0 {
      Err(invalid("the number of beats per measure must be positive"))
    } else if beat_unit == 0 {
      Err(invalid("the beat unit must be positive"))
    } else if !beat_unit.is_power_of_two() {
      Err(invalid("the beat unit must be a power of two"))
    } else {
      Ok(Meter {
        beats_per_measure,
        beat_unit,
      })
    }
  }

  pub fn beats_per_measure(&self) -> u32 {
    self.beats_per_measure
  }

  pub fn beat_unit(&self) -> u32 {
    self.beat_unit
  }

  /// The tempo counts quarter notes per minute, so a whole note lasts `240 / bpm` seconds.
  pub fn seconds_per_beat(&self, tempo: Tempo) -> Seconds {
    SECONDS_PER_WHOLE_NOTE_AT_ONE_BPM / f64::from(tempo) / f64::from(self.beat_unit)
  }

  pub fn seconds_per_measure(&self, tempo: Tempo) -> Seconds {
    self.seconds_per_beat(tempo) * f64::from(self.beats_per_measure)
  }
}

impl Default for Meter {
  fn default() -> Meter {
    Meter {
      beats_per_measure: 4,
      beat_unit: 4,
    }
  }
}

impl fmt::Display for Meter {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}/{}", self.beats_per_measure, self.beat_unit)
  }
}
