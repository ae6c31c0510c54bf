use std::{
  cmp::Ordering,
  fmt,
  hash::{Hash, Hasher},
};

use crate::time::{Meter, SecondsTime, Tempo, TimeError, TimeResult};

/// A position (or a duration) in musical time.
///
/// Measures are counted globally from the start of the score, so two positions
/// compare correctly even when the meter changes between them. The beat is a
/// fractional offset inside the measure, in units of the meter's beat unit.
#[derive(Debug, Clone, Copy)]
pub struct MeasureTime {
  measure: u32,
  beat: f64,
}

impl MeasureTime {
  pub fn new(measure: u32, beat: f64) -> TimeResult<MeasureTime> {
    if !beat.is_finite() {
      Err(TimeError::InvalidTimeCode {
        cause: format!("the beat must be a finite number but got {}", beat),
      })
    } else if beat < 0.0 {
      Err(TimeError::InvalidTimeCode {
        cause: format!("the beat can not be negative but got {}", beat),
      })
    } else {
      Ok(MeasureTime::unchecked(measure, beat))
    }
  }

  pub fn from_measures(measure: u32) -> MeasureTime {
    MeasureTime::unchecked(measure, 0.0)
  }

  pub fn zero() -> MeasureTime {
    MeasureTime::from_measures(0)
  }

  // Adding 0.0 turns -0.0 into 0.0 so that Eq, Ord and Hash agree.
  pub(crate) fn unchecked(measure: u32, beat: f64) -> MeasureTime {
    MeasureTime {
      measure,
      beat: beat + 0.0,
    }
  }

  pub fn get_measure(&self) -> u32 {
    self.measure
  }

  pub fn get_beat(&self) -> f64 {
    self.beat
  }

  pub fn is_measure_start(&self) -> bool {
    self.beat == 0.0
  }

  pub fn is_within(&self, meter: Meter) -> bool {
    self.beat < f64::from(meter.beats_per_measure())
  }

  /// Number of beats elapsed since measure 0, assuming the whole span uses `meter`.
  pub fn total_beats(&self, meter: Meter) -> f64 {
    f64::from(self.measure) * f64::from(meter.beats_per_measure()) + self.beat
  }

  /// Duration between `start` and `end` under a single meter.
  ///
  /// When the end beat is smaller than the start beat a whole measure worth of
  /// beats is borrowed from the measure count.
  pub fn difference(start: MeasureTime, end: MeasureTime, meter: Meter) -> TimeResult<MeasureTime> {
    if end < start {
      return Err(TimeError::InvalidRange { start, end });
    }

    let duration = if end.beat >= start.beat {
      MeasureTime::unchecked(end.measure - start.measure, end.beat - start.beat)
    } else {
      let beats_per_measure = f64::from(meter.beats_per_measure());
      MeasureTime::unchecked(
        end.measure - start.measure - 1,
        beats_per_measure + end.beat - start.beat,
      )
    };

    Ok(duration)
  }

  /// Moves forward by `duration`, carrying whole measures out of the beat.
  pub fn advance(&self, duration: MeasureTime, meter: Meter) -> MeasureTime {
    let beats_per_measure = f64::from(meter.beats_per_measure());
    let beat = self.beat + duration.beat;
    let carry = (beat / beats_per_measure).floor();
    MeasureTime::unchecked(
      self.measure + duration.measure + carry as u32,
      beat - carry * beats_per_measure,
    )
  }

  pub fn to_seconds(&self, tempo: Tempo, meter: Meter) -> SecondsTime {
    SecondsTime::unchecked(self.total_beats(meter) * meter.seconds_per_beat(tempo))
  }
}

impl Ord for MeasureTime {
  fn cmp(&self, other: &MeasureTime) -> Ordering {
    self
      .measure
      .cmp(&other.measure)
      .then_with(|| self.beat.total_cmp(&other.beat))
  }
}

impl PartialOrd for MeasureTime {
  fn partial_cmp(&self, other: &MeasureTime) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl PartialEq for MeasureTime {
  fn eq(&self, other: &MeasureTime) -> bool {
    self.cmp(other) == Ordering::Equal
  }
}

impl Eq for MeasureTime {}

impl Hash for MeasureTime {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.measure.hash(state);
    self.beat.to_bits().hash(state);
  }
}

impl fmt::Display for MeasureTime {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}:{}", self.measure, self.beat)
  }
}
