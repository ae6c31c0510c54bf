use std::{
  cmp::Ordering,
  hash::{Hash, Hasher},
  ops::{Add, AddAssign, Sub},
};

use crate::time::{MeasureTime, Meter, Seconds, Tempo, TimeError, TimeResult};

///! Absolute time in seconds from the start of the score
#[derive(Debug, Clone, Copy)]
pub struct SecondsTime(Seconds);

impl SecondsTime {
  pub fn zero() -> SecondsTime {
    SecondsTime(0.0)
  }

  pub fn new(seconds: Seconds) -> TimeResult<SecondsTime> {
    if !seconds.is_finite() || seconds < 0.0 {
      Err(TimeError::InvalidTimeCode {
        cause: format!("seconds must be finite and non-negative but got {}", seconds),
      })
    } else {
      Ok(SecondsTime::unchecked(seconds))
    }
  }

  pub(crate) fn unchecked(seconds: Seconds) -> SecondsTime {
    SecondsTime(seconds + 0.0)
  }

  pub fn get_seconds(&self) -> Seconds {
    self.0
  }

  /// Inverse of `MeasureTime::to_seconds` for a constant tempo and meter.
  ///
  /// Fails with `UnboundedTarget` when the measure does not fit in a `u32`.
  pub fn to_measure(&self, tempo: Tempo, meter: Meter) -> TimeResult<MeasureTime> {
    let seconds_per_measure = meter.seconds_per_measure(tempo);
    let seconds_per_beat = meter.seconds_per_beat(tempo);
    let beats_per_measure = f64::from(meter.beats_per_measure());

    let mut measure = (self.0 / seconds_per_measure).floor();
    let mut beat = ((self.0 - measure * seconds_per_measure) / seconds_per_beat).max(0.0);
    if beat >= beats_per_measure {
      measure += 1.0;
      beat = 0.0;
    }

    if measure > f64::from(u32::MAX) {
      return Err(TimeError::UnboundedTarget {
        target: format!("{} seconds", self.0),
        total_measures: u32::MAX,
      });
    }

    Ok(MeasureTime::unchecked(measure as u32, beat))
  }
}

impl Ord for SecondsTime {
  fn cmp(&self, other: &SecondsTime) -> Ordering {
    self.0.total_cmp(&other.0)
  }
}

impl PartialOrd for SecondsTime {
  fn partial_cmp(&self, other: &SecondsTime) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl PartialEq for SecondsTime {
  fn eq(&self, other: &SecondsTime) -> bool {
    self.cmp(other) == Ordering::Equal
  }
}

impl Eq for SecondsTime {}

impl Hash for SecondsTime {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.0.to_bits().hash(state);
  }
}

impl Add for SecondsTime {
  type Output = SecondsTime;

  fn add(self, rhs: SecondsTime) -> SecondsTime {
    SecondsTime(self.0 + rhs.0)
  }
}

impl AddAssign for SecondsTime {
  fn add_assign(&mut self, rhs: SecondsTime) {
    *self = *self + rhs;
  }
}

impl Sub for SecondsTime {
  type Output = SecondsTime;

  fn sub(self, rhs: SecondsTime) -> SecondsTime {
    SecondsTime((self.0 - rhs.0).max(0.0))
  }
}

impl From<SecondsTime> for f64 {
  fn from(item: SecondsTime) -> Self {
    item.0
  }
}

#[cfg(test)]
mod test {
  use super::SecondsTime;
  use crate::time::{MeasureTime, Meter, Tempo, TimeError};

  const EPSILON: f64 = 1e-9;

  #[test]
  pub fn seconds_time_new() {
    let time = SecondsTime::new(5.0).unwrap();
    assert_eq!(time.get_seconds(), 5.0);
  }

  #[test]
  pub fn seconds_time_new_rejects_negative() {
    match SecondsTime::new(-1.0) {
      Err(TimeError::InvalidTimeCode { .. }) => {}
      other => panic!("unexpected result: {:?}", other),
    }
    assert!(SecondsTime::new(std::f64::NAN).is_err());
  }

  #[test]
  pub fn seconds_time_zero() {
    assert_eq!(SecondsTime::zero().get_seconds(), 0.0);
  }

  #[test]
  pub fn seconds_time_eq_and_ord() {
    let time1 = SecondsTime::new(1.5).unwrap();
    let time2 = SecondsTime::new(1.5).unwrap();
    let time3 = SecondsTime::new(2.0).unwrap();
    assert_eq!(time1, time2);
    assert!(time1 < time3);
  }

  #[test]
  pub fn seconds_time_add() {
    let time = SecondsTime::new(1.5).unwrap() + SecondsTime::new(2.0).unwrap();
    assert_eq!(time, SecondsTime::new(3.5).unwrap());
  }

  #[test]
  pub fn seconds_time_sub_saturates() {
    let time = SecondsTime::new(1.5).unwrap() - SecondsTime::new(2.0).unwrap();
    assert_eq!(time, SecondsTime::zero());
  }

  #[test]
  pub fn to_measure() {
    let meter = Meter::new(4, 4).unwrap();
    let time = SecondsTime::new(5.0).unwrap();
    assert_eq!(
      time.to_measure(Tempo::new(120.0), meter),
      Ok(MeasureTime::new(2, 2.0).unwrap())
    );
  }

  #[test]
  pub fn to_measure_beyond_the_last_measure() {
    let meter = Meter::new(4, 4).unwrap();
    let tempo = Tempo::new(120.0);

    let last = MeasureTime::new(u32::MAX, 3.5).unwrap().to_seconds(tempo, meter);
    assert_eq!(last.to_measure(tempo, meter).map(|time| time.get_measure()), Ok(u32::MAX));

    let beyond = SecondsTime::new(2.0 * (f64::from(u32::MAX) + 1.0)).unwrap();
    match beyond.to_measure(tempo, meter) {
      Err(TimeError::UnboundedTarget { total_measures, .. }) => assert_eq!(total_measures, u32::MAX),
      other => panic!("unexpected result: {:?}", other),
    }
  }

  #[test]
  pub fn round_trip() {
    let tempos = [Tempo::new(120.0), Tempo::new(90.0), Tempo::new(173.5)];
    let meters = [
      Meter::new(4, 4).unwrap(),
      Meter::new(3, 4).unwrap(),
      Meter::new(7, 8).unwrap(),
    ];
    let positions = [(0, 0.0), (0, 1.25), (2, 2.0), (13, 0.5), (41, 2.75)];

    for &tempo in tempos.iter() {
      for &meter in meters.iter() {
        for &(measure, beat) in positions.iter() {
          let time = MeasureTime::new(measure, beat).unwrap();
          let seconds = time.to_seconds(tempo, meter);
          let back = seconds.to_measure(tempo, meter).unwrap();
          let back_beats = back.total_beats(meter);
          assert!(
            (back_beats - time.total_beats(meter)).abs() < EPSILON,
            "{:?} -> {:?} -> {:?}",
            time,
            seconds,
            back
          );
        }
      }
    }
  }
}
