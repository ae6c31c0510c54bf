pub mod mapper;
pub mod measure;
pub mod meter;
pub mod seconds;
pub mod tempo;
pub mod timeline;

pub use self::mapper::{TimeMapper, TimelineConfig};
pub use self::measure::MeasureTime;
pub use self::meter::Meter;
pub use self::seconds::SecondsTime;
pub use self::tempo::Tempo;
pub use self::timeline::{Resolution, Segment, TempoMeterTimeline};

use failure::Fail;

pub type Seconds = f64;

#[derive(Debug, Fail, PartialEq, Clone)]
pub enum TimeError {
  #[fail(display = "Invalid meter {}/{}: {}", beats_per_measure, beat_unit, cause)]
  InvalidMeter {
    beats_per_measure: u32,
    beat_unit: u32,
    cause: String,
  },

  #[fail(display = "Invalid time code: {}", cause)]
  InvalidTimeCode { cause: String },

  #[fail(display = "Invalid range: {:?} is earlier than {:?}", end, start)]
  InvalidRange { start: MeasureTime, end: MeasureTime },

  #[fail(display = "The {} changes must start at measure 0, beat 0 but start at {:?}", what, first)]
  MissingInitialChange { what: String, first: MeasureTime },

  #[fail(display = "There are no {} changes", what)]
  EmptyTimeline { what: String },

  #[fail(display = "Meter changes are only allowed at the start of a measure: {:?}", at)]
  MisalignedMeterChange { at: MeasureTime },

  #[fail(display = "Tempo changes are only allowed at the start of a measure: {:?}", at)]
  MisalignedTempoChange { at: MeasureTime },

  #[fail(display = "Invalid tempo {} bpm at {:?}", bpm, at)]
  InvalidTempo { bpm: f64, at: MeasureTime },

  #[fail(display = "{} is beyond the {} measures covered by the timeline", target, total_measures)]
  UnboundedTarget { target: String, total_measures: u32 },

  #[fail(display = "Invalid timeline: {}", cause)]
  InvalidTimeline { cause: String },
}

pub type TimeResult<T> = Result<T, TimeError>;
