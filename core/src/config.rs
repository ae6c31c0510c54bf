use failure::Error;

use serde_derive::Deserialize;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;

use crate::score::{Lane, Note, Score};
use crate::time::{MeasureTime, Meter, Tempo, TimelineConfig};

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Position {
  pub measure: u32,
  #[serde(default)]
  pub beat: f64,
}

impl Position {
  pub fn to_measure_time(&self) -> Result<MeasureTime, Error> {
    Ok(MeasureTime::new(self.measure, self.beat)?)
  }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct MeterSignature {
  pub beats_per_measure: u32,
  pub beat_unit: u32,
}

impl Default for MeterSignature {
  fn default() -> MeterSignature {
    MeterSignature {
      beats_per_measure: 4,
      beat_unit: 4,
    }
  }
}

impl MeterSignature {
  pub fn to_meter(&self) -> Result<Meter, Error> {
    Ok(Meter::new(self.beats_per_measure, self.beat_unit)?)
  }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct TempoChange {
  pub measure: u32,
  #[serde(default)]
  pub beat: f64,
  pub bpm: f64,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct MeterChange {
  pub measure: u32,
  #[serde(default)]
  pub beat: f64,
  pub beats_per_measure: u32,
  pub beat_unit: u32,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind")]
pub enum Timeline {
  #[serde(rename = "fixed")]
  Fixed {
    bpm: f64,
    #[serde(default)]
    meter: MeterSignature,
  },
  #[serde(rename = "variable_tempo")]
  VariableTempo {
    #[serde(default)]
    meter: MeterSignature,
    tempo: Vec<TempoChange>,
  },
  #[serde(rename = "variable_tempo_meter")]
  VariableTempoMeter {
    tempo: Vec<TempoChange>,
    meter: Vec<MeterChange>,
  },
}

impl Default for Timeline {
  fn default() -> Timeline {
    Timeline::Fixed {
      bpm: 120.0,
      meter: MeterSignature::default(),
    }
  }
}

impl Timeline {
  pub fn to_timeline_config(&self) -> Result<TimelineConfig, Error> {
    let config = match self {
      Timeline::Fixed { bpm, meter } => TimelineConfig::Fixed {
        tempo: Tempo::new(*bpm),
        meter: meter.to_meter()?,
      },
      Timeline::VariableTempo { meter, tempo } => TimelineConfig::VariableTempo {
        meter: meter.to_meter()?,
        tempo_changes: tempo_changes(tempo)?,
      },
      Timeline::VariableTempoMeter { tempo, meter } => TimelineConfig::VariableTempoMeter {
        tempo_changes: tempo_changes(tempo)?,
        meter_changes: meter_changes(meter)?,
      },
    };
    Ok(config)
  }
}

fn tempo_changes(changes: &[TempoChange]) -> Result<BTreeMap<MeasureTime, Tempo>, Error> {
  let mut map = BTreeMap::new();
  for change in changes {
    map.insert(
      MeasureTime::new(change.measure, change.beat)?,
      Tempo::new(change.bpm),
    );
  }
  Ok(map)
}

fn meter_changes(changes: &[MeterChange]) -> Result<BTreeMap<MeasureTime, Meter>, Error> {
  let mut map = BTreeMap::new();
  for change in changes {
    map.insert(
      MeasureTime::new(change.measure, change.beat)?,
      Meter::new(change.beats_per_measure, change.beat_unit)?,
    );
  }
  Ok(map)
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct NoteEntry {
  pub lane: Lane,
  pub start: Position,
  /// Tap notes can leave the end out
  pub end: Option<Position>,
}

impl NoteEntry {
  pub fn to_note(&self) -> Result<Note, Error> {
    let start = self.start.to_measure_time()?;
    let end = match self.end {
      Some(end) => end.to_measure_time()?,
      None => start,
    };
    Ok(Note::new(start, end, self.lane))
  }
}

/// A chart: the lanes, the timeline and the notes of a score.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
  pub lane_count: Lane,
  pub timeline: Timeline,
  pub notes: Vec<NoteEntry>,
}

impl Default for Config {
  fn default() -> Config {
    Config {
      lane_count: 4,
      timeline: Timeline::default(),
      notes: Vec::new(),
    }
  }
}

impl Config {
  pub fn from_file<'a, T>(path: T) -> Result<Config, Error>
  where
    T: Into<&'a str>,
  {
    let mut content = String::new();
    let path_str = path.into();
    let mut file = File::open(path_str)?;
    file.read_to_string(&mut content)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
  }

  pub fn from_str<'a, T>(content: T) -> Result<Config, Error>
  where
    T: Into<&'a str>,
  {
    let config: Config = toml::from_str(content.into())?;
    Ok(config)
  }

  pub fn to_score(&self) -> Result<Score, Error> {
    let notes = self
      .notes
      .iter()
      .map(NoteEntry::to_note)
      .collect::<Result<Vec<Note>, Error>>()?;
    let timeline = self.timeline.to_timeline_config()?;
    Ok(Score::new(notes, self.lane_count, timeline)?)
  }
}

#[cfg(test)]
mod test {

  use super::{Config, MeterSignature, Timeline};
  use crate::score::ScoreError;
  use crate::time::{MeasureTime, Meter, Tempo, TimeError, TimelineConfig};

  const CHART: &str = r#"
lane_count = 3

[timeline]
kind = "variable_tempo_meter"
tempo = [ { measure = 0, bpm = 120.0 }, { measure = 2, bpm = 60.0 } ]
meter = [
  { measure = 0, beats_per_measure = 4, beat_unit = 4 },
  { measure = 3, beats_per_measure = 6, beat_unit = 8 },
]

[[notes]]
lane = 1
start = { measure = 0, beat = 1.0 }

[[notes]]
lane = 3
start = { measure = 3, beat = 0.0 }
end = { measure = 3, beat = 3.0 }
"#;

  #[test]
  pub fn default() {
    let config = Config::from_str("").unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.lane_count, 4);
    assert_eq!(
      config.timeline,
      Timeline::Fixed {
        bpm: 120.0,
        meter: MeterSignature::default(),
      }
    );
    assert!(config.notes.is_empty());
  }

  #[test]
  pub fn fixed_timeline() {
    let config = Config::from_str(
      r#"
[timeline]
kind = "fixed"
bpm = 90.0
meter = { beats_per_measure = 3, beat_unit = 4 }
"#,
    )
    .unwrap();

    assert_eq!(
      config.timeline.to_timeline_config().unwrap(),
      TimelineConfig::Fixed {
        tempo: Tempo::new(90.0),
        meter: Meter::new(3, 4).unwrap(),
      }
    );
  }

  #[test]
  pub fn variable_tempo_timeline() {
    let config = Config::from_str(
      r#"
[timeline]
kind = "variable_tempo"
tempo = [ { measure = 0, bpm = 120.0 }, { measure = 1, beat = 2.5, bpm = 100.0 } ]
"#,
    )
    .unwrap();

    match config.timeline.to_timeline_config().unwrap() {
      TimelineConfig::VariableTempo {
        meter,
        tempo_changes,
      } => {
        assert_eq!(meter, Meter::default());
        assert_eq!(tempo_changes.len(), 2);
        assert_eq!(
          tempo_changes.get(&MeasureTime::new(1, 2.5).unwrap()),
          Some(&Tempo::new(100.0))
        );
      }
      other => panic!("unexpected timeline: {:?}", other),
    }
  }

  #[test]
  pub fn chart_to_score() {
    let config = Config::from_str(CHART).unwrap();
    assert_eq!(config.lane_count, 3);
    assert_eq!(config.notes.len(), 2);

    let score = config.to_score().unwrap();
    let notes = score.notes();
    assert_eq!(notes.len(), 2);
    assert!(!notes[0].is_hold());
    assert_eq!(
      score.start_seconds_of(notes[0].get_id()).unwrap().get_seconds(),
      0.5
    );
    assert_eq!(
      score.start_seconds_of(notes[1].get_id()).unwrap().get_seconds(),
      8.0
    );
    assert_eq!(
      score.end_seconds_of(notes[1].get_id()).unwrap().get_seconds(),
      9.5
    );
  }

  #[test]
  pub fn invalid_meter() {
    let config = Config::from_str(
      r#"
[timeline]
kind = "fixed"
bpm = 120.0
meter = { beats_per_measure = 4, beat_unit = 6 }
"#,
    )
    .unwrap();

    let error = config.to_score().unwrap_err();
    match error.downcast::<TimeError>() {
      Ok(TimeError::InvalidMeter { beat_unit, .. }) => assert_eq!(beat_unit, 6),
      other => panic!("unexpected error: {:?}", other),
    }
  }

  #[test]
  pub fn timeline_not_starting_at_measure_zero() {
    let config = Config::from_str(
      r#"
[timeline]
kind = "variable_tempo"
tempo = [ { measure = 1, bpm = 120.0 } ]

[[notes]]
lane = 1
start = { measure = 2 }
"#,
    )
    .unwrap();

    let error = config.to_score().unwrap_err();
    match error.downcast::<ScoreError>() {
      Ok(ScoreError::Timeline {
        cause: TimeError::MissingInitialChange { .. },
      }) => {}
      other => panic!("unexpected error: {:?}", other),
    }
  }

  #[test]
  pub fn malformed_chart() {
    assert!(Config::from_str("lane_count = \"four\"").is_err());
    assert!(Config::from_str("[timeline]\nkind = \"swing\"").is_err());
  }
}
