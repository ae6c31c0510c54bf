use std::collections::BTreeMap;

use crate::time::{
  MeasureTime, Meter, Resolution, SecondsTime, Tempo, TempoMeterTimeline, TimeError, TimeResult,
};

/// How tempo and meter evolve along a score.
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineConfig {
  Fixed {
    tempo: Tempo,
    meter: Meter,
  },
  VariableTempo {
    meter: Meter,
    tempo_changes: BTreeMap<MeasureTime, Tempo>,
  },
  VariableTempoMeter {
    tempo_changes: BTreeMap<MeasureTime, Tempo>,
    meter_changes: BTreeMap<MeasureTime, Meter>,
  },
}

impl TimelineConfig {
  /// Every tempo declared by the configuration with the position it applies from.
  pub fn tempos(&self) -> Vec<(MeasureTime, Tempo)> {
    match self {
      TimelineConfig::Fixed { tempo, .. } => vec![(MeasureTime::zero(), *tempo)],
      TimelineConfig::VariableTempo { tempo_changes, .. }
      | TimelineConfig::VariableTempoMeter { tempo_changes, .. } => tempo_changes
        .iter()
        .map(|(at, tempo)| (*at, *tempo))
        .collect(),
    }
  }
}

impl Default for TimelineConfig {
  fn default() -> TimelineConfig {
    TimelineConfig::Fixed {
      tempo: Tempo::default(),
      meter: Meter::default(),
    }
  }
}

/// Converts positions in measures and beats into seconds (and back).
#[derive(Debug, Clone, PartialEq)]
pub enum TimeMapper {
  Fixed { tempo: Tempo, meter: Meter },
  Timeline(TempoMeterTimeline),
}

impl TimeMapper {
  pub fn from_config(config: &TimelineConfig, total_measures: u32) -> TimeResult<TimeMapper> {
    match config {
      TimelineConfig::Fixed { tempo, meter } => {
        if tempo.is_valid() {
          Ok(TimeMapper::Fixed {
            tempo: *tempo,
            meter: *meter,
          })
        } else {
          Err(TimeError::InvalidTempo {
            bpm: tempo.get_value(),
            at: MeasureTime::zero(),
          })
        }
      }

      TimelineConfig::VariableTempo {
        meter,
        tempo_changes,
      } => {
        let mut meter_changes = BTreeMap::new();
        meter_changes.insert(MeasureTime::zero(), *meter);
        TempoMeterTimeline::build(
          tempo_changes,
          &meter_changes,
          total_measures,
          Resolution::Beat,
        )
        .map(TimeMapper::Timeline)
      }

      TimelineConfig::VariableTempoMeter {
        tempo_changes,
        meter_changes,
      } => TempoMeterTimeline::build(
        tempo_changes,
        meter_changes,
        total_measures,
        Resolution::Measure,
      )
      .map(TimeMapper::Timeline),
    }
  }

  /// Number of measures the mapper can convert, or `None` when there is no bound.
  pub fn total_measures(&self) -> Option<u32> {
    match self {
      TimeMapper::Fixed { .. } => None,
      TimeMapper::Timeline(timeline) => Some(timeline.total_measures()),
    }
  }

  pub fn meter_at(&self, measure: u32) -> TimeResult<Meter> {
    match self {
      TimeMapper::Fixed { meter, .. } => Ok(*meter),
      TimeMapper::Timeline(timeline) => timeline.meter_at(measure).ok_or_else(|| {
        TimeError::UnboundedTarget {
          target: format!("measure {}", measure),
          total_measures: timeline.total_measures(),
        }
      }),
    }
  }

  pub fn to_seconds(&self, time: MeasureTime) -> TimeResult<SecondsTime> {
    let meter = self.meter_at(time.get_measure())?;
    if !time.is_within(meter) {
      return Err(TimeError::InvalidTimeCode {
        cause: format!("{} does not fit in a measure of {}", time, meter),
      });
    }

    match self {
      TimeMapper::Fixed { tempo, meter } => Ok(time.to_seconds(*tempo, *meter)),
      TimeMapper::Timeline(timeline) => timeline_to_seconds(timeline, time),
    }
  }

  pub fn to_measure(&self, seconds: SecondsTime) -> TimeResult<MeasureTime> {
    match self {
      TimeMapper::Fixed { tempo, meter } => seconds.to_measure(*tempo, *meter),
      TimeMapper::Timeline(timeline) => timeline_to_measure(timeline, seconds),
    }
  }
}

fn check_anchored(timeline: &TempoMeterTimeline) -> TimeResult<()> {
  if timeline.is_anchored() {
    Ok(())
  } else {
    Err(TimeError::InvalidTimeline {
      cause: "the timeline does not start at measure 0".to_string(),
    })
  }
}

fn timeline_to_seconds(timeline: &TempoMeterTimeline, time: MeasureTime) -> TimeResult<SecondsTime> {
  check_anchored(timeline)?;

  let segments = timeline.segments();
  let mut elapsed = SecondsTime::zero();
  for (index, segment) in segments.iter().enumerate() {
    if segment.start >= time {
      break;
    }

    let end = segments
      .get(index + 1)
      .map(|next| next.start)
      .filter(|next_start| *next_start < time)
      .unwrap_or(time);

    let duration = MeasureTime::difference(segment.start, end, segment.meter)?;
    elapsed += duration.to_seconds(segment.tempo, segment.meter);
  }

  Ok(elapsed)
}

fn timeline_to_measure(timeline: &TempoMeterTimeline, seconds: SecondsTime) -> TimeResult<MeasureTime> {
  check_anchored(timeline)?;

  let total_measures = timeline.total_measures();
  let timeline_end = MeasureTime::from_measures(total_measures);
  let segments = timeline.segments();
  let mut elapsed = SecondsTime::zero();
  for (index, segment) in segments.iter().enumerate() {
    let end = segments
      .get(index + 1)
      .map(|next| next.start)
      .unwrap_or(timeline_end);

    let span = MeasureTime::difference(segment.start, end, segment.meter)?
      .to_seconds(segment.tempo, segment.meter);

    if seconds < elapsed + span {
      let offset = (seconds - elapsed).to_measure(segment.tempo, segment.meter)?;
      return Ok(segment.start.advance(offset, segment.meter));
    }
    elapsed += span;
  }

  Err(TimeError::UnboundedTarget {
    target: format!("{} seconds", seconds.get_seconds()),
    total_measures,
  })
}
