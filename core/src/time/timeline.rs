use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::time::{MeasureTime, Meter, Tempo, TimeError, TimeResult};

/// Where tempo changes are allowed to happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
  /// Only at the start of a measure.
  Measure,
  /// Anywhere. Only meaningful when the meter never changes.
  Beat,
}

/// A maximal run of constant tempo and meter, from `start` up to the next segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
  pub start: MeasureTime,
  pub tempo: Tempo,
  pub meter: Meter,
}

/// Tempo and meter over measures `0..total_measures`, stored as the runs of constant settings.
#[derive(Debug, Clone, PartialEq)]
pub struct TempoMeterTimeline {
  total_measures: u32,
  segments: Vec<Segment>,
}

impl TempoMeterTimeline {
  /// Builds the timeline for measures `0..total_measures` out of sparse change points.
  pub fn build(
    tempo_changes: &BTreeMap<MeasureTime, Tempo>,
    meter_changes: &BTreeMap<MeasureTime, Meter>,
    total_measures: u32,
    resolution: Resolution,
  ) -> TimeResult<TempoMeterTimeline> {
    check_initial_change(tempo_changes, "tempo")?;
    check_initial_change(meter_changes, "meter")?;

    if let Some(at) = meter_changes.keys().find(|at| !at.is_measure_start()) {
      return Err(TimeError::MisalignedMeterChange { at: *at });
    }

    if resolution == Resolution::Measure {
      if let Some(at) = tempo_changes.keys().find(|at| !at.is_measure_start()) {
        return Err(TimeError::MisalignedTempoChange { at: *at });
      }
    }

    // A change past the last beat of its measure would make elapsed time run backwards.
    if let Some(at) = tempo_changes
      .keys()
      .find(|at| !fits_in_meter(**at, meter_changes))
    {
      return Err(TimeError::MisalignedTempoChange { at: *at });
    }

    if let Some((at, tempo)) = tempo_changes.iter().find(|(_, tempo)| !tempo.is_valid()) {
      return Err(TimeError::InvalidTempo {
        bpm: tempo.get_value(),
        at: *at,
      });
    }

    if total_measures == 0 {
      return Err(TimeError::InvalidTimeline {
        cause: "the timeline must cover at least one measure".to_string(),
      });
    }

    if let Some(at) = tempo_changes
      .keys()
      .chain(meter_changes.keys())
      .find(|at| at.get_measure() >= total_measures)
    {
      debug!("Ignoring changes from {} beyond the last measure", at);
    }

    let segments = collapse_segments(tempo_changes, meter_changes, total_measures);

    debug!(
      "Built a timeline of {} measures with {} segments",
      total_measures,
      segments.len()
    );

    Ok(TempoMeterTimeline {
      total_measures,
      segments,
    })
  }

  pub fn total_measures(&self) -> u32 {
    self.total_measures
  }

  pub fn covers(&self, time: MeasureTime) -> bool {
    time.get_measure() < self.total_measures
  }

  /// Tempo and meter in force at the start of `measure`.
  pub fn settings_at(&self, measure: u32) -> Option<(Tempo, Meter)> {
    self
      .segment_at(MeasureTime::from_measures(measure))
      .map(|segment| (segment.tempo, segment.meter))
  }

  pub fn meter_at(&self, measure: u32) -> Option<Meter> {
    self.settings_at(measure).map(|(_, meter)| meter)
  }

  pub fn tempo_at(&self, time: MeasureTime) -> Option<Tempo> {
    self.segment_at(time).map(|segment| segment.tempo)
  }

  pub fn segment_at(&self, time: MeasureTime) -> Option<&Segment> {
    if !self.covers(time) {
      return None;
    }
    let count = self.segments.partition_point(|segment| segment.start <= time);
    count.checked_sub(1).and_then(|index| self.segments.get(index))
  }

  pub fn segments(&self) -> &[Segment] {
    &self.segments
  }

  /// The meter at the start of every measure, filled forward from the change points.
  pub fn meters<'a>(&'a self) -> impl Iterator<Item = Meter> + 'a {
    self.fill_forward().map(|(_, meter)| meter)
  }

  /// The tempo at the start of every measure. A change in the middle of a measure
  /// shows up from the next one.
  pub fn tempos<'a>(&'a self) -> impl Iterator<Item = Tempo> + 'a {
    self.fill_forward().map(|(tempo, _)| tempo)
  }

  fn fill_forward<'a>(&'a self) -> impl Iterator<Item = (Tempo, Meter)> + 'a {
    (0..self.total_measures).filter_map(move |measure| self.settings_at(measure))
  }

  pub fn is_anchored(&self) -> bool {
    self
      .segments
      .first()
      .map_or(false, |segment| segment.start == MeasureTime::zero())
  }
}

fn check_initial_change<T>(changes: &BTreeMap<MeasureTime, T>, what: &str) -> TimeResult<()> {
  match changes.keys().next() {
    None => Err(TimeError::EmptyTimeline {
      what: what.to_string(),
    }),
    Some(first) if *first != MeasureTime::zero() => Err(TimeError::MissingInitialChange {
      what: what.to_string(),
      first: *first,
    }),
    Some(_) => Ok(()),
  }
}

fn fits_in_meter(at: MeasureTime, meter_changes: &BTreeMap<MeasureTime, Meter>) -> bool {
  meter_changes
    .range(..=MeasureTime::from_measures(at.get_measure()))
    .next_back()
    .map_or(false, |(_, meter)| at.is_within(*meter))
}

fn collapse_segments(
  tempo_changes: &BTreeMap<MeasureTime, Tempo>,
  meter_changes: &BTreeMap<MeasureTime, Meter>,
  total_measures: u32,
) -> Vec<Segment> {
  let change_points: BTreeSet<MeasureTime> = tempo_changes
    .keys()
    .chain(meter_changes.keys())
    .filter(|at| at.get_measure() < total_measures)
    .cloned()
    .collect();

  let mut segments: Vec<Segment> = Vec::with_capacity(change_points.len());
  for start in change_points {
    let tempo = tempo_changes.range(..=start).next_back().map(|(_, tempo)| *tempo);
    let meter = meter_changes.range(..=start).next_back().map(|(_, meter)| *meter);
    if let (Some(tempo), Some(meter)) = (tempo, meter) {
      let unchanged = segments
        .last()
        .map_or(false, |last| last.tempo == tempo && last.meter == meter);
      if !unchanged {
        segments.push(Segment {
          start,
          tempo,
          meter,
        });
      }
    }
  }

  segments
}
