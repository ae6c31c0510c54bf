use log::{debug, info};

use failure::{Error, Fail};

use trail_score_core::{config::Config, score::Score};

const TRAIL_SCORE_CHART: &str = "TRAIL_SCORE_CHART";
const DEFAULT_TRAIL_SCORE_CHART: &str = "chart.toml";

const TRAIL_SCORE_LOG_CONFIG: &str = "TRAIL_SCORE_LOG_CONFIG";
const DEFAULT_TRAIL_SCORE_LOG_CONFIG: &str = "log4rs.yaml";

#[derive(Debug, Fail)]
enum MainError {
  #[fail(display = "Failed to init logging: {}", cause)]
  LoggingInit { cause: String },
}

fn main() -> Result<(), Error> {
  init_logging()?;

  let config = init_config()?;

  let score = init_score(&config)?;

  log_schedule(&score);

  Ok(())
}

fn init_logging() -> Result<(), Error> {
  let log_config_path = std::env::var(TRAIL_SCORE_LOG_CONFIG)
    .unwrap_or_else(|_| DEFAULT_TRAIL_SCORE_LOG_CONFIG.to_string());

  log4rs::init_file(log_config_path.as_str(), Default::default()).map_err(|err| {
    MainError::LoggingInit {
      cause: err.to_string(),
    }
  })?;

  Ok(())
}

fn init_config() -> Result<Config, Error> {
  let chart_path = std::env::args()
    .nth(1)
    .or_else(|| std::env::var(TRAIL_SCORE_CHART).ok())
    .unwrap_or_else(|| DEFAULT_TRAIL_SCORE_CHART.to_string());

  info!("Loading chart from {} ...", chart_path);
  let config = Config::from_file(chart_path.as_str())?;
  debug!("{:#?}", config);

  Ok(config)
}

fn init_score(config: &Config) -> Result<Score, Error> {
  info!("Building the score ...");

  let score = config.to_score()?;

  debug!("Timeline: {:?}", score.mapper());

  Ok(score)
}

fn log_schedule(score: &Score) {
  info!(
    "{} notes in {} lanes, {:.3}s long",
    score.notes().len(),
    score.lane_count(),
    score.duration().get_seconds()
  );

  for note in score.notes() {
    let id = note.get_id();
    match (score.start_seconds_of(id), score.end_seconds_of(id)) {
      (Some(start), Some(end)) => info!(
        "lane {:>2} | {:>10} -> {:<10} | {:>9.3}s -> {:.3}s",
        note.get_lane(),
        note.get_start().to_string(),
        note.get_end().to_string(),
        start.get_seconds(),
        end.get_seconds()
      ),
      _ => debug!("Note {} has no schedule", id),
    }
  }
}
