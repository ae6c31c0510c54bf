#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tempo(f64);

impl Tempo {
  pub fn new(bpm: f64) -> Tempo {
    Tempo(bpm)
  }

  pub fn get_value(&self) -> f64 {
    self.0
  }

  pub fn is_valid(&self) -> bool {
    self.0.is_finite() && self.0 > 0.0
  }
}

impl Default for Tempo {
  fn default() -> Tempo {
    Tempo(120.0)
  }
}

impl From<Tempo> for f64 {
  fn from(item: Tempo) -> Self {
    item.0
  }
}

impl From<f64> for Tempo {
  fn from(bpm: f64) -> Self {
    Tempo(bpm)
  }
}

#[cfg(test)]
mod test {

  use super::Tempo;

  #[test]
  pub fn tempo_new() {
    let tempo = Tempo::new(120.0);
    assert_eq!(tempo.get_value(), 120.0);
  }

  #[test]
  pub fn tempo_is_valid() {
    assert!(Tempo::new(90.5).is_valid());
    assert!(!Tempo::new(0.0).is_valid());
    assert!(!Tempo::new(-60.0).is_valid());
    assert!(!Tempo::new(std::f64::NAN).is_valid());
    assert!(!Tempo::new(std::f64::INFINITY).is_valid());
  }

  #[test]
  pub fn f64_from() {
    assert_eq!(f64::from(Tempo::new(87.0)), 87.0);
  }
}
