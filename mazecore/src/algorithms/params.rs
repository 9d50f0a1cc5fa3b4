use std::str::FromStr;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// Tunable parameters of the generators.
/// Only strings are stored, every generator parses what it understands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params {
    map: HashMap<String, String>,
}

impl Params {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        self.map.insert(key.into(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|s| s.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn parsed<T: FromStr>(&self, key: &str) -> Option<Result<T, T::Err>> {
        self.get(key).map(|s| s.parse())
    }

    pub fn parsed_or<T: FromStr>(&self, key: &str, default: T) -> T {
        match self.parsed(key) {
            None | Some(Err(_)) => default,
            Some(Ok(v)) => v,
        }
    }

    pub fn parsed_or_warn<T: FromStr>(&self, key: &str, default: T) -> T {
        match self.parsed(key) {
            None => default,
            Some(Ok(v)) => v,
            Some(Err(_)) => {
                log::warn!("Invalid value for parameter '{}', using default value", key);
                default
            }
        }
    }

    /// Probability in `[0, 1]`, out of range values are clamped.
    pub fn chance_or_warn(&self, key: &str, default: f64) -> f64 {
        let value: f64 = self.parsed_or_warn(key, default);
        if value.is_nan() {
            log::warn!("Parameter '{}' is NaN, using default value", key);
            return default;
        }
        if !(0.0..=1.0).contains(&value) {
            log::warn!("Parameter '{}' = {} is not a probability, clamping", key, value);
        }
        value.clamp(0.0, 1.0)
    }
}
