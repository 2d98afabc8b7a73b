// Copyright 2024-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Request parameters for the statuses streaming endpoints.
//!
//! Each parameter set serializes to ordered `(name, value)` pairs. Lists are
//! comma-joined, and anything empty or at its default is left off the wire.

use std::fmt;

use crate::error::ParameterError;

/// Largest backfill, in either direction, the firehose accepts.
pub const MAX_FIREHOSE_COUNT: i32 = 150_000;

pub type WireParams = Vec<(&'static str, String)>;

/// A geographic area, south-west corner first.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub sw_longitude: f64,
    pub sw_latitude: f64,
    pub ne_longitude: f64,
    pub ne_latitude: f64,
}

impl BoundingBox {
    pub fn new(sw_longitude: f64, sw_latitude: f64, ne_longitude: f64, ne_latitude: f64) -> Self {
        Self {
            sw_longitude,
            sw_latitude,
            ne_longitude,
            ne_latitude,
        }
    }

    pub fn validate(&self) -> Result<(), ParameterError> {
        let longitudes = [self.sw_longitude, self.ne_longitude];
        let latitudes = [self.sw_latitude, self.ne_latitude];

        if longitudes.iter().any(|lon| !(-180.0..=180.0).contains(lon))
            || latitudes.iter().any(|lat| !(-90.0..=90.0).contains(lat))
        {
            return Err(ParameterError::InvalidBoundingBox(self.to_string()));
        }
        Ok(())
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.sw_longitude, self.sw_latitude, self.ne_longitude, self.ne_latitude
        )
    }
}

/// Minimum "filter_level" a tweet needs to be delivered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterLevel {
    #[default]
    None,
    Low,
    Medium,
}

impl FilterLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Medium => "medium",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterParameters {
    pub follow: Vec<u64>,
    pub track: Vec<String>,
    pub locations: Vec<BoundingBox>,
    pub languages: Vec<String>,
    pub stall_warnings: bool,
    pub filter_level: FilterLevel,
}

impl FilterParameters {
    pub fn follow(mut self, user_ids: impl IntoIterator<Item = u64>) -> Self {
        self.follow.extend(user_ids);
        self
    }

    pub fn track<S: Into<String>>(mut self, keywords: impl IntoIterator<Item = S>) -> Self {
        self.track.extend(keywords.into_iter().map(Into::into));
        self
    }

    pub fn locations(mut self, boxes: impl IntoIterator<Item = BoundingBox>) -> Self {
        self.locations.extend(boxes);
        self
    }

    pub fn languages<S: Into<String>>(mut self, languages: impl IntoIterator<Item = S>) -> Self {
        self.languages.extend(languages.into_iter().map(Into::into));
        self
    }

    pub fn stall_warnings(mut self, enabled: bool) -> Self {
        self.stall_warnings = enabled;
        self
    }

    pub fn filter_level(mut self, level: FilterLevel) -> Self {
        self.filter_level = level;
        self
    }

    /// At least one predicate is required, and every bounding box must be on the globe.
    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.follow.is_empty() && self.track.is_empty() && self.locations.is_empty() {
            return Err(ParameterError::EmptyFilter);
        }
        self.locations.iter().try_for_each(BoundingBox::validate)
    }

    pub fn to_params(&self) -> WireParams {
        let mut params = WireParams::new();
        push_list(&mut params, "follow", &self.follow);
        push_list(&mut params, "track", &self.track);
        push_list(&mut params, "locations", &self.locations);
        push_list(&mut params, "language", &self.languages);
        push_stall_warnings(&mut params, self.stall_warnings);
        if self.filter_level != FilterLevel::None {
            params.push(("filter_level", self.filter_level.as_str().to_string()));
        }
        params
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampleParameters {
    pub languages: Vec<String>,
    pub stall_warnings: bool,
}

impl SampleParameters {
    pub fn languages<S: Into<String>>(mut self, languages: impl IntoIterator<Item = S>) -> Self {
        self.languages.extend(languages.into_iter().map(Into::into));
        self
    }

    pub fn stall_warnings(mut self, enabled: bool) -> Self {
        self.stall_warnings = enabled;
        self
    }

    pub fn to_params(&self) -> WireParams {
        let mut params = WireParams::new();
        push_list(&mut params, "language", &self.languages);
        push_stall_warnings(&mut params, self.stall_warnings);
        params
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FirehoseParameters {
    /// Messages to backfill; negative values count back from the live edge.
    pub count: Option<i32>,
    pub languages: Vec<String>,
    pub stall_warnings: bool,
}

impl FirehoseParameters {
    pub fn count(mut self, count: i32) -> Self {
        self.count = Some(count);
        self
    }

    pub fn languages<S: Into<String>>(mut self, languages: impl IntoIterator<Item = S>) -> Self {
        self.languages.extend(languages.into_iter().map(Into::into));
        self
    }

    pub fn stall_warnings(mut self, enabled: bool) -> Self {
        self.stall_warnings = enabled;
        self
    }

    pub fn validate(&self) -> Result<(), ParameterError> {
        match self.count {
            Some(count) if count.unsigned_abs() > MAX_FIREHOSE_COUNT.unsigned_abs() => {
                Err(ParameterError::CountOutOfRange { count })
            }
            _ => Ok(()),
        }
    }

    pub fn to_params(&self) -> WireParams {
        let mut params = WireParams::new();
        if let Some(count) = self.count {
            params.push(("count", count.to_string()));
        }
        push_list(&mut params, "language", &self.languages);
        push_stall_warnings(&mut params, self.stall_warnings);
        params
    }
}

fn push_list<T: fmt::Display>(params: &mut WireParams, name: &'static str, values: &[T]) {
    if values.is_empty() {
        return;
    }
    let joined = values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",");
    params.push((name, joined));
}

fn push_stall_warnings(params: &mut WireParams, enabled: bool) {
    if enabled {
        params.push(("stall_warnings", "true".to_string()));
    }
}
