//! Read side of the satisfaction dashboard.
//!
//! Ratings are loaded once, enriched with calendar fields and then filtered and
//! aggregated in memory. Nothing here writes to the store.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{error::StoreResult, record::Rating, store::RecordStore};

/// Default number of samples of the trailing moving average.
pub const TREND_WINDOW: usize = 5;

/// Coerce a submitted `value` into a number. Anything that is not a finite number
/// or a numeric string is missing.
pub fn coerce_value(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingPoint {
    pub timestamp: NaiveDateTime,
    pub date: NaiveDate,
    pub year: i32,
    pub month: u32,
    pub rating: Option<String>,
    pub value: Option<f64>,
}

impl From<&Rating> for RatingPoint {
    fn from(rating: &Rating) -> Self {
        let date = rating.timestamp.date();
        Self {
            timestamp: rating.timestamp,
            date,
            year: date.year(),
            month: date.month(),
            rating: rating.rating_str().map(str::to_string),
            value: coerce_value(rating.value.as_ref()),
        }
    }
}

/// Dashboard filters. Every bound is optional, `from` and `to` are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingFilter {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl RatingFilter {
    pub fn matches(&self, point: &RatingPoint) -> bool {
        self.year.map_or(true, |y| point.year == y)
            && self.month.map_or(true, |m| point.month == m)
            && self.from.map_or(true, |d| point.date >= d)
            && self.to.map_or(true, |d| point.date <= d)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub rating: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub timestamp: NaiveDateTime,
    pub value: Option<f64>,
    pub average: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateBounds {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

/// Values offered by the dashboard filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub years: Vec<i32>,
    /// Months of the selected year, or of every year without one
    pub months: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub total: usize,
    pub bounds: Option<DateBounds>,
    pub distribution: BTreeMap<String, usize>,
    pub daily: Vec<DailyCount>,
    pub trend: Vec<TrendPoint>,
    pub points: Vec<RatingPoint>,
}

/// Ratings of the dashboard, ordered by timestamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingFrame {
    points: Vec<RatingPoint>,
}

impl RatingFrame {
    pub fn from_ratings<'a, I: IntoIterator<Item = &'a Rating>>(ratings: I) -> Self {
        let mut points: Vec<RatingPoint> = ratings.into_iter().map(RatingPoint::from).collect();
        points.sort_by_key(|p| p.timestamp);
        Self { points }
    }

    pub async fn load(store: &dyn RecordStore) -> StoreResult<Self> {
        let ratings = store.all_ratings().await?;
        Ok(Self::from_ratings(&ratings))
    }

    pub fn points(&self) -> &[RatingPoint] {
        &self.points
    }
    pub fn len(&self) -> usize {
        self.points.len()
    }
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn filter(&self, filter: &RatingFilter) -> Self {
        Self {
            points: self.points.iter().filter(|p| filter.matches(p)).cloned().collect(),
        }
    }

    pub fn date_bounds(&self) -> Option<DateBounds> {
        let min = self.points.iter().map(|p| p.date).min()?;
        let max = self.points.iter().map(|p| p.date).max()?;
        Some(DateBounds { min, max })
    }

    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.points.iter().map(|p| p.year).collect();
        years.dedup();
        years
    }

    pub fn months(&self, year: Option<i32>) -> Vec<u32> {
        let mut months: Vec<u32> = self
            .points
            .iter()
            .filter(|p| year.map_or(true, |y| p.year == y))
            .map(|p| p.month)
            .collect();
        months.sort_unstable();
        months.dedup();
        months
    }

    /// Filter choices derived from this frame, to be computed before filtering.
    pub fn filter_options(&self, year: Option<i32>) -> FilterOptions {
        FilterOptions {
            years: self.years(),
            months: self.months(year),
        }
    }

    /// Number of ratings per label. Ratings without a label are not counted.
    pub fn distribution(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for label in self.points.iter().filter_map(|p| p.rating.as_ref()) {
            *counts.entry(label.clone()).or_insert(0) += 1;
        }
        counts
    }

    pub fn daily_counts(&self) -> Vec<DailyCount> {
        let mut counts: BTreeMap<(NaiveDate, &str), usize> = BTreeMap::new();
        for point in &self.points {
            if let Some(label) = point.rating.as_deref() {
                *counts.entry((point.date, label)).or_insert(0) += 1;
            }
        }
        counts
            .into_iter()
            .map(|((date, rating), count)| DailyCount {
                date,
                rating: rating.to_string(),
                count,
            })
            .collect()
    }

    /// Trailing moving average of `value` over `window` samples.
    ///
    /// The first points average what is available. Missing values are skipped; a
    /// window holding none has no average.
    pub fn moving_average(&self, window: usize) -> Vec<TrendPoint> {
        let window = window.max(1);
        self.points
            .iter()
            .enumerate()
            .map(|(i, point)| {
                let start = (i + 1).saturating_sub(window);
                let values: Vec<f64> = self.points[start..=i].iter().filter_map(|p| p.value).collect();
                let average = (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64);
                TrendPoint {
                    timestamp: point.timestamp,
                    value: point.value,
                    average,
                }
            })
            .collect()
    }

    pub fn report(&self, window: usize) -> DashboardReport {
        DashboardReport {
            total: self.points.len(),
            bounds: self.date_bounds(),
            distribution: self.distribution(),
            daily: self.daily_counts(),
            trend: self.moving_average(window),
            points: self.points.clone(),
        }
    }
}
