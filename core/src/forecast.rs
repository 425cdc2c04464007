//! Demand forecasting over fulfilled sales history.
//!
//! All functions here are pure; history comes from the sales ledger as a
//! day-ordered series of fulfilled quantities. Methods are the classic
//! teaching trio: moving average, simple exponential smoothing and
//! Holt's double smoothing for trended series.

use serde::{Deserialize, Serialize};

/// Average of the last `window` observations. A window larger than the
/// history uses everything available; an empty history forecasts zero.
pub fn moving_average(history: &[f64], window: usize) -> f64 {
    if history.is_empty() || window == 0 {
        return 0.0;
    }
    let start = history.len().saturating_sub(window);
    let tail = &history[start..];
    tail.iter().sum::<f64>() / tail.len() as f64
}

/// Simple exponential smoothing, seeded with the first observation.
/// Returns the one-step-ahead forecast after consuming the series.
pub fn exponential_smoothing(history: &[f64], alpha: f64) -> f64 {
    let mut iter = history.iter();
    let Some(&first) = iter.next() else {
        return 0.0;
    };
    let mut level = first;
    for &value in iter {
        level = alpha * value + (1.0 - alpha) * level;
    }
    level
}

/// Output of Holt's method: the next-period forecast plus the in-sample
/// fitted values, index-aligned with the input so error measures can be
/// computed against them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoltForecast {
    pub next: f64,
    pub fitted: Vec<f64>,
}

/// Holt's linear (double exponential) smoothing. Level seeds from the
/// first observation, trend from the first difference. Needs at least
/// two points; with fewer it degrades to repeating what it saw.
pub fn holt(history: &[f64], alpha: f64, beta: f64) -> HoltForecast {
    match history {
        [] => HoltForecast {
            next: 0.0,
            fitted: Vec::new(),
        },
        [only] => HoltForecast {
            next: *only,
            fitted: vec![*only],
        },
        _ => {
            let mut level = history[0];
            let mut trend = history[1] - history[0];
            let mut fitted = Vec::with_capacity(history.len());
            fitted.push(history[0]);

            for &value in &history[1..] {
                fitted.push(level + trend);
                let prev_level = level;
                level = alpha * value + (1.0 - alpha) * (level + trend);
                trend = beta * (level - prev_level) + (1.0 - beta) * trend;
            }

            HoltForecast {
                next: level + trend,
                fitted,
            }
        }
    }
}

/// Mean absolute percentage error, in percent. Zero-actual observations
/// are skipped rather than dividing by zero; if every actual is zero the
/// measure is undefined and reported as zero.
pub fn mape(actual: &[f64], forecast: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for (&a, &f) in actual.iter().zip(forecast) {
        if a != 0.0 {
            sum += ((a - f) / a).abs();
            count += 1;
        }
    }
    if count > 0 {
        sum / count as f64 * 100.0
    } else {
        0.0
    }
}

/// Mean absolute deviation between actuals and forecasts.
pub fn mad(actual: &[f64], forecast: &[f64]) -> f64 {
    let n = actual.len().min(forecast.len());
    if n == 0 {
        return 0.0;
    }
    actual
        .iter()
        .zip(forecast)
        .map(|(a, f)| (a - f).abs())
        .sum::<f64>()
        / n as f64
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodScore {
    pub method: String,
    pub forecast: f64,
    pub mape: f64,
    pub mad: f64,
}

/// Run every method against the history and score each by replaying it
/// one step at a time in-sample. Callers pick the lowest MAPE.
pub fn compare_methods(history: &[f64]) -> Vec<MethodScore> {
    let mut scores = Vec::new();
    if history.len() < 2 {
        return scores;
    }

    for window in [3usize, 7] {
        let mut fitted = Vec::with_capacity(history.len());
        for i in 0..history.len() {
            fitted.push(moving_average(&history[..i], window));
        }
        scores.push(MethodScore {
            method: format!("moving_average_{window}"),
            forecast: moving_average(history, window),
            mape: mape(&history[1..], &fitted[1..]),
            mad: mad(&history[1..], &fitted[1..]),
        });
    }

    for alpha in [0.2, 0.5] {
        let mut fitted = Vec::with_capacity(history.len());
        for i in 0..history.len() {
            fitted.push(exponential_smoothing(&history[..i], alpha));
        }
        scores.push(MethodScore {
            method: format!("exp_smoothing_{alpha:.1}"),
            forecast: exponential_smoothing(history, alpha),
            mape: mape(&history[1..], &fitted[1..]),
            mad: mad(&history[1..], &fitted[1..]),
        });
    }

    let holt_result = holt(history, 0.5, 0.3);
    scores.push(MethodScore {
        method: "holt".to_string(),
        forecast: holt_result.next,
        mape: mape(&history[1..], &holt_result.fitted[1..]),
        mad: mad(&history[1..], &holt_result.fitted[1..]),
    });

    scores
}
