//! OBV (On-Balance Volume) indicator.

use crate::domain::error::Result;
use crate::domain::indicator::{
    check_input, dated_points, IndicatorResult, IndicatorType, IndicatorValue,
};
use crate::domain::time_series::TimeSeries;

/// Calculate OBV (On-Balance Volume) indicator.
///
/// OBV[0] = volume[0]
/// If close[i] > close[i-1]: OBV[i] = OBV[i-1] + volume[i]
/// If close[i] < close[i-1]: OBV[i] = OBV[i-1] - volume[i]
/// If close[i] == close[i-1]: OBV[i] = OBV[i-1]
///
/// No warmup period; one output per input point.
pub fn calculate_obv(series: &TimeSeries) -> Result<IndicatorResult> {
    let indicator = IndicatorType::Obv;
    check_input(series, &indicator)?;

    let points = series.points();
    let mut values = Vec::with_capacity(points.len());
    let mut obv = points[0].volume as f64;
    values.push(obv);

    for w in points.windows(2) {
        let (prev, bar) = (&w[0], &w[1]);
        if bar.close > prev.close {
            obv += bar.volume as f64;
        } else if bar.close < prev.close {
            obv -= bar.volume as f64;
        }
        values.push(obv);
    }

    Ok(IndicatorResult {
        points: dated_points(series, 0, values.into_iter().map(IndicatorValue::Simple)),
        indicator,
    })
}
