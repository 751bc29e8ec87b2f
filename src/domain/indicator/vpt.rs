//! VPT (Volume-Price Trend) indicator.
//!
//! VPT[0] = 0; VPT[i] = VPT[i-1] + volume[i] * (C[i] - C[i-1]) / C[i-1].

use crate::domain::error::Result;
use crate::domain::indicator::{
    check_input, dated_points, IndicatorResult, IndicatorType, IndicatorValue,
};
use crate::domain::time_series::TimeSeries;

pub fn calculate_vpt(series: &TimeSeries) -> Result<IndicatorResult> {
    let indicator = IndicatorType::Vpt;
    check_input(series, &indicator)?;

    let mut vpt = 0.0;
    let mut values = vec![vpt];
    for w in series.points().windows(2) {
        let change = (w[1].close - w[0].close) / w[0].close;
        vpt += change * w[1].volume as f64;
        values.push(vpt);
    }

    Ok(IndicatorResult {
        points: dated_points(series, 0, values.into_iter().map(IndicatorValue::Simple)),
        indicator,
    })
}
