//! Tabular CSV output for series, indicator rows and correlation triples.

use std::io::Write;
use std::path::Path;

use crate::domain::error::Result;
use crate::domain::indicator::IndicatorResult;
use crate::domain::risk::CorrelationMatrix;
use crate::domain::time_series::TimeSeries;

/// Write a series in the layout [`CsvAdapter`] reads back.
///
/// [`CsvAdapter`]: crate::adapters::csv_adapter::CsvAdapter
pub fn write_series<W: Write>(writer: W, series: &TimeSeries) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["date", "open", "high", "low", "close", "volume"])?;
    for p in series.points() {
        wtr.write_record([
            p.date.format("%Y-%m-%d").to_string(),
            p.open.to_string(),
            p.high.to_string(),
            p.low.to_string(),
            p.close.to_string(),
            p.volume.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save to `<dir>/<TICKER>.csv`.
pub fn save_series(dir: &Path, series: &TimeSeries) -> Result<()> {
    let file = std::fs::File::create(dir.join(format!("{}.csv", series.ticker())))?;
    write_series(file, series)
}

/// Long-format rows `ticker,date,indicator,column,value`, one per output line.
pub fn write_indicator_rows<W: Write>(
    writer: W,
    ticker: &str,
    results: &[IndicatorResult],
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["ticker", "date", "indicator", "column", "value"])?;
    for result in results {
        let name = result.indicator.to_string();
        for (date, column, value) in result.to_rows() {
            let date = date.format("%Y-%m-%d").to_string();
            let value = value.to_string();
            wtr.write_record([ticker, date.as_str(), name.as_str(), column, value.as_str()])?;
        }
    }
    wtr.flush()?;
    Ok(())
}

/// `ticker_a,ticker_b,correlation` for every cell of the matrix.
pub fn write_correlation<W: Write>(writer: W, matrix: &CorrelationMatrix) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["ticker_a", "ticker_b", "correlation"])?;
    for (a, b, rho) in matrix.triples() {
        let rho = rho.to_string();
        wtr.write_record([a, b, rho.as_str()])?;
    }
    wtr.flush()?;
    Ok(())
}
