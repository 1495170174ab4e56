use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate};
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

struct Row {
    period: i64,
    date: NaiveDate,
    region: &'static str,
    units: i64,
    sales: f64,
    cost: f64,
    /// Missing reports are written as the `-` placeholder.
    returns: Option<i64>,
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let regions = ["North", "South", "East", "West"];
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).context("invalid start date")?;

    let mut rows = Vec::new();
    for period in 0..24i64 {
        let date = start + chrono::Duration::weeks(period * 2);
        let season = 1.0 + 0.3 * (date.ordinal() as f64 / 365.0 * std::f64::consts::TAU).sin();
        for (r, &region) in regions.iter().enumerate() {
            let units = (rng.gauss(120.0 + 15.0 * r as f64, 12.0) * season).round().max(0.0) as i64;
            let price = 25.0 + r as f64 * 2.5;
            let sales = units as f64 * price;
            let cost = sales * rng.gauss(0.62, 0.04);
            let returns = (rng.next_f64() > 0.1).then(|| (units as f64 * 0.03).round() as i64);
            rows.push(Row {
                period: period + 1,
                date,
                region,
                units,
                sales: (sales * 100.0).round() / 100.0,
                cost: (cost * 100.0).round() / 100.0,
                returns,
            });
        }
    }

    // CSV
    let csv_path = "sample_data.csv";
    let mut writer = csv::Writer::from_path(csv_path).context("creating CSV")?;
    writer.write_record(["period", "date", "region", "units", "sales", "cost", "returns"])?;
    for row in &rows {
        writer.write_record([
            row.period.to_string(),
            row.date.format("%Y-%m-%d").to_string(),
            row.region.to_string(),
            row.units.to_string(),
            row.sales.to_string(),
            row.cost.to_string(),
            row.returns.map_or_else(|| "-".to_string(), |v| v.to_string()),
        ])?;
    }
    writer.flush()?;

    // Parquet
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).context("invalid epoch")?;
    let schema = Arc::new(Schema::new(vec![
        Field::new("period", DataType::Int64, false),
        Field::new("date", DataType::Date32, false),
        Field::new("region", DataType::Utf8, false),
        Field::new("units", DataType::Int64, false),
        Field::new("sales", DataType::Float64, false),
        Field::new("cost", DataType::Float64, false),
        Field::new("returns", DataType::Int64, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.period))),
            Arc::new(Date32Array::from_iter_values(
                rows.iter().map(|r| (r.date - epoch).num_days() as i32),
            )),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.region))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.units))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.sales))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.cost))),
            Arc::new(Int64Array::from(rows.iter().map(|r| r.returns).collect::<Vec<_>>())),
        ],
    )
    .context("building record batch")?;

    let parquet_path = "sample_data.parquet";
    let file = std::fs::File::create(parquet_path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;

    println!(
        "Wrote {} rows to {csv_path} and {parquet_path}",
        rows.len()
    );
    Ok(())
}
