use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Date32Array, Float64Array, Int64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Days, NaiveDate};
use clap::Parser;
use parquet::arrow::ArrowWriter;

/// Write a synthetic heart dataset (heart.csv + heart.parquet)
#[derive(Parser)]
#[command(name = "generate_sample")]
struct Args {
    /// Number of patient records
    #[arg(long, default_value_t = 303)]
    rows: usize,

    /// PRNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Output directory
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

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

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Index drawn from relative `weights`.
    fn weighted(&mut self, weights: &[f64]) -> i64 {
        let total: f64 = weights.iter().sum();
        let mut roll = self.next_f64() * total;
        for (i, w) in weights.iter().enumerate() {
            if roll < *w {
                return i as i64;
            }
            roll -= w;
        }
        weights.len() as i64 - 1
    }

    fn int_gauss(&mut self, mean: f64, std_dev: f64, lo: f64, hi: f64) -> i64 {
        self.gauss(mean, std_dev).round().clamp(lo, hi) as i64
    }
}

const COLUMNS: [&str; 15] = [
    "age", "sex", "cp", "trestbps", "chol", "fbs", "restecg", "thalach", "exang", "oldpeak",
    "slope", "ca", "thal", "target", "date_exam",
];

/// One synthetic exam; every column but `oldpeak` and `date_exam` is integral.
struct Row {
    ints: [i64; 13],
    oldpeak: f64,
    date_exam: NaiveDate,
}

fn generate_row(rng: &mut SimpleRng, first_day: NaiveDate) -> Row {
    let age = rng.int_gauss(54.0, 9.0, 29.0, 77.0);
    let sex = i64::from(rng.chance(0.68));
    let cp = rng.weighted(&[0.47, 0.17, 0.28, 0.08]);
    let trestbps = rng.int_gauss(131.0, 17.0, 94.0, 200.0);
    let chol = rng.int_gauss(246.0, 51.0, 126.0, 564.0);
    let fbs = i64::from(rng.chance(0.15));
    let restecg = rng.weighted(&[0.49, 0.50, 0.01]);
    let thalach = rng.int_gauss(210.0 - 0.9 * age as f64, 18.0, 71.0, 202.0);
    let exang = i64::from(rng.chance(0.33));
    let oldpeak = (rng.gauss(1.0, 1.1).abs() * 10.0).round() / 10.0;
    let slope = rng.weighted(&[0.07, 0.46, 0.47]);
    let ca = rng.weighted(&[0.58, 0.21, 0.13, 0.07, 0.01]);
    let thal = rng.weighted(&[0.01, 0.06, 0.55, 0.38]);

    // Loosely mimics the public dataset: non-typical chest pain, high max
    // heart rate and no exercise angina all push towards `target = 1`.
    let score = 0.9 * (cp > 0) as i64 as f64 + 0.02 * (thalach as f64 - 150.0)
        - 0.9 * exang as f64
        - 0.5 * oldpeak
        - 0.6 * sex as f64
        + 0.6;
    let p = 1.0 / (1.0 + (-score).exp());
    let target = i64::from(rng.chance(p));

    let offset = (rng.next_f64() * 730.0) as u64;
    let date_exam = first_day
        .checked_add_days(Days::new(offset))
        .unwrap_or(first_day);

    Row {
        ints: [
            age, sex, cp, trestbps, chol, fbs, restecg, thalach, exang, slope, ca, thal, target,
        ],
        oldpeak,
        date_exam,
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);
    let first_day = NaiveDate::from_ymd_opt(2022, 1, 1).context("invalid start date")?;

    let rows: Vec<Row> = (0..args.rows).map(|_| generate_row(&mut rng, first_day)).collect();

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;
    let csv_path = args.out_dir.join("heart.csv");
    write_csv(&csv_path, &rows)?;
    let parquet_path = args.out_dir.join("heart.parquet");
    write_parquet(&parquet_path, &rows)?;

    println!(
        "Wrote {} records to {} and {}",
        rows.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}

// `ints` order: every COLUMNS entry except oldpeak (index 9) and date_exam.
fn int_column(name: &str) -> Option<usize> {
    let pos = COLUMNS.iter().position(|c| *c == name)?;
    match pos {
        9 | 14 => None,
        p if p < 9 => Some(p),
        p => Some(p - 1),
    }
}

fn write_csv(path: &Path, rows: &[Row]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(COLUMNS)?;
    for row in rows {
        let record: Vec<String> = COLUMNS
            .iter()
            .map(|&col| match col {
                "oldpeak" => row.oldpeak.to_string(),
                "date_exam" => row.date_exam.format("%Y-%m-%d").to_string(),
                _ => int_column(col)
                    .map(|i| row.ints[i].to_string())
                    .unwrap_or_default(),
            })
            .collect();
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[Row]) -> Result<()> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).context("invalid epoch")?;

    let mut fields = Vec::with_capacity(COLUMNS.len());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(COLUMNS.len());
    for &col in &COLUMNS {
        match col {
            "oldpeak" => {
                fields.push(Field::new(col, DataType::Float64, false));
                arrays.push(Arc::new(Float64Array::from(
                    rows.iter().map(|r| r.oldpeak).collect::<Vec<_>>(),
                )));
            }
            "date_exam" => {
                fields.push(Field::new(col, DataType::Date32, false));
                arrays.push(Arc::new(Date32Array::from(
                    rows.iter()
                        .map(|r| (r.date_exam - epoch).num_days() as i32)
                        .collect::<Vec<_>>(),
                )));
            }
            _ => {
                let i = int_column(col).context("unknown column")?;
                fields.push(Field::new(col, DataType::Int64, false));
                arrays.push(Arc::new(Int64Array::from(
                    rows.iter().map(|r| r.ints[i]).collect::<Vec<_>>(),
                )));
            }
        }
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}
