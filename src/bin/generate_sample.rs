use std::fs::File;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::print_batches;
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

    fn bounded(&mut self, mean: f64, std_dev: f64, lo: f64, hi: f64) -> f64 {
        self.gauss(mean, std_dev).clamp(lo, hi)
    }
}

/// One synthetic institution in the source column layout.
struct Row {
    name: String,
    private: &'static str,
    apps: i64,
    accept: i64,
    enroll: i64,
    top10: i64,
    f_undergrad: i64,
    outstate: i64,
    room_board: i64,
    books: i64,
    personal: i64,
    phd: i64,
    sf_ratio: f64,
    alumni: i64,
    expend: i64,
    grad_rate: i64,
}

const PLACES: [&str; 12] = [
    "Northfield", "Lakeside", "Granite", "Riverbend", "Maple Valley", "Cedar Ridge",
    "Eastport", "Sunset", "Harbor", "Pine Hill", "Westbrook", "Stonegate",
];
const KINDS: [&str; 4] = ["College", "University", "State University", "Institute"];

fn generate(rng: &mut SimpleRng, n: usize) -> Vec<Row> {
    (0..n)
        .map(|i| {
            let private = rng.next_f64() < 0.72;
            let quality = rng.gauss(0.0, 1.0);
            let sector = |yes: f64, no: f64| if private { yes } else { no };

            let apps = rng.bounded(sector(2000.0, 6000.0), 1800.0, 80.0, 40000.0);
            let accept_share = rng.bounded(0.75 - 0.12 * quality, 0.12, 0.15, 1.0);
            let accept = (apps * accept_share).round();
            let enroll = (accept * rng.bounded(0.38, 0.1, 0.1, 0.9)).round();
            let f_undergrad = rng.bounded(sector(1800.0, 9000.0), 2500.0, 150.0, 30000.0);

            let outstate = rng.bounded(sector(11500.0, 7500.0), 3000.0, 2300.0, 21700.0);
            let expend = rng.bounded(9000.0 + 2500.0 * quality, 3000.0, 3200.0, 56000.0);
            let phd = rng.bounded(72.0 + 10.0 * quality, 12.0, 8.0, 100.0);
            let grad_mean = 65.0 + 10.0 * quality + sector(4.0, 0.0);
            let grad_rate = rng.bounded(grad_mean, 12.0, 10.0, 100.0);

            Row {
                name: format!(
                    "{} {} #{}",
                    PLACES[i % PLACES.len()],
                    KINDS[(i / PLACES.len()) % KINDS.len()],
                    i + 1
                ),
                private: if private { "Yes" } else { "No" },
                apps: apps.round() as i64,
                accept: accept as i64,
                enroll: enroll as i64,
                top10: rng.bounded(27.0 + 15.0 * quality, 10.0, 1.0, 96.0).round() as i64,
                f_undergrad: f_undergrad.round() as i64,
                outstate: outstate.round() as i64,
                room_board: rng.bounded(4400.0, 1000.0, 1800.0, 8100.0).round() as i64,
                books: rng.bounded(550.0, 150.0, 100.0, 2300.0).round() as i64,
                personal: rng.bounded(1300.0, 600.0, 250.0, 6800.0).round() as i64,
                phd: phd.round() as i64,
                sf_ratio: (rng.bounded(sector(13.0, 17.0), 3.5, 2.5, 39.8) * 10.0).round() / 10.0,
                alumni: rng
                    .bounded(sector(26.0, 14.0) + 5.0 * quality, 9.0, 0.0, 64.0)
                    .round() as i64,
                expend: expend.round() as i64,
                grad_rate: grad_rate.round() as i64,
            }
        })
        .collect()
}

const HEADER: [&str; 17] = [
    "", "Private", "Apps", "Accept", "Enroll", "Top10perc", "F.Undergrad", "Outstate",
    "Room.Board", "Books", "Personal", "PhD", "S.F.Ratio", "perc.alumni", "Expend", "Grad.Rate",
    "Terminal",
];

fn write_csv(rows: &[Row], path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record(HEADER)?;
    for r in rows {
        writer.write_record([
            r.name.clone(),
            r.private.to_string(),
            r.apps.to_string(),
            r.accept.to_string(),
            r.enroll.to_string(),
            r.top10.to_string(),
            r.f_undergrad.to_string(),
            r.outstate.to_string(),
            r.room_board.to_string(),
            r.books.to_string(),
            r.personal.to_string(),
            r.phd.to_string(),
            format!("{:.1}", r.sf_ratio),
            r.alumni.to_string(),
            r.expend.to_string(),
            r.grad_rate.to_string(),
            (r.phd + 8).min(100).to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn to_batch(rows: &[Row]) -> Result<RecordBatch> {
    let int = |f: fn(&Row) -> i64| -> ArrayRef {
        Arc::new(Int64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
    };

    let mut fields = vec![
        Field::new("college", DataType::Utf8, false),
        Field::new(HEADER[1], DataType::Utf8, false),
    ];
    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(rows.iter().map(|r| r.name.as_str()).collect::<Vec<_>>())),
        Arc::new(StringArray::from(rows.iter().map(|r| r.private).collect::<Vec<_>>())),
    ];

    let ints: [(&str, fn(&Row) -> i64); 13] = [
        (HEADER[2], |r| r.apps),
        (HEADER[3], |r| r.accept),
        (HEADER[4], |r| r.enroll),
        (HEADER[5], |r| r.top10),
        (HEADER[6], |r| r.f_undergrad),
        (HEADER[7], |r| r.outstate),
        (HEADER[8], |r| r.room_board),
        (HEADER[9], |r| r.books),
        (HEADER[10], |r| r.personal),
        (HEADER[11], |r| r.phd),
        (HEADER[13], |r| r.alumni),
        (HEADER[14], |r| r.expend),
        (HEADER[15], |r| r.grad_rate),
    ];
    for (name, f) in ints {
        fields.push(Field::new(name, DataType::Int64, false));
        columns.push(int(f));
    }
    fields.push(Field::new(HEADER[12], DataType::Float64, false));
    columns.push(Arc::new(Float64Array::from(
        rows.iter().map(|r| r.sf_ratio).collect::<Vec<_>>(),
    )));

    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).context("building record batch")
}

fn write_parquet(batch: &RecordBatch, path: &str) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng, 777);

    let csv_path = "sample_colleges.csv";
    write_csv(&rows, csv_path)?;

    let batch = to_batch(&rows)?;
    let parquet_path = "sample_colleges.parquet";
    write_parquet(&batch, parquet_path)?;

    print_batches(&[batch.slice(0, 5)])?;
    println!(
        "Wrote {} institutions to {csv_path} and {parquet_path}",
        rows.len()
    );
    Ok(())
}
