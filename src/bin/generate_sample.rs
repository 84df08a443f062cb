use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const SIZE: u32 = 64;

fn gaussian(d2: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-d2 / (2.0 * sigma.powi(2))).exp()
}

/// One synthetic slice: a centred blob whose radius shrinks with age, plus
/// noise.
fn generate_slice(age: f64, rng: &mut SimpleRng) -> image::GrayImage {
    let c = f64::from(SIZE) / 2.0;
    let sigma = 14.0 - age / 10.0;
    image::GrayImage::from_fn(SIZE, SIZE, |px, py| {
        let d2 = (f64::from(px) - c).powi(2) + (f64::from(py) - c).powi(2);
        let v = gaussian(d2, sigma, 200.0) + rng.gauss(20.0, 5.0);
        image::Luma([v.clamp(0.0, 255.0) as u8])
    })
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
}

struct Participant {
    id: String,
    age: f64,
    group: &'static str,
}

fn write_participants_tsv(root: &Path, participants: &[Participant]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(root.join("participants.tsv"))
        .context("creating participants.tsv")?;
    writer.write_record(["participant_id", "age", "group"])?;
    for p in participants {
        let age = format!("{:.1}", p.age);
        writer.write_record([p.id.as_str(), age.as_str(), p.group])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_participants_parquet(root: &Path, participants: &[Participant]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("participant_id", DataType::Utf8, false),
        Field::new("age", DataType::Float64, false),
        Field::new("group", DataType::Utf8, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(
                participants.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(
                participants.iter().map(|p| p.age).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                participants.iter().map(|p| p.group).collect::<Vec<_>>(),
            )),
        ],
    )
    .context("building participants batch")?;

    let file = std::fs::File::create(root.join("participants.parquet"))
        .context("creating participants.parquet")?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let root = PathBuf::from(
        std::env::args()
            .nth(1)
            .unwrap_or_else(|| "sample_cohort".to_string()),
    );
    let mut rng = SimpleRng::new(42);

    // one participant in the table has no scan, one scan has no table row
    let mut participants = Vec::new();
    for n in 1..=12 {
        let id = format!("sub-{n:02}");
        let age = 20.0 + 50.0 * rng.next_f64();
        let group = if n % 3 == 0 { "patient" } else { "control" };

        if n != 12 {
            let anat = root.join(&id).join("anat");
            std::fs::create_dir_all(&anat)
                .with_context(|| format!("creating {}", anat.display()))?;
            let slice = generate_slice(age, &mut rng);
            let path = anat.join(format!("{id}_T1w.png"));
            slice
                .save(&path)
                .with_context(|| format!("writing {}", path.display()))?;
        }
        if n != 1 {
            participants.push(Participant { id, age, group });
        }
    }

    write_participants_tsv(&root, &participants)?;
    write_participants_parquet(&root, &participants)?;

    println!(
        "Wrote 11 scans and {} participant rows to {}",
        participants.len(),
        root.display()
    );
    Ok(())
}
