use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

const OUTPUT_DIR: &str = "sample_data";
const LAUNCHES: usize = 120;

/// (site, relative launch frequency, base success probability)
const SITES: [(&str, f64, f64); 4] = [
    ("CCAFS LC-40", 0.45, 0.55),
    ("KSC LC-39A", 0.25, 0.80),
    ("VAFB SLC-4E", 0.15, 0.70),
    ("CCAFS SLC-40", 0.15, 0.75),
];

/// (category, version prefix, mean payload kg, success bonus), in the order
/// the families entered service.
const BOOSTERS: [(&str, &str, f64, f64); 5] = [
    ("v1.0", "F9 v1.0", 500.0, -0.30),
    ("v1.1", "F9 v1.1", 2500.0, -0.20),
    ("FT", "F9 FT", 4500.0, 0.05),
    ("B4", "F9 B4", 5500.0, 0.10),
    ("B5", "F9 B5", 6500.0, 0.20),
];

const MAX_PAYLOAD_KG: f64 = 15600.0;

/// One row in the same shape as the public launch table.
#[derive(Debug, Serialize)]
struct Row {
    #[serde(rename = "Flight Number")]
    flight_number: i64,
    #[serde(rename = "Launch Site")]
    launch_site: String,
    #[serde(rename = "class")]
    class: i64,
    #[serde(rename = "Payload Mass (kg)")]
    payload_mass_kg: f64,
    #[serde(rename = "Booster Version")]
    booster_version: String,
    #[serde(rename = "Booster Version Category")]
    booster_version_category: String,
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

    /// Pick an index with probability proportional to `weights`.
    fn weighted(&mut self, weights: impl Iterator<Item = f64> + Clone) -> usize {
        let total: f64 = weights.clone().sum();
        let mut target = self.next_f64() * total;
        let mut last = 0;
        for (i, w) in weights.enumerate() {
            if target < w {
                return i;
            }
            target -= w;
            last = i;
        }
        last
    }
}

fn generate_rows(rng: &mut SimpleRng) -> Vec<Row> {
    let mut serials = [1000u32, 1003, 1010, 1040, 1046];

    (0..LAUNCHES)
        .map(|i| {
            // Later flights fly newer booster families.
            let era = (i * BOOSTERS.len() / LAUNCHES).min(BOOSTERS.len() - 1);
            let family = if era > 0 && rng.next_f64() < 0.2 { era - 1 } else { era };
            let (category, prefix, mean_payload, bonus) = BOOSTERS[family];

            let site = rng.weighted(SITES.iter().map(|s| s.1));
            let (site_name, _, base_success) = SITES[site];

            let payload = rng
                .gauss(mean_payload, mean_payload * 0.45)
                .clamp(0.0, MAX_PAYLOAD_KG)
                .round();
            let success = rng.next_f64() < (base_success + bonus).clamp(0.05, 0.95);

            serials[family] += 1;
            Row {
                flight_number: i as i64 + 1,
                launch_site: site_name.to_string(),
                class: i64::from(success),
                payload_mass_kg: payload,
                booster_version: format!("{prefix}  B{}", serials[family]),
                booster_version_category: category.to_string(),
            }
        })
        .collect()
}

fn write_csv(rows: &[Row], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn build_batch(rows: &[Row]) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Flight Number", DataType::Int64, false),
        Field::new("Launch Site", DataType::Utf8, false),
        Field::new("class", DataType::Int64, false),
        Field::new("Payload Mass (kg)", DataType::Float64, false),
        Field::new("Booster Version", DataType::Utf8, false),
        Field::new("Booster Version Category", DataType::Utf8, false),
    ]));

    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.flight_number))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| &r.launch_site))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.class))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.payload_mass_kg))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| &r.booster_version))),
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| &r.booster_version_category),
            )),
        ],
    )
    .context("building record batch")
}

fn write_parquet(batch: &RecordBatch, path: &Path) -> Result<()> {
    let file = fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), None).context("creating Parquet writer")?;
    writer.write(batch).context("writing Parquet batch")?;
    writer.close().context("closing Parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate_rows(&mut rng);

    let dir = Path::new(OUTPUT_DIR);
    fs::create_dir_all(dir).with_context(|| format!("creating {OUTPUT_DIR}/"))?;

    let csv_path = dir.join("launches.csv");
    let parquet_path = dir.join("launches.parquet");
    write_csv(&rows, &csv_path)?;
    let batch = build_batch(&rows)?;
    write_parquet(&batch, &parquet_path)?;

    let successes = rows.iter().filter(|r| r.class == 1).count();
    println!(
        "Wrote {} launches ({successes} successful) to {} and {}",
        rows.len(),
        csv_path.display(),
        parquet_path.display()
    );
    let preview = pretty_format_batches(&[batch.slice(0, batch.num_rows().min(5))])
        .context("formatting preview")?;
    println!("{preview}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_rows_are_deterministic_and_in_range() {
        let a = generate_rows(&mut SimpleRng::new(42));
        let b = generate_rows(&mut SimpleRng::new(42));
        assert_eq!(a.len(), LAUNCHES);
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.booster_version, y.booster_version);
            assert_eq!(x.payload_mass_kg, y.payload_mass_kg);
        }
        assert!(a.iter().all(|r| (0.0..=MAX_PAYLOAD_KG).contains(&r.payload_mass_kg)));
        assert!(a.iter().all(|r| r.class == 0 || r.class == 1));
        assert_eq!(a[0].booster_version_category, "v1.0");
    }
}
