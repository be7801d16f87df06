use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};

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

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

const BRANDS: [(&str, f64, &[&str]); 5] = [
    ("Toyota", 32_000.0, &["Corolla", "RAV4", "Camry"]),
    ("Volkswagen", 35_000.0, &["Golf", "Tiguan", "Passat"]),
    ("BMW", 55_000.0, &["3 Series", "X3", "5 Series"]),
    ("Tesla", 48_000.0, &["Model 3", "Model Y"]),
    ("Hyundai", 28_000.0, &["Tucson", "Elantra", "Kona"]),
];

const REGIONS: [&str; 4] = ["North", "South", "East", "West"];
const VEHICLE_TYPES: [&str; 4] = ["Sedan", "SUV", "Hatchback", "Pickup"];
const FUEL_TYPES: [&str; 4] = ["Gasoline", "Diesel", "Hybrid", "Electric"];

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let out_dir = Path::new("data");
    std::fs::create_dir_all(out_dir).context("creating data directory")?;
    let out_path = out_dir.join("automotive_sales.csv");

    let mut writer = csv::Writer::from_path(&out_path).context("creating sample CSV")?;
    writer.write_record([
        "date",
        "brand",
        "model",
        "sales_count",
        "price",
        "region",
        "vehicle_type",
        "fuel_type",
        "year",
    ])?;

    let start = NaiveDate::from_ymd_opt(2022, 1, 1).expect("valid start date");
    let n_days = 730u64;
    let mut rows = 0usize;

    for day_offset in 0..n_days {
        let date = start + Days::new(day_offset);
        // Mild market growth over the two years.
        let growth = 1.0 + day_offset as f64 / n_days as f64 * 0.4;

        // A handful of transactions per day.
        let per_day = 3 + (rng.next_u64() % 4) as usize;
        for _ in 0..per_day {
            let (brand, base_price, models) = rng.pick(&BRANDS);
            let model = rng.pick(models);
            let sales_count = (rng.gauss(18.0 * growth, 6.0).max(1.0)) as u64;
            let price = rng.gauss(base_price * growth.sqrt(), base_price * 0.08).max(5_000.0);
            let year = 2020 + (rng.next_u64() % 4) as i32;

            writer.write_record([
                date.format("%Y-%m-%d").to_string(),
                (*brand).to_string(),
                (*model).to_string(),
                sales_count.to_string(),
                format!("{price:.2}"),
                (*rng.pick(&REGIONS)).to_string(),
                (*rng.pick(&VEHICLE_TYPES)).to_string(),
                (*rng.pick(&FUEL_TYPES)).to_string(),
                year.to_string(),
            ])?;
            rows += 1;
        }
    }

    writer.flush().context("flushing sample CSV")?;
    println!("Wrote {rows} rows to {}", out_path.display());
    Ok(())
}
