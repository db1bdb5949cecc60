use std::sync::Arc;

use arrow::array::{Date32Array, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
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

    fn pick<'a>(&mut self, options: &[&'a str]) -> &'a str {
        options[(self.next_f64() * options.len() as f64) as usize % options.len()]
    }

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

struct ModeProfile {
    mode: &'static str,
    carriers: &'static [&'static str],
    containers: &'static [&'static str],
    lead_days: (f64, f64),
    distance_km: (f64, f64),
}

const PROFILES: [ModeProfile; 4] = [
    ModeProfile {
        mode: "Air",
        carriers: &["DHL Aviation", "FedEx", "Cargolux"],
        containers: &["ULD", "Pallet"],
        lead_days: (2.0, 8.0),
        distance_km: (1500.0, 12000.0),
    },
    ModeProfile {
        mode: "Sea",
        carriers: &["Maersk", "MSC", "CMA CGM"],
        containers: &["20ft", "40ft", "40ft HC"],
        lead_days: (20.0, 45.0),
        distance_km: (3000.0, 20000.0),
    },
    ModeProfile {
        mode: "Road",
        carriers: &["DB Schenker", "XPO"],
        containers: &["Box Trailer", "Reefer"],
        lead_days: (3.0, 12.0),
        distance_km: (200.0, 3000.0),
    },
    ModeProfile {
        mode: "Rail",
        carriers: &["DB Cargo", "Union Pacific"],
        containers: &["40ft", "Boxcar"],
        lead_days: (8.0, 20.0),
        distance_km: (800.0, 9000.0),
    },
];

const COUNTRIES: [&str; 8] = [
    "USA",
    "China",
    "Germany",
    "Japan",
    "Brazil",
    "India",
    "Netherlands",
    "South Africa",
];

fn pick_status(rng: &mut SimpleRng) -> &'static str {
    let r = rng.next_f64();
    if r < 0.60 {
        "Delivered"
    } else if r < 0.85 {
        "In Transit"
    } else if r < 0.95 {
        "Pending"
    } else {
        "Delayed"
    }
}

fn main() {
    let mut rng = SimpleRng::new(42);

    const ROWS: usize = 600;
    let window_start = NaiveDate::from_ymd_opt(2023, 7, 1).unwrap();
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();

    let mut ids: Vec<String> = Vec::with_capacity(ROWS);
    let mut origins: Vec<&str> = Vec::with_capacity(ROWS);
    let mut destinations: Vec<&str> = Vec::with_capacity(ROWS);
    let mut modes: Vec<&str> = Vec::with_capacity(ROWS);
    let mut statuses: Vec<&str> = Vec::with_capacity(ROWS);
    let mut carriers: Vec<&str> = Vec::with_capacity(ROWS);
    let mut containers: Vec<&str> = Vec::with_capacity(ROWS);
    let mut lead_times: Vec<f64> = Vec::with_capacity(ROWS);
    let mut values: Vec<f64> = Vec::with_capacity(ROWS);
    let mut weights: Vec<f64> = Vec::with_capacity(ROWS);
    let mut distances: Vec<f64> = Vec::with_capacity(ROWS);
    let mut departures: Vec<i32> = Vec::with_capacity(ROWS);

    for i in 0..ROWS {
        let profile = &PROFILES[(rng.next_f64() * PROFILES.len() as f64) as usize % PROFILES.len()];

        let origin = rng.pick(&COUNTRIES);
        let mut destination = rng.pick(&COUNTRIES);
        while destination == origin {
            destination = rng.pick(&COUNTRIES);
        }

        let (lead_lo, lead_hi) = profile.lead_days;
        let (dist_lo, dist_hi) = profile.distance_km;

        ids.push(format!("SH-{i:05}"));
        origins.push(origin);
        destinations.push(destination);
        modes.push(profile.mode);
        statuses.push(pick_status(&mut rng));
        carriers.push(rng.pick(profile.carriers));
        containers.push(rng.pick(profile.containers));
        lead_times.push((rng.range(lead_lo, lead_hi) * 10.0).round() / 10.0);
        values.push((rng.gauss(10.5, 0.8).exp() * 100.0).round() / 100.0);
        weights.push((rng.range(150.0, 24000.0) * 10.0).round() / 10.0);
        distances.push(rng.range(dist_lo, dist_hi).round());

        let departure = window_start + chrono::Days::new(rng.range(0.0, 365.0) as u64);
        departures.push((departure - epoch).num_days() as i32);
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("shipment_id", DataType::Utf8, false),
        Field::new("origin_country", DataType::Utf8, false),
        Field::new("destination_country", DataType::Utf8, false),
        Field::new("mode", DataType::Utf8, false),
        Field::new("status", DataType::Utf8, false),
        Field::new("carrier", DataType::Utf8, false),
        Field::new("container_type", DataType::Utf8, false),
        Field::new("lead_time_days", DataType::Float64, false),
        Field::new("cargo_value_usd", DataType::Float64, false),
        Field::new("cargo_weight_kg", DataType::Float64, false),
        Field::new("distance_km", DataType::Float64, false),
        Field::new("departure_date", DataType::Date32, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(
                ids.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(origins)),
            Arc::new(StringArray::from(destinations)),
            Arc::new(StringArray::from(modes)),
            Arc::new(StringArray::from(statuses)),
            Arc::new(StringArray::from(carriers)),
            Arc::new(StringArray::from(containers)),
            Arc::new(Float64Array::from(lead_times)),
            Arc::new(Float64Array::from(values)),
            Arc::new(Float64Array::from(weights)),
            Arc::new(Float64Array::from(distances)),
            Arc::new(Date32Array::from(departures)),
        ],
    )
    .expect("Failed to create RecordBatch");

    let output_path = "logistics_dataset.parquet";
    let file = std::fs::File::create(output_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    println!("Wrote {ROWS} shipments to {output_path}");
}
