use std::path::Path;

use telemarketing_viewer::data::export::write_xlsx;
use telemarketing_viewer::data::loader::{DELIMITER, FormatHint, load};

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

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

const JOBS: &[&str] = &[
    "admin.", "blue-collar", "technician", "services", "management",
    "retired", "entrepreneur", "self-employed", "housemaid", "unemployed",
    "student", "unknown",
];
const MARITAL: &[&str] = &["married", "single", "divorced", "unknown"];
const YES_NO: &[&str] = &["no", "yes", "unknown"];
const CONTACT: &[&str] = &["cellular", "telephone"];
const MONTHS: &[&str] = &["mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec"];
const DAYS: &[&str] = &["mon", "tue", "wed", "thu", "fri"];

fn main() {
    let mut rng = SimpleRng::new(42);
    let n_rows = 2_000;

    let csv_path = "bank_sample.csv";
    let mut writer = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .from_path(csv_path)
        .expect("Failed to create output file");

    writer
        .write_record([
            "age", "job", "marital", "default", "housing", "loan", "contact",
            "month", "day_of_week", "campaign", "y",
        ])
        .expect("Failed to write header");

    for _ in 0..n_rows {
        let age = 18 + (rng.next_f64() * 70.0) as u32;
        let job = if age >= 62 { "retired" } else { rng.pick(JOBS) };
        let contact = rng.pick(CONTACT);
        let campaign = 1 + (rng.next_f64() * 6.0) as u32;

        // Older clients and cellular contacts accept more often.
        let mut p_yes = 0.08;
        if age >= 60 || age < 25 {
            p_yes += 0.2;
        }
        if contact == "cellular" {
            p_yes += 0.05;
        }
        let y = if rng.next_f64() < p_yes { "yes" } else { "no" };

        writer
            .write_record([
                age.to_string().as_str(),
                job,
                rng.pick(MARITAL),
                rng.pick(&YES_NO[..2]),
                rng.pick(YES_NO),
                rng.pick(YES_NO),
                contact,
                rng.pick(MONTHS),
                rng.pick(DAYS),
                campaign.to_string().as_str(),
                y,
            ])
            .expect("Failed to write record");
    }
    writer.flush().expect("Failed to flush output");
    println!("Wrote {n_rows} rows to {csv_path}");

    // Same data as a spreadsheet, for exercising the fallback reader.
    let bytes = std::fs::read(csv_path).expect("Failed to read back CSV");
    let table = load(&bytes, FormatHint::Auto).expect("Generated CSV does not load");
    let xlsx_path = "bank_sample.xlsx";
    write_xlsx(&table, Path::new(xlsx_path)).expect("Failed to write xlsx");
    println!("Wrote {n_rows} rows to {xlsx_path}");
}
