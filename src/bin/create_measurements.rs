//! Writes `<count>` random `<station>;<measurement>` lines to stdout.

use std::{
    env,
    io::{self, BufWriter, Write},
};

use anyhow::{bail, Context, Result};
use log::info;
use rand::{seq::SliceRandom, Rng};
use rand_distr::{Distribution, Normal};

/// Station names with their mean temperature.
const STATIONS: [(&str, f64); 40] = [
    ("Abha", 18.0),
    ("Abidjan", 26.0),
    ("Accra", 26.4),
    ("Addis Ababa", 16.0),
    ("Adelaide", 17.3),
    ("Anchorage", 2.8),
    ("Baghdad", 22.77),
    ("Bangkok", 28.6),
    ("Berlin", 10.3),
    ("Cabo San Lucas", 23.9),
    ("Copenhagen", 9.1),
    ("Da Lat", 17.9),
    ("Dikson", -11.1),
    ("Dodoma", 22.7),
    ("Halifax", 7.5),
    ("Hamburg", 9.7),
    ("Honolulu", 25.4),
    ("İzmir", 17.9),
    ("Johannesburg", 15.5),
    ("Kunming", 15.7),
    ("Marseille", 15.8),
    ("Napoli", 15.9),
    ("Nuuk", -1.4),
    ("Ouagadougou", 28.3),
    ("Ouarzazate", 18.9),
    ("Palmerston North", 13.2),
    ("Petropavlovsk-Kamchatsky", 1.9),
    ("Philadelphia", 13.2),
    ("Reykjavík", 4.3),
    ("São Paulo", 19.7),
    ("St. John's", 5.0),
    ("Tokyo", 15.4),
    ("Ürümqi", 7.4),
    ("Vladivostok", 4.9),
    ("Washington, D.C.", 14.6),
    ("Yakutsk", -8.8),
    ("Yellowknife", -4.3),
    ("Zagreb", 10.7),
    ("Zürich", 9.3),
    ("東京", 15.4),
];

const PROGRESS_INTERVAL: u64 = 50_000_000;

struct City {
    name: &'static str,
    distribution: Normal<f64>,
}

impl City {
    fn new(name: &'static str, mean: f64) -> Result<Self> {
        let distribution = Normal::new(mean, 10.0)
            .with_context(|| format!("could not create normal distribution for {}", name))?;
        Ok(Self { name, distribution })
    }

    /// One reading in tenths, clamped to [-99.9, 99.9].
    fn sample(&self, rng: &mut impl Rng) -> i32 {
        let temp = self.distribution.sample(rng).clamp(-99.9, 99.9);
        (temp * 10.0).round() as i32
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let Some(arg) = env::args().nth(1) else {
        bail!("usage: create_measurements <count>");
    };
    let count: u64 = arg
        .replace('_', "")
        .parse()
        .with_context(|| format!("expected an integer count, got `{}`", arg))?;

    let cities = STATIONS
        .iter()
        .map(|&(name, mean)| City::new(name, mean))
        .collect::<Result<Vec<_>>>()?;

    let mut rng = rand::thread_rng();
    let mut out = BufWriter::with_capacity(1 << 20, io::stdout().lock());
    for i in 1..=count {
        let city = cities.choose(&mut rng).context("no stations")?;
        let temp = city.sample(&mut rng);
        let sign = if temp < 0 { "-" } else { "" };
        writeln!(out, "{};{}{}.{}", city.name, sign, temp.abs() / 10, temp.abs() % 10)?;
        if i % PROGRESS_INTERVAL == 0 {
            info!("Wrote {} lines", i);
        }
    }
    out.flush()?;

    Ok(())
}
