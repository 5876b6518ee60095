pub mod config;
pub mod error;
pub mod lines;
pub mod parse;
pub mod process;
pub mod profile;


use std::{collections::hash_map::Entry, fmt};

use rustc_hash::FxHashMap;

pub use config::{Config, Mode};
pub use error::{Error, ErrorKind, Malformed, Result};
pub use process::run;

/// A reading in tenths of a degree, e.g. `-12.3` is stored as `-123`.
pub type Measurement = i32;

/// Fixed point value with one implied decimal digit, formatted without going
/// through floating point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tenths(pub i64);

impl fmt::Display for Tenths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 0 {
            f.write_str("-")?;
        }
        let abs = self.0.unsigned_abs();
        write!(f, "{}.{}", abs / 10, abs % 10)
    }
}

/// Only built from a first reading, so `count` is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Station {
    min: Measurement,
    max: Measurement,
    sum: i64,
    count: u64,
}

impl Station {
    pub fn new(temp: Measurement) -> Self {
        Self {
            min: temp,
            max: temp,
            sum: temp as i64,
            count: 1,
        }
    }

    pub fn min(&self) -> Measurement {
        self.min
    }

    pub fn max(&self) -> Measurement {
        self.max
    }

    pub fn sum(&self) -> i64 {
        self.sum
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Returns `None` if the sum overflows.
    #[inline]
    #[must_use]
    pub fn update(&mut self, temp: Measurement) -> Option<()> {
        self.sum = self.sum.checked_add(temp as i64)?;
        self.min = self.min.min(temp);
        self.max = self.max.max(temp);
        self.count += 1;
        Some(())
    }

    /// Combine two partial aggregates of the same station. Returns `None` if
    /// the sum overflows.
    #[must_use]
    pub fn merge(&mut self, other: &Station) -> Option<()> {
        self.sum = self.sum.checked_add(other.sum)?;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.count += other.count;
        Some(())
    }

    /// Mean in tenths, rounded half away from zero.
    ///
    /// Equivalent to `round((sum / 10.0) / count * 10) / 10` evaluated exactly,
    /// so `7.3 / 2 = 3.65` gives `3.7` and `-7.3 / 2` gives `-3.7`.
    pub fn mean(&self) -> i64 {
        let sum = self.sum as i128;
        let count = self.count as i128;
        let abs_mean = (2 * sum.abs() + count) / (2 * count);
        (sum.signum() * abs_mean) as i64
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            Tenths(self.min as i64),
            Tenths(self.mean()),
            Tenths(self.max as i64)
        )
    }
}

/// Running aggregates keyed by station name.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Stations {
    inner: FxHashMap<Box<[u8]>, Station>,
}

impl Stations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Fold one reading into the table. The name is copied only the first
    /// time a station is seen.
    #[inline]
    pub fn observe(&mut self, name: &[u8], temp: Measurement) -> Result<()> {
        match self.inner.get_mut(name) {
            Some(station) => station.update(temp).ok_or_else(|| Error::overflow(name)),
            None => {
                self.inner.insert(name.into(), Station::new(temp));
                Ok(())
            }
        }
    }

    /// Fold another table into this one.
    pub fn merge(&mut self, other: Stations) -> Result<()> {
        for (name, station) in other.inner {
            match self.inner.entry(name) {
                Entry::Occupied(mut entry) => {
                    if entry.get_mut().merge(&station).is_none() {
                        return Err(Error::overflow(entry.key()));
                    }
                }
                Entry::Vacant(entry) => {
                    entry.insert(station);
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &[u8]) -> Option<&Station> {
        self.inner.get(name)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Stations ordered byte-wise by name.
    pub fn iter_sorted(&self) -> Vec<(&[u8], &Station)> {
        let mut stations = self
            .inner
            .iter()
            .map(|(name, station)| (&name[..], station))
            .collect::<Vec<_>>();
        stations.sort_unstable_by_key(|&(name, _)| name);
        stations
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Stations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, station)) in self.iter_sorted().into_iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", String::from_utf8_lossy(name), station)?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stations(lines: &[(&str, Measurement)]) -> Stations {
        let mut stations = Stations::default();
        for &(name, temp) in lines {
            stations.observe(name.as_bytes(), temp).unwrap();
        }
        stations
    }

    #[test]
    fn test_tenths() {
        assert_eq!(Tenths(0).to_string(), "0.0");
        assert_eq!(Tenths(5).to_string(), "0.5");
        assert_eq!(Tenths(-5).to_string(), "-0.5");
        assert_eq!(Tenths(123).to_string(), "12.3");
        assert_eq!(Tenths(-999).to_string(), "-99.9");
        assert_eq!(Tenths(12345).to_string(), "1234.5");
    }

    #[test]
    fn test_observe() {
        let stations = stations(&[("Hamburg", 123), ("Hamburg", -50), ("Berlin", 200)]);
        assert_eq!(stations.len(), 2);
        assert_eq!(
            stations.get(b"Hamburg"),
            Some(&Station {
                min: -50,
                max: 123,
                sum: 73,
                count: 2
            })
        );
        assert_eq!(stations.get(b"Berlin"), Some(&Station::new(200)));
        assert_eq!(stations.get(b"Paris"), None);
    }

    #[test]
    fn test_min_max_sum_count() {
        let temps = [-23, 150, 0, -999, 999, 42, 42, -1];
        let mut station = Station::new(temps[0]);
        for &temp in &temps[1..] {
            station.update(temp).unwrap();
        }
        assert_eq!(station.min(), -999);
        assert_eq!(station.max(), 999);
        assert_eq!(station.sum(), temps.iter().map(|&t| t as i64).sum::<i64>());
        assert_eq!(station.count(), temps.len() as u64);
    }

    #[test]
    fn test_mean_rounding() {
        fn mean(sum: i64, count: u64) -> i64 {
            Station {
                min: 0,
                max: 0,
                sum,
                count,
            }
            .mean()
        }
        // Halves round away from zero
        assert_eq!(mean(73, 2), 37);
        assert_eq!(mean(-73, 2), -37);
        assert_eq!(mean(5, 10), 1);
        assert_eq!(mean(-5, 10), -1);
        // Everything else rounds to nearest
        assert_eq!(mean(72, 2), 36);
        assert_eq!(mean(1, 3), 0);
        assert_eq!(mean(2, 3), 1);
        assert_eq!(mean(-2, 3), -1);
        assert_eq!(mean(-1, 4), 0);
        assert_eq!(mean(200, 1), 200);
        assert_eq!(mean(i64::MAX, 1), i64::MAX);
    }

    #[test]
    fn test_mean_is_pure() {
        let station = stations(&[("a", 11), ("a", 12), ("a", -40)])
            .get(b"a")
            .copied()
            .unwrap();
        assert_eq!(station.mean(), station.mean());
        assert_eq!(station.mean(), -6);
    }

    #[test]
    fn test_render() {
        let stations = stations(&[("Hamburg", 123), ("Hamburg", -50), ("Berlin", 200)]);
        assert_eq!(
            stations.render(),
            "{Berlin=20.0/20.0/20.0, Hamburg=-5.0/3.7/12.3}"
        );
        assert_eq!(stations.render(), stations.render());
    }

    #[test]
    fn test_render_negative_zero_mean() {
        let stations = stations(&[("a", -1), ("a", 0), ("a", 0), ("a", 0)]);
        assert_eq!(stations.render(), "{a=-0.1/0.0/0.0}");
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(Stations::default().render(), "{}");
    }

    #[test]
    fn test_render_byte_order() {
        let stations = stations(&[("b", 10), ("Ä", 10), ("B", 10), ("a", 10), ("Z", 10)]);
        let names = stations
            .iter_sorted()
            .into_iter()
            .map(|(name, _)| std::str::from_utf8(name).unwrap())
            .collect::<Vec<_>>();
        assert_eq!(names, ["B", "Z", "a", "b", "Ä"]);
    }

    #[test]
    fn test_overflow() {
        let mut stations = Stations::default();
        stations.observe(b"a", 1).unwrap();
        stations.inner.get_mut(&b"a"[..]).unwrap().sum = i64::MAX;
        let err = stations.observe(b"a", 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NumericOverflow);
        // Negative readings pull the sum back into range
        stations.observe(b"a", -1).unwrap();
    }

    #[test]
    fn test_merge() {
        let mut left = stations(&[("Hamburg", 123), ("Berlin", 200)]);
        let right = stations(&[("Hamburg", -50), ("Oslo", -31)]);
        left.merge(right).unwrap();
        assert_eq!(
            left,
            stations(&[
                ("Hamburg", 123),
                ("Berlin", 200),
                ("Hamburg", -50),
                ("Oslo", -31)
            ])
        );

        let mut overflowing = stations(&[("Oslo", 1)]);
        overflowing.inner.get_mut(&b"Oslo"[..]).unwrap().sum = i64::MIN;
        let err = left.merge(overflowing).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NumericOverflow);
    }
}
