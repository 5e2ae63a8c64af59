//! Deterministic synthetic database seeding.
//!
//! Builds a small but realistic table set (daily `price`, monthly
//! `fundamentals`) on a weekday calendar, with per-entity seeded random
//! walks. The same seed always produces the same database, so demos,
//! benches, and integration tests are reproducible. Entities may list late
//! to exercise partial-history behavior.

use crate::store::StoreError;
use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rusqlite::{params, Connection};

/// One synthetic entity.
#[derive(Debug, Clone)]
pub struct SeedEntity {
    pub id: String,
    pub start_price: f64,
    /// Number of leading trading days with no rows (a late listing).
    pub listed_after: usize,
}

/// What to generate.
#[derive(Debug, Clone)]
pub struct SeedSpec {
    pub start: NaiveDate,
    /// Trading days (weekdays) to generate.
    pub days: usize,
    pub entities: Vec<SeedEntity>,
    pub seed: u64,
}

impl SeedSpec {
    /// A small demo universe: three full-history entities and one that
    /// lists halfway through.
    pub fn demo(start: NaiveDate, days: usize, seed: u64) -> Self {
        let entity = |id: &str, start_price: f64, listed_after: usize| SeedEntity {
            id: id.to_string(),
            start_price,
            listed_after,
        };
        Self {
            start,
            days,
            entities: vec![
                entity("0050", 80.0, 0),
                entity("1101", 40.0, 0),
                entity("2330", 250.0, 0),
                entity("6666", 15.0, days / 2),
            ],
            seed,
        }
    }

    /// The weekday calendar the generator walks.
    pub fn trading_days(&self) -> Vec<NaiveDate> {
        let mut days = Vec::with_capacity(self.days);
        let mut date = self.start;
        while days.len() < self.days {
            if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                days.push(date);
            }
            date = date + chrono::Duration::days(1);
        }
        days
    }
}

/// Create and populate the `price` and `fundamentals` tables.
///
/// Existing tables of the same names are dropped first, so reseeding a
/// database is idempotent for a given spec.
pub fn seed_database(conn: &mut Connection, spec: &SeedSpec) -> Result<(), StoreError> {
    conn.execute_batch(
        r#"
        DROP TABLE IF EXISTS price;
        DROP TABLE IF EXISTS fundamentals;
        CREATE TABLE price (entity_id TEXT NOT NULL, date TEXT NOT NULL, close REAL, volume REAL);
        CREATE TABLE fundamentals (entity_id TEXT NOT NULL, date TEXT NOT NULL, revenue REAL);
        CREATE INDEX idx_price_date ON price (date);
        CREATE INDEX idx_fundamentals_date ON fundamentals (date);
        "#,
    )?;

    let days = spec.trading_days();
    let tx = conn.transaction()?;
    {
        let mut insert_price =
            tx.prepare("INSERT INTO price (entity_id, date, close, volume) VALUES (?1, ?2, ?3, ?4)")?;
        let mut insert_fundamental =
            tx.prepare("INSERT INTO fundamentals (entity_id, date, revenue) VALUES (?1, ?2, ?3)")?;

        for (index, entity) in spec.entities.iter().enumerate() {
            let mut rng = StdRng::seed_from_u64(spec.seed.wrapping_add(index as u64));
            let mut close = entity.start_price;
            let mut revenue = entity.start_price * 1_000.0;
            let mut last_month = 0;

            for date in days.iter().skip(entity.listed_after) {
                close *= 1.0 + rng.gen_range(-0.02..0.02);
                let volume = rng.gen_range(500.0..50_000.0_f64).round();
                insert_price.execute(params![
                    entity.id,
                    date.to_string(),
                    (close * 100.0).round() / 100.0,
                    volume
                ])?;

                // One fundamentals row on the first trading day of each month.
                if date.month() != last_month {
                    last_month = date.month();
                    revenue *= 1.0 + rng.gen_range(-0.1..0.1);
                    insert_fundamental.execute(params![
                        entity.id,
                        date.to_string(),
                        revenue.round()
                    ])?;
                }
            }
        }
    }
    tx.commit()?;
    Ok(())
}
