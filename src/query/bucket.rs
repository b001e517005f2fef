//! Period bucketing
//!
//! Groups records into day, week or month slots and keeps the latest record
//! of each slot as its representative.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use super::window::{month_start, week_end};
use crate::series::{Period, Record};

/// A period-aligned slot and the record that represents it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    /// Day for `Day`, closing Sunday for `Week`, first of month for `Month`
    pub key: NaiveDate,
    pub record: Record,
}

impl Bucket {
    pub fn occupied_km2(&self) -> f64 {
        self.record.occupied_km2()
    }
}

impl Period {
    /// Grouping key of the slot containing `date`
    pub fn bucket_key(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Period::Day => date,
            Period::Week => week_end(date),
            Period::Month => month_start(date),
        }
    }
}

/// Group records into buckets, sorted ascending by representative timestamp.
pub fn bucketize<'a>(records: impl IntoIterator<Item = &'a Record>, period: Period) -> Vec<Bucket> {
    let mut slots: BTreeMap<NaiveDate, &Record> = BTreeMap::new();

    for record in records {
        let key = period.bucket_key(record.day());
        match slots.get(&key) {
            Some(existing) if existing.timestamp > record.timestamp => {}
            _ => {
                slots.insert(key, record);
            }
        }
    }

    let mut buckets: Vec<Bucket> = slots
        .into_iter()
        .map(|(key, record)| Bucket {
            key,
            record: record.clone(),
        })
        .collect();
    buckets.sort_by_key(|b| b.record.timestamp);
    buckets
}
