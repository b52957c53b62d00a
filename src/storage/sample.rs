use chrono::{DateTime, Duration, Utc};
use rand::{seq::SliceRandom, thread_rng, Rng};

use super::entities::{generate_entry_id, CategoryType, Entry, EntryValue};

/// How far back generated timestamps may reach.
const SAMPLE_DAYS: i64 = 30;

/// Random entries spread over the last month. Used to try out the charts without logging data by
/// hand.
pub fn sample_entries(count: usize, now: DateTime<Utc>) -> Vec<Entry> {
    let mut rng = thread_rng();
    let span = Duration::days(SAMPLE_DAYS).num_milliseconds();

    (0..count)
        .map(|_| {
            let category = CategoryType::ALL[rng.gen_range(0..CategoryType::ALL.len())];
            let subtype = category
                .subtypes()
                .choose(&mut rng)
                .map(|v| v.to_string());
            let timestamp = now - Duration::milliseconds(rng.gen_range(0..span));

            Entry {
                id: generate_entry_id(),
                category,
                subtype,
                value: Some(EntryValue::Number(rng.gen_range(0..100) as f64)),
                notes: Some("Sample entry".into()),
                timestamp,
                created_at: now,
            }
        })
        .collect()
}
