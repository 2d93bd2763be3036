// Aggregator - Buckets runtime and correlation series by granularity
use crate::domain::granularity::{Granularity, NATIVE_INTERVAL_MINUTES};
use crate::domain::series::{CorrelationSample, RuntimeBucket, RuntimeSample, TemperatureBucket};
use chrono::{DateTime, TimeZone, Utc};
use std::collections::{BTreeMap, HashMap};

/// Sum cooling and heating minutes per bucket. At the native interval every
/// sample passes through as its own bucket, in input order.
pub fn aggregate_runtime<Tz: TimeZone>(
    samples: &[RuntimeSample],
    granularity: Granularity,
    tz: &Tz,
) -> Vec<RuntimeBucket> {
    if granularity.is_pass_through() {
        warn_on_irregular_interval(samples.iter().map(|s| s.time));
        return samples
            .iter()
            .map(|s| RuntimeBucket {
                bucket_start: s.time,
                cooling_minutes: s.cooling_minutes,
                heating_minutes: s.heating_minutes,
                sample_count: 1,
            })
            .collect();
    }

    let mut buckets: BTreeMap<DateTime<Utc>, RuntimeBucket> = BTreeMap::new();
    for sample in samples {
        let start = granularity.bucket_start(sample.time, tz);
        let bucket = buckets.entry(start).or_insert_with(|| RuntimeBucket {
            bucket_start: start,
            cooling_minutes: 0.0,
            heating_minutes: 0.0,
            sample_count: 0,
        });
        bucket.cooling_minutes += sample.cooling_minutes;
        bucket.heating_minutes += sample.heating_minutes;
        bucket.sample_count += 1;
    }

    buckets.into_values().collect()
}

/// Like [`aggregate_runtime`], additionally averaging outdoor temperature.
pub fn aggregate_temperature<Tz: TimeZone>(
    samples: &[CorrelationSample],
    granularity: Granularity,
    tz: &Tz,
) -> Vec<TemperatureBucket> {
    if granularity.is_pass_through() {
        warn_on_irregular_interval(samples.iter().map(|s| s.time));
        return samples
            .iter()
            .map(|s| TemperatureBucket {
                bucket_start: s.time,
                avg_outdoor_temp: s.outdoor_temp,
                cooling_minutes: s.cooling_minutes,
                heating_minutes: s.heating_minutes,
                sample_count: 1,
            })
            .collect();
    }

    // (outdoor sum, cooling, heating, count)
    let mut sums: BTreeMap<DateTime<Utc>, (f64, f64, f64, usize)> = BTreeMap::new();
    for sample in samples {
        let start = granularity.bucket_start(sample.time, tz);
        let entry = sums.entry(start).or_insert((0.0, 0.0, 0.0, 0));
        entry.0 += sample.outdoor_temp;
        entry.1 += sample.cooling_minutes;
        entry.2 += sample.heating_minutes;
        entry.3 += 1;
    }

    sums.into_iter()
        .map(|(start, (outdoor, cooling, heating, count))| TemperatureBucket {
            bucket_start: start,
            avg_outdoor_temp: outdoor / count as f64,
            cooling_minutes: cooling,
            heating_minutes: heating,
            sample_count: count,
        })
        .collect()
}

/// Most common spacing between consecutive samples, in whole minutes.
pub fn dominant_interval_minutes<I>(times: I) -> Option<i64>
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let mut counts: HashMap<i64, usize> = HashMap::new();
    let mut previous: Option<DateTime<Utc>> = None;
    for time in times {
        if let Some(prev) = previous {
            let delta = (time - prev).num_minutes();
            if delta > 0 {
                *counts.entry(delta).or_insert(0) += 1;
            }
        }
        previous = Some(time);
    }

    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
        .map(|(delta, _)| delta)
}

/// The native view assumes 15 minute samples; data is still shown unchanged
/// when that does not hold.
fn warn_on_irregular_interval<I>(times: I)
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    if let Some(interval) = dominant_interval_minutes(times) {
        if interval != NATIVE_INTERVAL_MINUTES {
            tracing::warn!(
                "Samples are {} minutes apart, native view assumes {} minutes",
                interval,
                NATIVE_INTERVAL_MINUTES
            );
        }
    }
}
