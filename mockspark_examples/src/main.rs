// Copyright 2025 the MockSpark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Example binary for `mockspark_pipeline`.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use mockspark_pipeline::{JoinKind, PipelineError, Row, Session, Value};
use tracing_subscriber::filter::LevelFilter;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

fn main() -> Result<(), PipelineError> {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::DEBUG)
        .init();

    let spark = Session::new();
    let now = SystemTime::now();
    let raw_data = vec![
        Row::from([
            ("id", Value::Int(1)),
            ("name", "Alice".into()),
            ("age", 25.into()),
            ("created_at", timestamp(now)),
        ]),
        Row::from([
            ("id", Value::Int(2)),
            ("name", "Bob".into()),
            ("age", 30.into()),
            ("created_at", timestamp(now - DAY)),
        ]),
        Row::from([
            ("id", Value::Int(3)),
            ("name", "Charlie".into()),
            ("age", 35.into()),
            ("created_at", timestamp(now - 2 * DAY)),
        ]),
    ];

    let mut df = spark.create_data_frame(raw_data)?;
    df.filter(|df| df.column("age")?.gt(28))
        .with_column("age_plus_one", |df| df.column("age")?.add(1))
        .select(["id", "name", "age_plus_one"]);
    print_rows("filter + withColumn + select", &df.collect()?);

    let teams = spark.create_data_frame(vec![
        Row::from([("id", Value::Int(2)), ("team", "red".into())]),
        Row::from([("id", Value::Int(3)), ("team", "blue".into())]),
    ])?;
    df.join(&teams, "id", JoinKind::Left);
    print_rows("... + join", &df.collect()?);

    df.select(["nonexistent"]);
    match df.collect() {
        Ok(rows) => print_rows("unexpected", &rows),
        Err(err) => println!("lazy error surfaced at collect: {err}"),
    }
    tracing::info!(pending = df.operations().len(), "done");
    Ok(())
}

fn timestamp(at: SystemTime) -> Value {
    let micros = at
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_micros()).unwrap_or(i64::MAX));
    Value::Timestamp(micros)
}

fn print_rows(label: &str, rows: &[Row]) {
    println!("{label}: {} rows", rows.len());
    for row in rows {
        println!("  {row}");
    }
}
