//! Performance benchmarks for the per-line hot path

use shared::{classify, extract_log_line, update, StatTable};
use std::time::Instant;

const KILL: &str = r#"L 10/02/2021 - 23:31:56: "jel<62><[U:1:479446967]><Blue>" killed "KEYREAL<65><[U:1:861133286]><Red>" with "sniperrifle" (attacker_position "-1234 567 89") (victim_position "-1100 600 80")"#;
const DAMAGE: &str = r#"L 10/02/2021 - 23:31:50: "jel<62><[U:1:479446967]><Blue>" triggered "damage" against "KEYREAL<65><[U:1:861133286]><Red>" (damage "150") (weapon "sniperrifle")"#;
const NOISE: &str = r#"L 10/02/2021 - 23:31:57: "KEYREAL<65><[U:1:861133286]><Red>" say "gg""#;

/// Benchmarks the stats extractor over a mixed line stream
#[test]
fn benchmark_stats_extractor() {
    let lines = [KILL, DAMAGE, NOISE];
    let iterations = 30_000;
    let mut table = StatTable::new();

    let start = Instant::now();
    for i in 0..iterations {
        table = update(lines[i % lines.len()], table);
    }
    let duration = start.elapsed();

    println!(
        "Stats extractor: {} lines in {:?} ({:.2} μs/line)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert_eq!(table.len(), 2);
    assert!(duration.as_millis() < 5000);
}

/// Benchmarks lifecycle marker classification
#[test]
fn benchmark_classifier() {
    let lines = [
        KILL,
        NOISE,
        r#"L 10/02/2021 - 23:30:00: World triggered "Game_Over" reason "Reached Win Limit""#,
        r#"L 10/02/2021 - 23:10:00: Team "Red" current score "1" with "6" players"#,
    ];
    let iterations = 40_000;

    let start = Instant::now();
    let mut markers = 0;
    for i in 0..iterations {
        if classify(lines[i % lines.len()]).is_some() {
            markers += 1;
        }
    }
    let duration = start.elapsed();

    println!(
        "Classifier: {} lines in {:?} ({:.2} μs/line)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert_eq!(markers, iterations / 2);
    assert!(duration.as_millis() < 5000);
}

/// Benchmarks envelope extraction from raw datagrams
#[test]
fn benchmark_envelope_extraction() {
    let datagram = format!("\u{fffd}\u{fffd}\u{fffd}\u{fffd}R{KILL}\n");
    let iterations = 20_000;

    let start = Instant::now();
    for _ in 0..iterations {
        assert!(extract_log_line(&datagram).starts_with("L 10/02/2021"));
    }
    let duration = start.elapsed();

    println!(
        "Envelope extraction: {} datagrams in {:?} ({:.2} μs/datagram)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert!(duration.as_millis() < 5000);
}
