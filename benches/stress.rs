use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use ulid::Ulid;

use innkeep::engine::{Engine, NewBooking};
use innkeep::model::Settings;
use innkeep::notify::NotifyHub;

fn percentile(sorted: &[Duration], p: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let idx = ((sorted.len() as f64) * p / 100.0) as usize;
    sorted[idx.min(sorted.len() - 1)]
}

fn print_latency(label: &str, latencies: &mut [Duration]) {
    latencies.sort();
    let total: Duration = latencies.iter().sum();
    let avg = total / latencies.len() as u32;
    println!("  {label}:");
    println!(
        "    n={}, avg={:.2}ms, p50={:.2}ms, p95={:.2}ms, p99={:.2}ms, max={:.2}ms",
        latencies.len(),
        avg.as_secs_f64() * 1000.0,
        percentile(latencies, 50.0).as_secs_f64() * 1000.0,
        percentile(latencies, 95.0).as_secs_f64() * 1000.0,
        percentile(latencies, 99.0).as_secs_f64() * 1000.0,
        latencies.last().unwrap().as_secs_f64() * 1000.0,
    );
}

fn fresh_engine() -> Arc<Engine> {
    let path = std::env::temp_dir().join(format!("innkeep_bench_{}.wal", Ulid::new()));
    let settings = Settings {
        weekday_price: 10_000,
        weekend_price: 15_000,
        min_nights: 1,
    };
    Arc::new(Engine::new(path, settings, Arc::new(NotifyHub::new())).expect("engine start"))
}

fn night(base: NaiveDate, offset: i64) -> NewBooking {
    let check_in = base + chrono::Days::new(offset as u64);
    NewBooking {
        check_in,
        check_out: check_in + chrono::Days::new(1),
        guests: 2,
        name: format!("guest-{offset}"),
        phone: "+1000".into(),
        comment: None,
    }
}

async fn phase1_sequential(base: NaiveDate) {
    let engine = fresh_engine();
    let n = 2000;
    let mut latencies = Vec::with_capacity(n);
    let start = Instant::now();

    for i in 0..n {
        let t = Instant::now();
        engine.create_booking(night(base, i as i64)).await.unwrap();
        latencies.push(t.elapsed());
    }

    let elapsed = start.elapsed();
    let ops = n as f64 / elapsed.as_secs_f64();
    println!(
        "  {n} bookings in {:.2}s = {ops:.0} ops/sec",
        elapsed.as_secs_f64()
    );
    print_latency("write latency", &mut latencies);
}

async fn phase2_contended(base: NaiveDate) {
    // Every task races for the same 200 nights; exactly 200 bookings can win.
    let engine = fresh_engine();
    let n_tasks = 10;
    let nights = 200;

    let start = Instant::now();
    let won = Arc::new(AtomicUsize::new(0));
    let mut handles = Vec::new();

    for _ in 0..n_tasks {
        let engine = engine.clone();
        let won = won.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..nights {
                if engine.create_booking(night(base, i)).await.is_ok() {
                    won.fetch_add(1, Ordering::Relaxed);
                }
            }
        }));
    }
    for h in handles {
        h.await.unwrap();
    }

    let elapsed = start.elapsed();
    let total = n_tasks * nights;
    let won = won.load(Ordering::Relaxed);
    assert_eq!(won as i64, nights, "each night must be won exactly once");
    println!(
        "  {n_tasks} tasks x {nights} attempts = {total} total, {won} won, in {:.2}s",
        elapsed.as_secs_f64()
    );
}

async fn phase3_read_under_load(base: NaiveDate) {
    let engine = fresh_engine();

    // Pre-fill so availability scans something non-trivial.
    for i in 0..200 {
        engine.create_booking(night(base, i)).await.unwrap();
    }

    let stop = Arc::new(AtomicBool::new(false));
    let writer = {
        let engine = engine.clone();
        let stop = stop.clone();
        tokio::spawn(async move {
            let mut i = 200i64;
            while !stop.load(Ordering::Relaxed) {
                let _ = engine.create_booking(night(base, i)).await;
                i += 1;
            }
        })
    };

    let n_readers = 10;
    let reads_per_reader = 500;
    let mut handles = Vec::new();
    for _ in 0..n_readers {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            let from = Some(base);
            let to = Some(base + chrono::Days::new(365));
            let mut latencies = Vec::with_capacity(reads_per_reader);
            for _ in 0..reads_per_reader {
                let t = Instant::now();
                engine.availability(from, to).await.unwrap();
                latencies.push(t.elapsed());
            }
            latencies
        }));
    }

    let mut all_latencies = Vec::new();
    for h in handles {
        all_latencies.extend(h.await.unwrap());
    }
    stop.store(true, Ordering::Relaxed);
    let _ = writer.await;

    print_latency("availability query", &mut all_latencies);
}

#[tokio::main]
async fn main() {
    let base = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

    println!("=== innkeep stress benchmark ===\n");

    println!("[phase 1] sequential write throughput");
    phase1_sequential(base).await;

    println!("\n[phase 2] contended writes, one winner per night");
    phase2_contended(base).await;

    println!("\n[phase 3] read latency under write load");
    phase3_read_under_load(base).await;

    println!("\n=== benchmark complete ===");
}
