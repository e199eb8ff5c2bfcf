use std::sync::Arc;
use std::time::Instant;

use templated_log::env::env_or;
use templated_log::sink::NoopSink;
use templated_log::{args, fields, Logger};

fn main() {
    let n: u64 = env_or("TEMPLATE_LOAD_ITERATIONS", "100000")
        .parse()
        .unwrap_or(100_000);

    let log = Logger::new(Arc::new(NoopSink)).child(fields! { "service" => "load" });
    let start = Instant::now();

    for i in 0..n {
        log.info(&args!["{service} iteration {iteration} of {total}", i, n]);
    }

    let elapsed = start.elapsed();
    println!(
        "templated {} calls in {:?} (~{:.0} calls/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
}
