//! SweepBench Example Suite
//!
//! Soaks a toy in-memory key/value store with inserts and full replacements
//! across connection counts and read-back modes, counting operations in a
//! prometheus registry.
//!
//! Run with:
//!   cargo run --example store                    # Run every case, 1 second per loop
//!   cargo run --example store -- -t 5            # 5 seconds per loop
//!   cargo run --example store -- insert          # Only cases matching "insert"
//!   cargo run --example store -- list            # Show the plan
//!   cargo run --example store -- --no-progress   # Plain lines, no progress bar
//!   cargo run --example store -- --metrics-port 9101  # Scrape /metrics while it runs

use rand::Rng;
use sweepbench::prelude::*;

const DATA_SIZES: [usize; 4] = [10 * 1024, 100 * 1024, 500 * 1024, 1024 * 1024];

#[derive(Default)]
struct Store {
    co_count: u32,
    test_read: bool,
    rows: Vec<Vec<u8>>,
    cursor: usize,
    connected: bool,
    metrics: CounterRegistry,
}

impl Store {
    fn new(metrics: CounterRegistry) -> Self {
        Self {
            metrics,
            ..Self::default()
        }
    }

    fn payload(size: usize) -> Vec<u8> {
        let mut data = vec![0u8; size];
        rand::thread_rng().fill(&mut data[..]);
        data
    }

    fn truncate(&mut self) {
        self.rows.clear();
        self.cursor = 0;
    }

    /// Write one row into the next of `co_count` slots, reading it back if enabled
    async fn insert(&mut self, size: usize) -> anyhow::Result<()> {
        anyhow::ensure!(self.connected, "store is not connected");
        let slots = self.co_count.max(1) as usize;
        let row = Self::payload(size);
        if self.rows.len() < slots {
            self.rows.push(row);
        } else {
            self.rows[self.cursor % slots] = row;
        }
        self.cursor += 1;
        self.metrics.counter("insert_write_total")?.inc();

        if self.test_read {
            tokio::task::yield_now().await;
            let checksum: u64 = self.rows.iter().flatten().map(|b| *b as u64).sum();
            std::hint::black_box(checksum);
            self.metrics.counter("insert_read_total")?.inc();
        }
        Ok(())
    }

    /// Rebuild every slot from scratch
    async fn replace(&mut self, size: usize) -> anyhow::Result<()> {
        anyhow::ensure!(self.connected, "store is not connected");
        self.truncate();
        for _ in 0..self.co_count.min(16) {
            self.rows.push(Self::payload(size));
            tokio::task::yield_now().await;
        }
        self.metrics.counter("replace_total")?.inc();
        Ok(())
    }
}

fn sizes(spec: CaseSpec) -> CaseSpec {
    DATA_SIZES.iter().fold(spec, |spec, &size| spec.arg(size))
}

fn main() -> anyhow::Result<()> {
    let metrics = CounterRegistry::new();

    let suite = Suite::builder(Store::new(metrics.clone()))
        .param("CoCount", [10u32, 100, 1000, 5000], |s: &mut Store, v| {
            s.co_count = v
        })
        .param("TestRead", [false, true], |s: &mut Store, v| s.test_read = v)
        .global_setup("connect", |s| {
            s.connected = true;
            Ok(())
        })
        .global_cleanup("disconnect", |s| {
            s.truncate();
            s.connected = false;
            Ok(())
        })
        .hook("insert_before", Signature::of([ValueKind::Int]), |s: &mut Store, _: &Args| {
            s.truncate();
            Ok(())
        })
        .hook("insert_after", Signature::of([ValueKind::Int]), |s: &mut Store, _: &Args| {
            s.truncate();
            Ok(())
        })
        .case_async(
            sizes(CaseSpec::new("insert"))
                .description("Insert at different payload sizes")
                .setup("insert_before")
                .cleanup("insert_after"),
            |s, args| {
                async move {
                    let size: usize = args.get(0)?;
                    s.insert(size).await
                }
                .boxed_local()
            },
        )
        .case_async(
            sizes(CaseSpec::new("replace")).description("Full replacement at different payload sizes"),
            |s, args| {
                async move {
                    let size: usize = args.get(0)?;
                    s.replace(size).await
                }
                .boxed_local()
            },
        )
        .build()?;

    sweepbench::run_with_metrics(suite, &metrics)?;

    print!("{}", metrics.encode_text()?);
    Ok(())
}
