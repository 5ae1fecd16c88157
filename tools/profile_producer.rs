//! Test Profile Producer
//!
//! Generates and publishes random customer profiles to NATS for
//! pipeline testing.

use chrono::Utc;
use rand::Rng;
use std::time::Duration;
use tracing::{info, warn};
use uplift_engine::config::EncodingConfig;
use uplift_engine::CustomerProfile;

/// Profile generator for testing
struct ProfileGenerator {
    rng: rand::rngs::ThreadRng,
    encoding: EncodingConfig,
    profile_counter: u64,
}

impl ProfileGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
            encoding: EncodingConfig::default(),
            profile_counter: 0,
        }
    }

    /// Generate a random engaged customer (recent visit, browsing a lot)
    fn generate_engaged(&mut self) -> CustomerProfile {
        self.profile_counter += 1;

        CustomerProfile {
            profile_id: format!("cust_{:012}", self.profile_counter),
            age: self.rng.gen_range(18..=70),
            recency: self.rng.gen_range(1..30),
            total_spend: self.rng.gen_range(100.0..1000.0),
            pages_viewed: self.rng.gen_range(20..=100),
            is_new_customer: self.rng.gen_bool(0.2),
            platform: self.random_platform(),
            state: self.random_state(),
            timestamp: Utc::now(),
        }
    }

    /// Generate a random dormant customer (long gone, low engagement)
    fn generate_dormant(&mut self) -> CustomerProfile {
        self.profile_counter += 1;

        CustomerProfile {
            profile_id: format!("cust_{:012}", self.profile_counter),
            age: self.rng.gen_range(18..=70),
            recency: self.rng.gen_range(180..=365),
            total_spend: self.rng.gen_range(0.0..150.0),
            pages_viewed: self.rng.gen_range(1..10),
            is_new_customer: self.rng.gen_bool(0.5),
            platform: self.random_platform(),
            state: self.random_state(),
            timestamp: Utc::now(),
        }
    }

    fn random_state(&mut self) -> String {
        let idx = self.rng.gen_range(0..self.encoding.states.len());
        self.encoding.states[idx].clone()
    }

    fn random_platform(&mut self) -> String {
        let idx = self.rng.gen_range(0..self.encoding.platforms.len());
        self.encoding.platforms[idx].clone()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("profile_producer=info".parse()?),
        )
        .init();

    info!("Starting Test Profile Producer");

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let nats_url = args
        .get(1)
        .map(|s| s.as_str())
        .unwrap_or("nats://localhost:4222");
    let subject = args.get(2).map(|s| s.as_str()).unwrap_or("uplift.profiles");
    let count: u64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(100);
    let dormant_rate: f64 = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(0.3);
    let delay_ms: u64 = args.get(5).and_then(|s| s.parse().ok()).unwrap_or(100);

    info!(
        nats_url = %nats_url,
        subject = %subject,
        count = count,
        dormant_rate = dormant_rate,
        delay_ms = delay_ms,
        "Configuration loaded"
    );

    // Connect to NATS
    let client = match async_nats::connect(nats_url).await {
        Ok(c) => {
            info!("Connected to NATS");
            c
        }
        Err(e) => {
            warn!(error = %e, "Failed to connect to NATS. Running in dry-run mode.");
            return run_dry_mode(count, dormant_rate, delay_ms).await;
        }
    };

    // Generate and publish profiles
    let mut generator = ProfileGenerator::new();
    let mut rng = rand::thread_rng();

    info!("Starting to publish {} profiles...", count);

    let mut engaged_count = 0;
    let mut dormant_count = 0;

    for i in 0..count {
        let profile = if rng.gen_bool(dormant_rate) {
            dormant_count += 1;
            generator.generate_dormant()
        } else {
            engaged_count += 1;
            generator.generate_engaged()
        };

        let payload = serde_json::to_vec(&profile)?;

        client.publish(subject.to_string(), payload.into()).await?;

        if (i + 1) % 10 == 0 {
            info!(
                "Published {}/{} profiles ({} engaged, {} dormant)",
                i + 1,
                count,
                engaged_count,
                dormant_count
            );
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    info!(
        "Completed! Published {} profiles ({} engaged, {} dormant)",
        count, engaged_count, dormant_count
    );

    Ok(())
}

async fn run_dry_mode(count: u64, dormant_rate: f64, delay_ms: u64) -> anyhow::Result<()> {
    info!("Running in dry-run mode (no NATS connection)");

    let mut generator = ProfileGenerator::new();
    let mut rng = rand::thread_rng();

    for i in 0..count {
        let profile = if rng.gen_bool(dormant_rate) {
            generator.generate_dormant()
        } else {
            generator.generate_engaged()
        };

        let json = serde_json::to_string_pretty(&profile)?;

        if (i + 1) % 10 == 0 || i == 0 {
            info!("Sample profile {}:\n{}", i + 1, json);
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    Ok(())
}
