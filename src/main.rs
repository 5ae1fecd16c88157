//! Uplift Scoring Engine - Main Entry Point
//!
//! Consumes customer profiles from NATS, scores them with the treatment
//! and control models, and publishes persona analysis results.
//! Supports parallel profile processing for high throughput.

use anyhow::Result;
use futures::StreamExt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};
use uplift_engine::{
    config::AppConfig,
    consumer::ProfileConsumer,
    metrics::{MetricsReporter, ScoringMetrics},
    models::scoring::UpliftScorer,
    producer::ResultProducer,
    CustomerProfile, ScoringError,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("uplift_engine=info".parse()?),
        )
        .init();

    info!("Starting Uplift Scoring Engine");

    // Load configuration
    let config = AppConfig::load()?;
    info!("Configuration loaded successfully");
    info!(
        "Persona thresholds: persuadable>{:.2}, sure thing ctrl>{:.2}, do not disturb<{:.2}",
        config.personas.persuadable_min_uplift,
        config.personas.sure_thing_min_control,
        config.personas.do_not_disturb_max_uplift
    );

    // Initialize metrics
    let metrics = Arc::new(ScoringMetrics::new());

    // Load both model arms once; a missing or mismatched artifact is
    // fatal since there is no fallback scoring path
    let scorer = Arc::new(UpliftScorer::from_config(&config)?);
    info!(
        "Uplift scorer initialized ({} features, {} schema columns)",
        scorer.feature_count(),
        scorer.schema().len()
    );

    // Connect to NATS
    let client = async_nats::connect(&config.nats.url).await?;
    info!("Connected to NATS at {}", config.nats.url);

    // Initialize consumer and producer
    let consumer = ProfileConsumer::new(client.clone(), &config.nats.profile_subject);
    let producer = Arc::new(ResultProducer::new(client.clone(), &config.nats.result_subject));

    // Parallel processing configuration
    let num_workers = config.pipeline.workers;
    info!(
        "Starting profile processing loop with {} parallel workers",
        num_workers
    );
    info!("Listening on subject: {}", config.nats.profile_subject);
    info!("Publishing results to: {}", config.nats.result_subject);

    // Semaphore to limit concurrent processing
    let semaphore = Arc::new(Semaphore::new(num_workers));
    let processed_count = Arc::new(AtomicU64::new(0));

    // Start metrics reporter (prints summary every 30 seconds)
    let metrics_clone = metrics.clone();
    tokio::spawn(async move {
        let reporter = MetricsReporter::new(metrics_clone, 30);
        reporter.start().await;
    });

    // Process profiles in parallel
    let mut subscription = consumer.subscribe().await?;

    while let Some(message) = subscription.next().await {
        // Acquire permit (limits concurrent tasks)
        let permit = semaphore.clone().acquire_owned().await.unwrap();

        // Clone shared resources for the spawned task
        let scorer = scorer.clone();
        let producer = producer.clone();
        let metrics = metrics.clone();
        let processed_count = processed_count.clone();

        // Spawn task to process this profile
        tokio::spawn(async move {
            let start_time = Instant::now();

            match serde_json::from_slice::<CustomerProfile>(&message.payload) {
                Ok(profile) => {
                    let profile_id = profile.profile_id.clone();

                    match scorer.analyze(&profile) {
                        Ok(result) => {
                            let processing_time = start_time.elapsed();

                            metrics.record_analysis(
                                processing_time,
                                result.uplift_score,
                                result.persona.label(),
                            );

                            if let Err(e) = producer.publish(&result).await {
                                error!(
                                    profile_id = %profile_id,
                                    error = %e,
                                    "Failed to publish analysis result"
                                );
                            } else {
                                debug!(
                                    profile_id = %profile_id,
                                    uplift_score = result.uplift_score,
                                    persona = result.persona.label(),
                                    processing_time_us = processing_time.as_micros(),
                                    "Analysis result published"
                                );
                            }

                            let count = processed_count.fetch_add(1, Ordering::Relaxed) + 1;

                            // Log progress every 100 profiles
                            if count % 100 == 0 {
                                let throughput = metrics.get_throughput();
                                let processing_stats = metrics.get_processing_stats();
                                info!(
                                    processed = count,
                                    throughput = format!("{:.1} profiles/s", throughput),
                                    avg_latency_us = processing_stats.mean_us,
                                    "Processing milestone"
                                );
                            }
                        }
                        Err(e @ ScoringError::FeatureAlignment(_)) => {
                            // Bad profile; the engine keeps serving
                            metrics.record_failure();
                            warn!(
                                profile_id = %profile_id,
                                error = %e,
                                "Profile rejected"
                            );
                        }
                        Err(e) => {
                            metrics.record_failure();
                            error!(
                                profile_id = %profile_id,
                                error = %e,
                                "Scoring failed"
                            );
                        }
                    }
                }
                Err(e) => {
                    metrics.record_failure();
                    warn!(error = %e, "Failed to deserialize profile");
                }
            }

            // Release permit when done
            drop(permit);
        });
    }

    // Print final summary
    info!("Engine shutting down...");
    metrics.print_summary();

    Ok(())
}
