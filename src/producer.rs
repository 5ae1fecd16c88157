//! NATS message producer for analysis results

use crate::types::analysis::AnalysisResult;
use anyhow::Result;
use async_nats::Client;
use tracing::debug;

/// Producer for publishing analysis results to NATS
#[derive(Clone)]
pub struct ResultProducer {
    client: Client,
    subject: String,
}

impl ResultProducer {
    /// Create a new result producer
    pub fn new(client: Client, subject: &str) -> Self {
        Self {
            client,
            subject: subject.to_string(),
        }
    }

    /// Publish an analysis result
    pub async fn publish(&self, result: &AnalysisResult) -> Result<()> {
        let payload = serde_json::to_vec(result)?;

        self.client
            .publish(self.subject.clone(), payload.into())
            .await?;

        debug!(
            analysis_id = %result.analysis_id,
            profile_id = %result.profile_id,
            persona = result.persona.label(),
            uplift_score = result.uplift_score,
            "Published analysis result"
        );

        Ok(())
    }

    /// Get the subject name
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

#[cfg(test)]
mod tests {
    // Integration tests would require a running NATS server
}
