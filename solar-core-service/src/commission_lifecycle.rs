use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use solar_core_api::domain::payment_proof::PaymentProofFile;
use solar_core_api::domain::status::CommissionStatus;
use solar_core_api::error::{ApiError, ApiResult};
use solar_core_api::service::{PaymentProofStorage, StoredProof};
use solar_core_db::models::commission::{CommissionModel, PaymentProofModel};
use solar_core_db::repository::{CommissionRepository, Repositories};

use crate::fields::bounded;

/// Owns every commission transition after generation.
#[derive(Clone)]
pub struct CommissionLifecycle {
    commissions: Arc<dyn CommissionRepository>,
    proofs: Arc<dyn PaymentProofStorage>,
}

impl CommissionLifecycle {
    pub fn new(repositories: &Repositories, proofs: Arc<dyn PaymentProofStorage>) -> Self {
        Self {
            commissions: repositories.commissions.clone(),
            proofs,
        }
    }

    pub async fn mark_as_paid(&self, commission_id: Uuid) -> ApiResult<CommissionModel> {
        let mut commission = self.commissions.load(commission_id).await?;
        ensure_transition(&commission, CommissionStatus::Paid)?;

        let now = Utc::now();
        commission.status = CommissionStatus::Paid;
        commission.paid_at = Some(now);
        commission.updated_at = now;

        let paid = self.save(commission).await?;
        info!(commission_id = %commission_id, "commission marked as paid");
        Ok(paid)
    }

    /// Stores the proof and marks the commission PAID if it is not already.
    /// A replaced proof file is removed from storage afterwards.
    pub async fn attach_payment_proof(
        &self,
        commission_id: Uuid,
        file: PaymentProofFile,
    ) -> ApiResult<CommissionModel> {
        let file_type = file.validate_proof()?;
        let mut commission = self.commissions.load(commission_id).await?;
        if commission.status != CommissionStatus::Paid {
            ensure_transition(&commission, CommissionStatus::Paid)?;
        }

        let stored = self.proofs.upload(commission_id, &file).await?;
        let proof = match proof_model(&stored) {
            Ok(proof) => proof,
            Err(e) => {
                self.discard(&stored.url).await;
                return Err(e);
            }
        };

        let now = Utc::now();
        let replaced = commission.payment_proof.replace(proof);
        if commission.status != CommissionStatus::Paid {
            commission.status = CommissionStatus::Paid;
            commission.paid_at = Some(now);
        }
        commission.updated_at = now;

        let updated = match self.save(commission).await {
            Ok(updated) => updated,
            Err(e) => {
                self.discard(&stored.url).await;
                return Err(e);
            }
        };
        if let Some(previous) = replaced {
            self.discard(&previous.url).await;
        }

        info!(
            commission_id = %commission_id,
            file_type = file_type.mime_type(),
            size_bytes = file.size_bytes,
            "payment proof attached"
        );
        Ok(updated)
    }

    /// Clears the proof metadata. The commission stays PAID.
    pub async fn delete_payment_proof(&self, commission_id: Uuid) -> ApiResult<CommissionModel> {
        let mut commission = self.commissions.load(commission_id).await?;
        let proof = commission.payment_proof.take().ok_or_else(|| {
            ApiError::InvalidState(format!("Commission {commission_id} has no payment proof"))
        })?;
        commission.updated_at = Utc::now();

        let updated = self.save(commission).await?;
        self.discard(&proof.url).await;

        info!(commission_id = %commission_id, "payment proof deleted");
        Ok(updated)
    }

    /// PENDING or CALCULATED to CANCELLED. Frees the consumer for a new commission.
    pub async fn cancel(&self, commission_id: Uuid) -> ApiResult<CommissionModel> {
        let mut commission = self.commissions.load(commission_id).await?;
        ensure_transition(&commission, CommissionStatus::Cancelled)?;
        commission.status = CommissionStatus::Cancelled;
        commission.updated_at = Utc::now();

        let cancelled = self.save(commission).await?;
        info!(commission_id = %commission_id, "commission cancelled");
        Ok(cancelled)
    }

    async fn save(&self, commission: CommissionModel) -> ApiResult<CommissionModel> {
        self.commissions
            .update_batch(vec![commission])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::InternalError("Commission was not updated".to_string()))
    }

    async fn discard(&self, url: &str) {
        if let Err(e) = self.proofs.delete(url).await {
            warn!(url = url, error = %e, "failed to delete payment proof file");
        }
    }
}

fn ensure_transition(commission: &CommissionModel, next: CommissionStatus) -> ApiResult<()> {
    if commission.status.can_transition_to(next) {
        Ok(())
    } else {
        Err(ApiError::InvalidState(format!(
            "Commission {} is {} and cannot become {}",
            commission.id,
            commission.status.as_str(),
            next.as_str()
        )))
    }
}

fn proof_model(stored: &StoredProof) -> ApiResult<PaymentProofModel> {
    Ok(PaymentProofModel {
        url: bounded("payment_proof_url", &stored.url)?,
        file_name: bounded("payment_proof_file_name", &stored.file_name)?,
        uploaded_at: stored.uploaded_at,
    })
}

#[cfg(test)]
mod tests {
    use solar_core_api::domain::payment_proof::MAX_PAYMENT_PROOF_BYTES;

    use super::*;
    use crate::test_support::{Fixture, TestResult};

    async fn calculated_commission(fx: &Fixture) -> Result<CommissionModel, Box<dyn std::error::Error + Send + Sync>> {
        fx.set_price("0.90").await?;
        let consumer = fx.available_consumer("500", Some(Uuid::new_v4())).await?;
        Ok(fx.services.commissions.generate_for_consumer(consumer.id).await?.into_result()?)
    }

    fn pdf(size: usize) -> PaymentProofFile {
        PaymentProofFile::new("comprovante.pdf", "application/pdf", vec![0u8; size])
    }

    #[tokio::test]
    async fn test_mark_as_paid() -> TestResult {
        let fx = Fixture::new();
        let commission = calculated_commission(&fx).await?;

        let paid = fx.services.lifecycle.mark_as_paid(commission.id).await?;
        assert_eq!(paid.status, CommissionStatus::Paid);
        assert!(paid.paid_at.is_some());
        assert_eq!(paid.commission_value, commission.commission_value);

        let again = fx.services.lifecycle.mark_as_paid(commission.id).await;
        assert!(matches!(again, Err(ApiError::InvalidState(_))));
        let cancel = fx.services.lifecycle.cancel(commission.id).await;
        assert!(matches!(cancel, Err(ApiError::InvalidState(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_attach_proof_marks_paid() -> TestResult {
        let fx = Fixture::new();
        let commission = calculated_commission(&fx).await?;

        let updated = fx.services.lifecycle.attach_payment_proof(commission.id, pdf(1024)).await?;
        assert_eq!(updated.status, CommissionStatus::Paid);
        assert!(updated.paid_at.is_some());
        let proof = updated.payment_proof.as_ref().ok_or("proof missing")?;
        assert_eq!(proof.file_name.as_str(), "comprovante.pdf");
        assert_eq!(fx.proofs.uploaded.lock().len(), 1);

        // Replacing the proof keeps the original payment date and drops the old file.
        let paid_at = updated.paid_at;
        let replaced = fx.services.lifecycle.attach_payment_proof(commission.id, pdf(2048)).await?;
        assert_eq!(replaced.paid_at, paid_at);
        assert_eq!(fx.proofs.deleted.lock().as_slice(), &[proof.url.to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn test_attach_proof_rejects_bad_files() -> TestResult {
        let fx = Fixture::new();
        let commission = calculated_commission(&fx).await?;

        let oversized = pdf(MAX_PAYMENT_PROOF_BYTES as usize + 1);
        let result = fx.services.lifecycle.attach_payment_proof(commission.id, oversized).await;
        assert!(matches!(result, Err(ApiError::ValidationError(_))));

        let text = PaymentProofFile::new("notes.txt", "text/plain", b"paid".to_vec());
        let result = fx.services.lifecycle.attach_payment_proof(commission.id, text).await;
        assert!(matches!(result, Err(ApiError::ValidationError(_))));

        assert!(fx.proofs.uploaded.lock().is_empty());
        let unchanged = fx.repositories.commissions.load(commission.id).await?;
        assert_eq!(unchanged.status, CommissionStatus::Calculated);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_proof_keeps_paid() -> TestResult {
        let fx = Fixture::new();
        let commission = calculated_commission(&fx).await?;
        fx.services.lifecycle.attach_payment_proof(commission.id, pdf(512)).await?;

        let cleared = fx.services.lifecycle.delete_payment_proof(commission.id).await?;
        assert_eq!(cleared.status, CommissionStatus::Paid);
        assert!(cleared.payment_proof.is_none());
        assert_eq!(fx.proofs.deleted.lock().len(), 1);

        let again = fx.services.lifecycle.delete_payment_proof(commission.id).await;
        assert!(matches!(again, Err(ApiError::InvalidState(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_cancelled_commission_accepts_no_proof() -> TestResult {
        let fx = Fixture::new();
        let commission = calculated_commission(&fx).await?;
        let cancelled = fx.services.lifecycle.cancel(commission.id).await?;
        assert_eq!(cancelled.status, CommissionStatus::Cancelled);

        let result = fx.services.lifecycle.attach_payment_proof(commission.id, pdf(512)).await;
        assert!(matches!(result, Err(ApiError::InvalidState(_))));
        assert!(fx.proofs.uploaded.lock().is_empty());
        Ok(())
    }
}
