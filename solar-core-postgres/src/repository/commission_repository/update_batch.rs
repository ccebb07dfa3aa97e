use async_trait::async_trait;
use solar_core_db::models::commission::CommissionModel;
use solar_core_db::repository::error::RepositoryResult;
use solar_core_db::repository::update_batch::UpdateBatch;
use crate::utils::stale_write_error;

use super::repo_impl::CommissionRepositoryImpl;

impl CommissionRepositoryImpl {
    /// The calculated amounts are snapshots; only status, proof and
    /// timestamps are rewritten.
    pub(super) async fn update_batch_impl(
        repo: &CommissionRepositoryImpl,
        items: Vec<CommissionModel>,
    ) -> RepositoryResult<Vec<CommissionModel>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = repo.pool.begin().await?;
        let mut updated_items = Vec::with_capacity(items.len());
        for mut item in items {
            let proof = item.payment_proof.as_ref();
            let new_version: Option<i32> = sqlx::query_scalar(
                r#"
                UPDATE commission SET
                    status = $2, payment_proof_url = $3, payment_proof_file_name = $4,
                    payment_proof_uploaded_at = $5, updated_at = $6, paid_at = $7,
                    version = version + 1
                WHERE id = $1 AND version = $8
                RETURNING version
                "#,
            )
            .bind(item.id)
            .bind(item.status)
            .bind(proof.map(|p| p.url.as_str()))
            .bind(proof.map(|p| p.file_name.as_str()))
            .bind(proof.map(|p| p.uploaded_at))
            .bind(item.updated_at)
            .bind(item.paid_at)
            .bind(item.version)
            .fetch_optional(&mut *tx)
            .await?;

            match new_version {
                Some(version) => item.version = version,
                None => return Err(stale_write_error(&mut *tx, "commission", item.id).await),
            }
            updated_items.push(item);
        }
        tx.commit().await?;

        Ok(updated_items)
    }
}

#[async_trait]
impl UpdateBatch<CommissionModel> for CommissionRepositoryImpl {
    async fn update_batch(&self, items: Vec<CommissionModel>) -> RepositoryResult<Vec<CommissionModel>> {
        Self::update_batch_impl(self, items).await
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::consumer_repository::test_utils::test_utils::create_test_consumer;
    use crate::test_helper::setup_test_context;
    use chrono::{SubsecRound, Utc};
    use heapless::String as HeaplessString;
    use solar_core_api::domain::status::{CommissionStatus, ConsumerStatus};
    use solar_core_db::models::commission::PaymentProofModel;
    use solar_core_db::repository::create_active_commission::CreateActiveCommission;
    use solar_core_db::repository::create_batch::CreateBatch;
    use solar_core_db::repository::load_batch::LoadBatch;
    use solar_core_db::repository::update_batch::UpdateBatch;
    use super::super::test_utils::test_utils::create_test_commission;

    #[tokio::test]
    #[ignore = "requires PostgreSQL"]
    #[serial_test::serial]
    async fn test_update_batch_stores_payment_proof() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let repos = &ctx.repositories;

        let consumer = repos
            .consumers
            .create_batch(vec![create_test_consumer(ConsumerStatus::Available)])
            .await?
            .remove(0);
        let mut commission = repos.commissions.create_active_commission(create_test_commission(consumer.id)).await?;

        let now = Utc::now().trunc_subsecs(6);
        commission.status = CommissionStatus::Paid;
        commission.paid_at = Some(now);
        commission.payment_proof = Some(PaymentProofModel {
            url: HeaplessString::try_from("https://files.example.com/proof.pdf").unwrap(),
            file_name: HeaplessString::try_from("proof.pdf").unwrap(),
            uploaded_at: now,
        });
        repos.commissions.update_batch(vec![commission.clone()]).await?;

        let loaded = repos.commissions.load(commission.id).await?;
        assert_eq!(loaded.status, CommissionStatus::Paid);
        assert_eq!(loaded.payment_proof, commission.payment_proof);
        assert_eq!(loaded.commission_value, commission.commission_value);
        assert_eq!(loaded.version, 2);

        Ok(())
    }
}
