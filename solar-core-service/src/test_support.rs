use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use uuid::Uuid;

use solar_core_api::domain::payment_proof::PaymentProofFile;
use solar_core_api::error::{ApiError, ApiResult};
use solar_core_api::service::{PaymentProofStorage, StoredProof};
use solar_core_db::memory::MemoryRepositories;
use solar_core_db::models::consumer::ConsumerModel;
use solar_core_db::models::generator::GeneratorModel;
use solar_core_db::repository::Repositories;

use crate::consumer::NewConsumer;
use crate::generator::NewGenerator;
use crate::services::SolarServices;
use crate::settings::DEFAULT_PRICE_CACHE_TTL;

pub(crate) type TestResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

pub(crate) fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

#[derive(Default)]
pub(crate) struct RecordingProofStorage {
    pub uploaded: Mutex<Vec<String>>,
    pub deleted: Mutex<Vec<String>>,
}

#[async_trait]
impl PaymentProofStorage for RecordingProofStorage {
    async fn upload(&self, commission_id: Uuid, file: &PaymentProofFile) -> ApiResult<StoredProof> {
        if file.content.is_empty() {
            return Err(ApiError::InternalError("empty upload".to_string()));
        }
        let url = format!("https://files.test/proofs/{commission_id}/{}/{}", Uuid::new_v4(), file.file_name);
        self.uploaded.lock().push(url.clone());
        Ok(StoredProof {
            url,
            file_name: file.file_name.clone(),
            uploaded_at: Utc::now(),
        })
    }

    async fn delete(&self, url: &str) -> ApiResult<()> {
        self.deleted.lock().push(url.to_string());
        Ok(())
    }
}

pub(crate) struct Fixture {
    pub repositories: Repositories,
    pub services: SolarServices,
    pub proofs: Arc<RecordingProofStorage>,
}

impl Fixture {
    pub fn new() -> Self {
        let repositories = MemoryRepositories::new().into_repositories();
        let proofs = Arc::new(RecordingProofStorage::default());
        let services = SolarServices::new(repositories.clone(), proofs.clone(), DEFAULT_PRICE_CACHE_TTL);
        Self {
            repositories,
            services,
            proofs,
        }
    }

    pub async fn generator(&self, installed_power: &str) -> ApiResult<GeneratorModel> {
        self.services
            .generators
            .create_generator(NewGenerator {
                owner_name: "Fazenda Solar Ltda".to_string(),
                installed_power: dec(installed_power),
                source_type: "SOLAR".to_string(),
                manually_set_status: None,
            })
            .await
    }

    pub async fn available_consumer(
        &self,
        consumption: &str,
        representative_id: Option<Uuid>,
    ) -> ApiResult<ConsumerModel> {
        self.services
            .consumers
            .register_consumer(new_consumer(consumption, representative_id))
            .await
    }

    pub async fn pending_consumer(&self, consumption: &str, representative_id: Uuid) -> ApiResult<ConsumerModel> {
        self.services
            .consumers
            .submit_consumer(new_consumer(consumption, None), representative_id)
            .await
    }

    pub async fn set_price(&self, price: &str) -> ApiResult<()> {
        self.services.settings.update_kwh_price(dec(price)).await?;
        Ok(())
    }
}

pub(crate) fn new_consumer(consumption: &str, representative_id: Option<Uuid>) -> NewConsumer {
    NewConsumer {
        name: "Mercado Bom Preço".to_string(),
        email: Some("contato@mercado.com.br".to_string()),
        phone: Some("4833334444".to_string()),
        city: Some("Florianópolis".to_string()),
        state: Some("SC".to_string()),
        average_monthly_consumption: dec(consumption),
        discount_offered: Some(dec("10")),
        representative_id,
        ..NewConsumer::default()
    }
}
