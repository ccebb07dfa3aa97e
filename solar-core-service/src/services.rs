use std::sync::Arc;
use std::time::Duration;

use solar_core_api::service::PaymentProofStorage;
use solar_core_db::repository::Repositories;

use crate::allocation::AllocationManager;
use crate::approval::ApprovalWorkflow;
use crate::capacity::CapacityLedger;
use crate::change_request::ChangeRequestWorkflow;
use crate::commission::CommissionCalculator;
use crate::commission_lifecycle::CommissionLifecycle;
use crate::consumer::ConsumerService;
use crate::generator::GeneratorService;
use crate::settings::CachedKwhPriceProvider;

/// Every service wired against one set of repositories.
#[derive(Clone)]
pub struct SolarServices {
    pub capacity: CapacityLedger,
    pub allocation: AllocationManager,
    pub generators: GeneratorService,
    pub consumers: ConsumerService,
    pub commissions: CommissionCalculator,
    pub lifecycle: CommissionLifecycle,
    pub approval: ApprovalWorkflow,
    pub change_requests: ChangeRequestWorkflow,
    pub settings: Arc<CachedKwhPriceProvider>,
}

impl SolarServices {
    pub fn new(
        repositories: Repositories,
        proofs: Arc<dyn PaymentProofStorage>,
        price_cache_ttl: Duration,
    ) -> Self {
        let settings = Arc::new(CachedKwhPriceProvider::new(&repositories, price_cache_ttl));
        let commissions = CommissionCalculator::new(&repositories, settings.clone());

        Self {
            capacity: CapacityLedger::new(&repositories),
            allocation: AllocationManager::new(&repositories),
            generators: GeneratorService::new(&repositories),
            consumers: ConsumerService::new(&repositories),
            approval: ApprovalWorkflow::new(&repositories, commissions.clone()),
            lifecycle: CommissionLifecycle::new(&repositories, proofs),
            change_requests: ChangeRequestWorkflow::new(&repositories),
            commissions,
            settings,
        }
    }
}
