use std::sync::Arc;

use solar_core_api::domain::status::{ChangeRequestStatus, CommissionStatus, ConsumerStatus};

use crate::models::change_request::ChangeRequestModel;
use crate::models::commission::CommissionModel;
use crate::models::consumer::ConsumerModel;
use crate::models::generator::GeneratorModel;
use crate::repository::{
    ApplyAllocation, CreateActiveCommission, CreateBatch, DeleteBatch, ExistByIds,
    FindByConsumerId, FindByGeneratorId, FindByStatus, KwhPriceSettings, ListPage, LoadBatch,
    ResolveChangeRequest, UpdateBatch,
};

pub trait GeneratorRepository:
    CreateBatch<GeneratorModel>
    + LoadBatch<GeneratorModel>
    + UpdateBatch<GeneratorModel>
    + DeleteBatch<GeneratorModel>
    + ExistByIds<GeneratorModel>
    + ListPage<GeneratorModel>
{
}

impl<R> GeneratorRepository for R where
    R: CreateBatch<GeneratorModel>
        + LoadBatch<GeneratorModel>
        + UpdateBatch<GeneratorModel>
        + DeleteBatch<GeneratorModel>
        + ExistByIds<GeneratorModel>
        + ListPage<GeneratorModel>
{
}

/// Consumer persistence. Allocation fields only change through
/// [`ApplyAllocation`]; `UpdateBatch` is for the remaining fields.
pub trait ConsumerRepository:
    CreateBatch<ConsumerModel>
    + LoadBatch<ConsumerModel>
    + UpdateBatch<ConsumerModel>
    + DeleteBatch<ConsumerModel>
    + FindByGeneratorId<ConsumerModel>
    + FindByStatus<ConsumerModel, ConsumerStatus>
    + ApplyAllocation
{
}

impl<R> ConsumerRepository for R where
    R: CreateBatch<ConsumerModel>
        + LoadBatch<ConsumerModel>
        + UpdateBatch<ConsumerModel>
        + DeleteBatch<ConsumerModel>
        + FindByGeneratorId<ConsumerModel>
        + FindByStatus<ConsumerModel, ConsumerStatus>
        + ApplyAllocation
{
}

pub trait CommissionRepository:
    LoadBatch<CommissionModel>
    + UpdateBatch<CommissionModel>
    + FindByConsumerId<CommissionModel>
    + FindByStatus<CommissionModel, CommissionStatus>
    + CreateActiveCommission
{
}

impl<R> CommissionRepository for R where
    R: LoadBatch<CommissionModel>
        + UpdateBatch<CommissionModel>
        + FindByConsumerId<CommissionModel>
        + FindByStatus<CommissionModel, CommissionStatus>
        + CreateActiveCommission
{
}

pub trait ChangeRequestRepository:
    CreateBatch<ChangeRequestModel>
    + LoadBatch<ChangeRequestModel>
    + FindByConsumerId<ChangeRequestModel>
    + FindByStatus<ChangeRequestModel, ChangeRequestStatus>
    + ResolveChangeRequest
{
}

impl<R> ChangeRequestRepository for R where
    R: CreateBatch<ChangeRequestModel>
        + LoadBatch<ChangeRequestModel>
        + FindByConsumerId<ChangeRequestModel>
        + FindByStatus<ChangeRequestModel, ChangeRequestStatus>
        + ResolveChangeRequest
{
}

pub trait SettingsRepository: KwhPriceSettings {}

impl<R> SettingsRepository for R where R: KwhPriceSettings {}

/// The repositories the services run against, one handle per aggregate.
#[derive(Clone)]
pub struct Repositories {
    pub generators: Arc<dyn GeneratorRepository>,
    pub consumers: Arc<dyn ConsumerRepository>,
    pub commissions: Arc<dyn CommissionRepository>,
    pub change_requests: Arc<dyn ChangeRequestRepository>,
    pub settings: Arc<dyn SettingsRepository>,
}
