//! Client facade
//!
//! Wires one backend and one local record store into every service.

use std::sync::Arc;

use crate::backend::Backend;
use crate::logger;
use crate::services::{
    ComplaintService, FieldVisitService, ProfileService, Repository, SalesService, SessionStore,
    StockService,
};
use crate::storage::LocalStorage;
use crate::upload::ImageUploadPipeline;
use crate::{ClientConfig, ClientResult};

pub struct WarrantyClient {
    config: ClientConfig,
    backend: Backend,
    local: Arc<LocalStorage>,
    sales: SalesService,
    field_visits: FieldVisitService,
    complaints: ComplaintService,
    stock: StockService,
    profiles: ProfileService,
}

impl WarrantyClient {
    /// Build from configuration: file store under `data_dir`, OS keychain
    /// for secrets, remote project if credentials are present
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let backend = Backend::from_config(&config)?;
        let local = Arc::new(LocalStorage::open(&config));
        Self::with_parts(config, backend, local)
    }

    /// Environment configuration with logging initialised
    pub fn from_env() -> ClientResult<Self> {
        let config = ClientConfig::from_env();
        logger::init_from_config(&config);
        Self::new(config)
    }

    /// Build from explicit parts
    pub fn with_parts(
        config: ClientConfig,
        backend: Backend,
        local: Arc<LocalStorage>,
    ) -> ClientResult<Self> {
        let pipeline = Arc::new(ImageUploadPipeline::new(
            backend.clone(),
            &config.data_dir,
            config.timeout,
        )?);

        let sales = SalesService::new(
            Repository::new(backend.clone(), local.clone()),
            pipeline.clone(),
        );
        let field_visits = FieldVisitService::new(
            Repository::new(backend.clone(), local.clone()),
            pipeline.clone(),
        );
        let complaints = ComplaintService::new(
            Repository::new(backend.clone(), local.clone()),
            pipeline,
        );
        let stock = StockService::new(Repository::new(backend.clone(), local.clone()));
        let profiles = ProfileService::new(
            Repository::new(backend.clone(), local.clone()),
            SessionStore::new(local.clone()),
            backend.clone(),
            &config,
        );

        Ok(Self {
            config,
            backend,
            local,
            sales,
            field_visits,
            complaints,
            stock,
            profiles,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn is_remote(&self) -> bool {
        self.backend.is_remote()
    }

    pub fn local_storage(&self) -> &Arc<LocalStorage> {
        &self.local
    }

    pub fn sales(&self) -> &SalesService {
        &self.sales
    }

    pub fn field_visits(&self) -> &FieldVisitService {
        &self.field_visits
    }

    pub fn complaints(&self) -> &ComplaintService {
        &self.complaints
    }

    pub fn stock(&self) -> &StockService {
        &self.stock
    }

    pub fn profiles(&self) -> &ProfileService {
        &self.profiles
    }
}
