use std::sync::Arc;

use reqwest::Method;
use serde_json::json;
use tracing::info;

use shared_config::AppConfig;
use shared_database::PostgrestClient;

use crate::models::{CreateServiceRequest, Service, ServiceError};

pub struct ServiceCatalog {
    postgrest: Arc<PostgrestClient>,
}

impl ServiceCatalog {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            postgrest: Arc::new(PostgrestClient::new(config)),
        }
    }

    /// Newest first, the order the public site renders them in.
    pub async fn list(&self) -> Result<Vec<Service>, ServiceError> {
        self.postgrest
            .request(Method::GET, "/rest/v1/services?order=created_at.desc", None)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    pub async fn create(&self, request: CreateServiceRequest) -> Result<Service, ServiceError> {
        let title = request.title.trim().to_string();
        if title.is_empty() {
            return Err(ServiceError::MissingTitle);
        }

        let row = json!({
            "title": title,
            "description": request.description,
            "category": request.category,
        });

        let service: Service = self
            .postgrest
            .insert_returning("services", row)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        info!("Service '{}' created", service.title);
        Ok(service)
    }
}
