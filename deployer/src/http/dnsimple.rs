//! DNSimple API adapter

use api_models::models::dnsimple::{Envelope, Record, RecordCreate, Zone};
use async_trait::async_trait;
use secrecy::SecretString;

use crate::clients::DnsRegistrar;
use crate::errors::DeployError;
use crate::http::client::{AuthStyle, HttpClient};

const PER_PAGE: u32 = 100;

/// DNS registrar backed by the DNSimple v2 API
pub struct DnsimpleClient {
    http: HttpClient,
    account_id: Option<String>,
}

impl DnsimpleClient {
    pub fn new(
        base_url: &str,
        account_id: Option<String>,
        api_token: Option<SecretString>,
    ) -> Result<Self, DeployError> {
        let http = HttpClient::new("dnsimple", base_url, api_token, AuthStyle::Bearer, &[])?;
        Ok(Self { http, account_id })
    }

    fn account(&self) -> Result<&str, DeployError> {
        self.account_id
            .as_deref()
            .ok_or_else(|| DeployError::ConfigError("dns.account_id is not configured".to_string()))
    }

    fn records_path(&self, zone: &Zone) -> Result<String, DeployError> {
        Ok(format!("/{}/zones/{}/records", self.account()?, zone.name))
    }
}

#[async_trait]
impl DnsRegistrar for DnsimpleClient {
    async fn find_zone(&self, domain: &str) -> Result<Zone, DeployError> {
        let path = format!("/{}/zones/{}", self.account()?, domain);
        let envelope: Option<Envelope<Zone>> = self.http.get_optional(&path).await?;
        envelope
            .map(|e| e.data)
            .ok_or_else(|| DeployError::NotFound(format!("DNS zone {}", domain)))
    }

    async fn create_record(
        &self,
        zone: &Zone,
        name: &str,
        record_type: &str,
        content: &str,
    ) -> Result<Record, DeployError> {
        let body = RecordCreate {
            name: name.to_string(),
            record_type: record_type.to_string(),
            content: content.to_string(),
        };
        let envelope: Envelope<Record> = self.http.post(&self.records_path(zone)?, &body).await?;
        Ok(envelope.data)
    }

    async fn list_records(&self, zone: &Zone) -> Result<Vec<Record>, DeployError> {
        let base = self.records_path(zone)?;
        let mut records = Vec::new();
        let mut page = 1;

        loop {
            let path = format!("{}?page={}&per_page={}", base, page, PER_PAGE);
            let envelope: Envelope<Vec<Record>> = self.http.get(&path).await?;
            records.extend(envelope.data);

            match envelope.pagination {
                Some(p) if p.current_page < p.total_pages => page = p.current_page + 1,
                _ => break,
            }
        }

        Ok(records)
    }

    async fn delete_record(&self, zone: &Zone, record: &Record) -> Result<(), DeployError> {
        let path = format!("{}/{}", self.records_path(zone)?, record.id);
        self.http.delete(&path).await
    }
}
