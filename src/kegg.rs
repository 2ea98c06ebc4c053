use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;

use crate::domain::{OrganismCode, PathwayId, REFERENCE_MARKER};
use crate::error::KpwdError;

pub trait KeggClient: Send + Sync {
    /// Raw body of `list/pathway/<org>`.
    fn list_pathways(&self, org: &OrganismCode) -> Result<String, KpwdError>;
    /// Raw body of `find/pathway/<term>`.
    fn find_pathways(&self, term: &str) -> Result<String, KpwdError>;
    /// KGML markup of one pathway.
    fn get_kgml(&self, id: &PathwayId) -> Result<String, KpwdError>;
}

#[derive(Clone)]
pub struct KeggHttpClient {
    client: Client,
    base_url: String,
}

impl KeggHttpClient {
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, KpwdError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("kpwd/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| KpwdError::KeggHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| KpwdError::KeggHttp(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get_text(&self, url: &str, target: &str) -> Result<String, KpwdError> {
        debug!(url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| KpwdError::KeggHttp(err.to_string()))?;
        let response = Self::handle_status(response, target)?;
        response
            .text()
            .map_err(|err| KpwdError::KeggHttp(err.to_string()))
    }

    fn handle_status(response: Response, target: &str) -> Result<Response, KpwdError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .ok()
            .map(|body| body.trim().to_string())
            .filter(|body| !body.is_empty())
            .unwrap_or_else(|| "KEGG request failed".to_string());
        Err(KpwdError::KeggStatus {
            target: target.to_string(),
            status,
            message,
        })
    }
}

impl KeggClient for KeggHttpClient {
    fn list_pathways(&self, org: &OrganismCode) -> Result<String, KpwdError> {
        let url = format!("{}/list/pathway/{}", self.base_url, org.as_str());
        self.get_text(&url, &format!("organism {org}"))
    }

    fn find_pathways(&self, term: &str) -> Result<String, KpwdError> {
        let url = format!("{}/find/pathway/{}", self.base_url, term);
        self.get_text(&url, &format!("search term {term}"))
    }

    fn get_kgml(&self, id: &PathwayId) -> Result<String, KpwdError> {
        let url = format!("{}/get/{}/kgml", self.base_url, id.as_str());
        let body = self.get_text(&url, id.as_str())?;
        debug!(pathway = %id, "finished downloading kgml");
        Ok(body)
    }
}

/// Parses a `list/pathway` or `find/pathway` response body.
///
/// Each line has the form `[path:]<id>\t<description>`. Entries for the
/// reference marker are rewritten to the requested organism; entries for
/// `org` are kept; every other line is dropped.
pub fn parse_pathway_listing(body: &str, org: &OrganismCode) -> Vec<PathwayId> {
    body.lines()
        .filter_map(|line| {
            let field = line.split('\t').next()?.trim();
            let field = field.strip_prefix("path:").unwrap_or(field);
            let id = field.parse::<PathwayId>().ok()?;
            if id.prefix() == REFERENCE_MARKER {
                Some(id.with_organism(org))
            } else if id.prefix() == org.as_str() {
                Some(id)
            } else {
                None
            }
        })
        .collect()
}
