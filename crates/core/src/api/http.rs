use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use super::traits::PlannerApi;
use crate::errors::{redact_query, CoreError};
use crate::models::daybyday::{DayByDay, DayByDayResponse, ProjectionWindow};
use crate::models::rule::{Rule, RuleId, RuleListResponse, RuleMutation};
use crate::models::settings::Settings;

/// REST client for the MoneyWise backend.
///
/// - `GET    /api/rules?userid=`
/// - `GET    /api/rules/{id}?userid=`
/// - `POST   /api/rules?userid=`
/// - `PUT    /api/rules/{id}?userid=`
/// - `DELETE /api/rules/{id}?userid=`
/// - `GET    /api/daybydays?userid=&startDate=&endDate=`
pub struct HttpPlannerApi {
    client: Client,
    base_url: String,
}

impl HttpPlannerApi {
    pub fn new(settings: &Settings) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(settings.request_timeout_secs));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn rules_url(&self) -> String {
        format!("{}/api/rules", self.base_url)
    }

    pub fn rule_url(&self, rule_id: &RuleId) -> String {
        format!("{}/api/rules/{}", self.base_url, rule_id)
    }

    pub fn daybydays_url(&self) -> String {
        format!("{}/api/daybydays", self.base_url)
    }
}

/// Query parameters of a projection request, in the order the backend documents them.
pub fn projection_query(user_id: &str, window: &ProjectionWindow) -> [(&'static str, String); 3] {
    [
        ("userid", user_id.to_string()),
        ("startDate", window.start_param()),
        ("endDate", window.end_param()),
    ]
}

// ── Response handling ───────────────────────────────────────────────

async fn ensure_success(resp: Response, endpoint: &str) -> Result<Response, CoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp.text().await.unwrap_or_default();
    Err(CoreError::Api {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        message,
    })
}

/// Like `ensure_success`, but a 404 means the rule itself is gone.
async fn ensure_rule_exists(
    resp: Response,
    endpoint: &str,
    rule_id: &RuleId,
) -> Result<Response, CoreError> {
    if resp.status() == StatusCode::NOT_FOUND {
        return Err(CoreError::RuleNotFound(rule_id.to_string()));
    }
    ensure_success(resp, endpoint).await
}

async fn parse_json<T: DeserializeOwned>(resp: Response, endpoint: &str) -> Result<T, CoreError> {
    resp.json::<T>().await.map_err(|e| {
        CoreError::Deserialization(format!(
            "{endpoint}: {}",
            redact_query(&e.to_string())
        ))
    })
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl PlannerApi for HttpPlannerApi {
    async fn list_rules(&self, user_id: &str) -> Result<Vec<Rule>, CoreError> {
        const ENDPOINT: &str = "GET /api/rules";
        tracing::debug!(endpoint = ENDPOINT, "fetching rules");

        let resp = self
            .client
            .get(self.rules_url())
            .query(&[("userid", user_id)])
            .send()
            .await?;
        let resp = ensure_success(resp, ENDPOINT).await?;
        let body: RuleListResponse = parse_json(resp, ENDPOINT).await?;
        Ok(body.into_rules())
    }

    async fn get_rule(&self, user_id: &str, rule_id: &RuleId) -> Result<Rule, CoreError> {
        const ENDPOINT: &str = "GET /api/rules/{id}";
        tracing::debug!(endpoint = ENDPOINT, rule_id = %rule_id, "fetching rule");

        let resp = self
            .client
            .get(self.rule_url(rule_id))
            .query(&[("userid", user_id)])
            .send()
            .await?;
        let resp = ensure_rule_exists(resp, ENDPOINT, rule_id).await?;
        parse_json(resp, ENDPOINT).await
    }

    async fn create_rule(&self, user_id: &str, rule: &RuleMutation) -> Result<Rule, CoreError> {
        const ENDPOINT: &str = "POST /api/rules";
        tracing::debug!(endpoint = ENDPOINT, name = %rule.name, "creating rule");

        let resp = self
            .client
            .post(self.rules_url())
            .query(&[("userid", user_id)])
            .json(rule)
            .send()
            .await?;
        let resp = ensure_success(resp, ENDPOINT).await?;
        parse_json(resp, ENDPOINT).await
    }

    async fn update_rule(
        &self,
        user_id: &str,
        rule_id: &RuleId,
        rule: &RuleMutation,
    ) -> Result<Rule, CoreError> {
        const ENDPOINT: &str = "PUT /api/rules/{id}";
        tracing::debug!(endpoint = ENDPOINT, rule_id = %rule_id, "updating rule");

        let resp = self
            .client
            .put(self.rule_url(rule_id))
            .query(&[("userid", user_id)])
            .json(rule)
            .send()
            .await?;
        let resp = ensure_rule_exists(resp, ENDPOINT, rule_id).await?;
        parse_json(resp, ENDPOINT).await
    }

    async fn delete_rule(&self, user_id: &str, rule_id: &RuleId) -> Result<(), CoreError> {
        const ENDPOINT: &str = "DELETE /api/rules/{id}";
        tracing::debug!(endpoint = ENDPOINT, rule_id = %rule_id, "deleting rule");

        let resp = self
            .client
            .delete(self.rule_url(rule_id))
            .query(&[("userid", user_id)])
            .send()
            .await?;
        ensure_rule_exists(resp, ENDPOINT, rule_id).await?;
        Ok(())
    }

    async fn get_daybydays(
        &self,
        user_id: &str,
        window: &ProjectionWindow,
    ) -> Result<Vec<DayByDay>, CoreError> {
        const ENDPOINT: &str = "GET /api/daybydays";
        tracing::debug!(
            endpoint = ENDPOINT,
            start = %window.start_param(),
            end = %window.end_param(),
            "fetching projection"
        );

        let resp = self
            .client
            .get(self.daybydays_url())
            .query(&projection_query(user_id, window))
            .send()
            .await?;
        let resp = ensure_success(resp, ENDPOINT).await?;
        let body: DayByDayResponse = parse_json(resp, ENDPOINT).await?;
        Ok(body.daybydays)
    }
}
