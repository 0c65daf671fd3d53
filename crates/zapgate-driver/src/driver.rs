//! Scan orchestrator: dispatches crawl and attack jobs and aggregates their
//! progress.
//!
//! One `ZapDriver` instance exists per pipeline invocation and is touched only
//! by the single step-execution flow; all per-run mutable state (active crawl
//! id, started attack jobs, allow-list, thresholds) lives here explicitly
//! rather than in ambient statics.
//!
//! Every operation absorbs API failure into its return value. A failed status
//! query counts as complete so a flaky check can never wedge the poll loop.

use crate::allowlist;
use crate::client::{self, ApiClient};
use crate::error::ApiResult;
use crate::poll::COMPLETED_PERCENTAGE;
use serde_json::Value;
use zapgate_core::{JobId, ScanParameters, ScannerEndpoint, SeverityThresholds};

/// Orchestrates crawl and active-scan jobs on one scanner instance.
pub struct ZapDriver {
    client: ApiClient,
    endpoint: ScannerEndpoint,
    /// Active crawl job; `None` means no crawl has been dispatched
    crawl_id: Option<JobId>,
    /// Attack jobs started in the current attack run, in dispatch order
    attack_ids: Vec<JobId>,
    allowed_hosts: Vec<String>,
    thresholds: SeverityThresholds,
}

impl ZapDriver {
    /// Create a driver for the given scanner endpoint.
    ///
    /// # Errors
    /// Returns error if the endpoint does not form a valid API base URL.
    pub fn new(endpoint: ScannerEndpoint) -> ApiResult<Self> {
        let client = ApiClient::new(&endpoint)?;
        Ok(Self {
            client,
            endpoint,
            crawl_id: None,
            attack_ids: Vec::new(),
            allowed_hosts: Vec::new(),
            thresholds: SeverityThresholds::default(),
        })
    }

    /// Set the hosts eligible for active scanning; empty means loopback-only.
    #[must_use]
    pub fn with_allowed_hosts(mut self, hosts: Vec<String>) -> Self {
        self.allowed_hosts = hosts;
        self
    }

    /// Set the alert-count limits carried for the report step.
    #[must_use]
    pub fn with_thresholds(mut self, thresholds: SeverityThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// The scanner endpoint this driver talks to.
    #[must_use]
    pub fn endpoint(&self) -> &ScannerEndpoint {
        &self.endpoint
    }

    /// Alert-count limits configured for this invocation.
    #[must_use]
    pub fn thresholds(&self) -> SeverityThresholds {
        self.thresholds
    }

    /// The active crawl job, if one was dispatched.
    #[must_use]
    pub fn crawl_id(&self) -> Option<JobId> {
        self.crawl_id
    }

    /// Attack jobs started in the current attack run.
    #[must_use]
    pub fn attack_ids(&self) -> &[JobId] {
        &self.attack_ids
    }

    /// Forget the active crawl so a new one may be dispatched.
    pub fn reset_crawl(&mut self) {
        self.crawl_id = None;
    }

    /// Ask the scanner process to shut itself down.
    pub async fn shutdown(&self) -> bool {
        self.client.call("core/action/shutdown", &[]).await.is_ok()
    }

    /// Set the scanner mode (e.g. `standard`, `attack`, `safe`).
    pub async fn set_mode(&self, mode: &str) -> bool {
        self.client
            .call("core/action/setMode", &[("mode", mode.to_string())])
            .await
            .is_ok()
    }

    /// Import URLs into the scanner's site tree from a file on the scanner
    /// host.
    pub async fn import_urls(&self, path: &str) -> bool {
        tracing::info!("Importing URLs from {}", path);
        match self
            .client
            .call(
                "importurls/action/importurls",
                &[("filePath", path.to_string())],
            )
            .await
        {
            Ok(body) => client::result_is_ok(&body),
            Err(e) => {
                tracing::warn!("URL import failed: {}", e);
                false
            }
        }
    }

    /// Load a saved scanner session.
    pub async fn load_session(&self, session_path: &str) -> bool {
        tracing::info!("Loading session from {}", session_path);
        match self
            .client
            .call(
                "core/action/loadSession",
                &[("name", session_path.to_string())],
            )
            .await
        {
            Ok(body) => client::result_is_ok(&body),
            Err(e) => {
                tracing::warn!("Session load failed: {}", e);
                false
            }
        }
    }

    /// Import a scan policy from a file on the scanner host.
    ///
    /// A policy that is already loaded reports `code = "already_exists"`,
    /// which counts as success.
    pub async fn load_policy(&self, policy_path: &str) -> bool {
        match self
            .client
            .call(
                "ascan/action/importScanPolicy",
                &[("path", policy_path.to_string())],
            )
            .await
        {
            Ok(body) => {
                client::result_is_ok(&body)
                    || body.get("code").and_then(Value::as_str) == Some("already_exists")
            }
            Err(e) => {
                tracing::warn!("Policy import failed: {}", e);
                false
            }
        }
    }

    /// Start the crawler against a target host.
    ///
    /// Fails without an API call if a crawl is already active. Any API
    /// failure or missing job id leaves no crawl id set.
    pub async fn start_crawl(&mut self, target: &str) -> bool {
        if self.crawl_id.is_some() {
            tracing::warn!("A crawl is already active, not starting another");
            return false;
        }

        match self
            .client
            .call("spider/action/scan", &[("url", target.to_string())])
            .await
        {
            Ok(body) => match client::job_id_field(&body, "scan") {
                Some(id) => {
                    self.crawl_id = Some(id);
                    true
                }
                None => {
                    tracing::warn!("Crawl start response carried no job id");
                    false
                }
            },
            Err(e) => {
                tracing::warn!("Failed to start crawl on {}: {}", target, e);
                false
            }
        }
    }

    /// Current crawl completion percentage.
    ///
    /// A missing crawl or failed status query reports 100 so the poll loop
    /// cannot block on a flaky check.
    pub async fn crawl_status(&self) -> u8 {
        let Some(id) = self.crawl_id else {
            return COMPLETED_PERCENTAGE;
        };

        match self
            .client
            .call("spider/view/status", &[("scanId", id.to_string())])
            .await
        {
            Ok(body) => client::status_field(&body).unwrap_or(COMPLETED_PERCENTAGE),
            Err(_) => COMPLETED_PERCENTAGE,
        }
    }

    /// Start an attack run against every eligible site the scanner knows.
    ///
    /// Clears jobs from any prior run first. Individual sites that are
    /// ineligible or fail to dispatch are skipped; the only true failure is
    /// not being able to retrieve the site list at all.
    pub async fn run_attack(&mut self, params: &ScanParameters) -> bool {
        self.attack_ids.clear();

        let sites_body = match self.client.call("core/view/sites", &[]).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Could not retrieve site list: {}", e);
                return false;
            }
        };
        let Some(sites) = sites_body.get("sites").and_then(Value::as_array) else {
            tracing::warn!("Site list response carried no sites field");
            return false;
        };

        let mut dispatched: Vec<String> = Vec::new();
        for site in sites {
            let site_url = site
                .as_str()
                .map_or_else(|| site.to_string(), ToString::to_string);

            // Only one scan per site per run
            if dispatched.iter().any(|seen| *seen == site_url) {
                continue;
            }
            if self.begin_scan(&site_url, params).await {
                dispatched.push(site_url);
            }
        }

        true
    }

    /// Begin an active scan of one site, applying the allow-list guard first.
    ///
    /// No API call is made when the guard rejects the site.
    async fn begin_scan(&mut self, site_url: &str, params: &ScanParameters) -> bool {
        if !allowlist::is_scannable(site_url, &self.allowed_hosts).await {
            return false;
        }

        let mut endpoint = "ascan/action/scan";
        let mut args = vec![("url", site_url.to_string())];

        if let Some(user_id) = params.user_id {
            tracing::info!("Attacking as user id {}", user_id);
            endpoint = "ascan/action/scanAsUser";
            args.push(("userId", user_id.to_string()));
        }

        if let Some(policy) = &params.scan_policy_name {
            args.push(("scanPolicyName", policy.clone()));
        }

        match self.client.call(endpoint, &args).await {
            Ok(body) => match client::job_id_field(&body, "scan") {
                Some(id) => {
                    tracing::info!("Started attack job {} on {}", id, site_url);
                    self.attack_ids.push(id);
                    true
                }
                None => {
                    tracing::warn!("Attack start on {} carried no job id", site_url);
                    false
                }
            },
            Err(e) => {
                tracing::warn!("Failed to start attack on {}: {}", site_url, e);
                false
            }
        }
    }

    /// Aggregate completion percentage across the current attack jobs.
    ///
    /// Returns 100 immediately when no jobs were started. A job whose status
    /// cannot be retrieved contributes 100. The per-job statuses are separate
    /// snapshots, not one atomic read; the mean is a coarse progress value
    /// for display and loop termination only.
    #[allow(clippy::cast_possible_truncation)]
    pub async fn attack_status(&self) -> u8 {
        if self.attack_ids.is_empty() {
            return COMPLETED_PERCENTAGE;
        }

        let mut total: u32 = 0;
        for id in &self.attack_ids {
            let progress = match self
                .client
                .call("ascan/view/status", &[("scanId", id.to_string())])
                .await
            {
                Ok(body) => client::status_field(&body).unwrap_or(COMPLETED_PERCENTAGE),
                Err(_) => COMPLETED_PERCENTAGE,
            };
            total += u32::from(progress);
        }

        (total / self.attack_ids.len() as u32) as u8
    }
}
