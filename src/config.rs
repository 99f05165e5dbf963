use std::{path::PathBuf, sync::Arc, time::Duration};

use reqwest::Client;

use crate::barrier::CompletionBarrier;
use crate::limiter::ConcurrencyLimiter;
use crate::parse::Extractor;
use crate::{
    Identifier, Result, BASE_URL, BOOK_NAME_SELECTOR, MAX_ID, MAX_IDLE_PER_HOST, MAX_IN_FLIGHT,
    NOT_FOUND_SELECTOR, REQUEST_TIMEOUT, RESULT_BUFFER, RESULT_FILE_PATH,
};

/// Everything a run needs to know up front. `Config::default()` is the production setup;
/// nothing here is read from the command line or the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// The id is appended to this to get the page URL.
    pub base_url: String,
    /// Ids `1..=max_id` are probed.
    pub max_id: Identifier,
    pub max_in_flight: usize,
    pub request_timeout: Duration,
    pub max_idle_per_host: usize,
    pub result_buffer: usize,
    pub result_path: PathBuf,
    pub not_found_selector: String,
    pub value_selector: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.into(),
            max_id: MAX_ID,
            max_in_flight: MAX_IN_FLIGHT,
            request_timeout: REQUEST_TIMEOUT,
            max_idle_per_host: MAX_IDLE_PER_HOST,
            result_buffer: RESULT_BUFFER,
            result_path: RESULT_FILE_PATH.into(),
            not_found_selector: NOT_FOUND_SELECTOR.into(),
            value_selector: BOOK_NAME_SELECTOR.into(),
        }
    }
}

impl Config {
    /// Builds the one client every worker shares. The timeout covers the whole request,
    /// body included.
    pub fn http_client(&self) -> Result<Client> {
        let client = Client::builder()
            .timeout(self.request_timeout)
            .pool_max_idle_per_host(self.max_idle_per_host)
            .build()?;
        Ok(client)
    }

    pub fn page_url(&self, id: Identifier) -> String {
        format!("{}{id}", self.base_url)
    }
}

/// Shared state of one run, handed to the dispatcher, every worker and the aggregator
/// behind an `Arc`.
#[derive(Debug)]
pub struct Context {
    pub config: Config,
    pub(crate) client: Client,
    pub(crate) extractor: Arc<Extractor>,
    pub limiter: ConcurrencyLimiter,
    pub barrier: CompletionBarrier,
}

impl Context {
    pub fn new(config: Config) -> Result<Self> {
        let client = config.http_client()?;
        let extractor = Arc::new(Extractor::new(
            &config.not_found_selector,
            &config.value_selector,
        )?);
        let limiter = ConcurrencyLimiter::new(config.max_in_flight);

        Ok(Self {
            config,
            client,
            extractor,
            limiter,
            barrier: CompletionBarrier::new(),
        })
    }
}
