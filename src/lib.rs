//! Probes every id in `1..=MAX_ID` on the book site, in random order, with a bounded
//! number of requests in flight, and appends one JSON line per id to the result file.
//!
//! Flow: [`ids`] → dispatcher ([`process`]) gated by [`limiter`] → [`worker`]
//! → [`aggregate`] → [`barrier`].

use std::time::Duration;

mod macros;

pub mod aggregate;
pub mod barrier;
pub mod config;
mod error;
pub mod ids;
pub mod limiter;
pub mod outcome;
mod parse;
pub mod process;
mod request;
pub mod telemetry;
mod worker;

pub use config::{Config, Context};
pub use error::{Error, Result};
pub use outcome::{Failure, Identifier, Outcome};
pub use process::{run, RunSummary};

const BASE_URL: &str = "https://mp.zhizhuma.com/book.htm?id=";
const RESULT_FILE_PATH: &str = "./result.json";
const MAX_ID: Identifier = 10_000 * 30;
/// Maximum number of workers holding a slot at once.
const MAX_IN_FLIGHT: usize = 50;
const MAX_IDLE_PER_HOST: usize = 10;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
/// Capacity of the channel between the workers and the aggregator.
const RESULT_BUFFER: usize = 10_000;
/// Present on pages of ids that have no book behind them.
const NOT_FOUND_SELECTOR: &str = ".tips_des";
const BOOK_NAME_SELECTOR: &str = "#book_name";
/// Log a progress line every this many recorded outcomes.
const PROGRESS_EVERY: usize = 10_000;
