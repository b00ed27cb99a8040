//! ICMP echo probe engine for a single target host.
//!
//! One [`Prober`] owns the whole per-host cycle: build an RFC 792 echo
//! request, send it over a raw ICMP channel, wait for the matching reply
//! within a deadline, classify the outcome, and fold it into running RTT
//! and loss [`Statistics`]. Lifecycle events go to a caller-supplied
//! [`EventSink`]. Sweeping many hosts, scheduling, and output formatting
//! belong to the caller; each prober runs its series sequentially on one
//! thread, and independent probers can run on their own threads without
//! any shared state.
//!
//! ```no_run
//! use echoprobe::Prober;
//!
//! let mut prober = Prober::new("192.0.2.1")?;
//! prober.count = 4;
//! prober.run()?;
//! println!("loss: {:.0}%", prober.statistics().loss_percent());
//! # Ok::<(), echoprobe::ProbeError>(())
//! ```
//!
//! Raw ICMP channels need elevated privileges on most systems; acquiring
//! them is the caller's problem.

pub mod dns_resolver;
pub mod error;
pub mod events;
pub mod packet;
pub mod prober;
pub mod stats;
pub mod transport;

pub use dns_resolver::AddrFamily;
pub use error::ProbeError;
pub use events::{EventSink, NopSink, ProbeFailure, ProbeReport};
pub use prober::{CancelToken, DEFAULT_COUNT, DEFAULT_INTERVAL, DEFAULT_TIMEOUT, Prober};
pub use stats::Statistics;
pub use transport::{ProbeChannel, ProbeTransport, RawTransport};
