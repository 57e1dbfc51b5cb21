// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! oj-storage: the disk-facing half of the data model — the Frontmatter
//! Codec (spec.md §4.1), the Plan Loader & State Persister (§4.2), the
//! Observer event sink (§6), and the Session Registry's on-disk form
//! (§4.7). `oj-core` defines the types; this crate reads and writes them.

pub mod error;
pub mod frontmatter;
pub mod observer;
pub mod plan_loader;
pub mod session_registry;

pub use error::{Result, StorageError};
pub use observer::{NullObserver, ObserverEvent, ObserverSink, RecordingObserver};
pub use plan_loader::{is_archived, load_plan, PlanPersister};
pub use session_registry::{PidProbe, ReconcileReport, SessionRegistry, SignalProbe};
