//! CostWatch Core - client-side coordination layer
//!
//! Keeps local snapshots of the three backend collections (data sources,
//! scheduled checks, alerts) consistent with server state:
//! - [`store`] holds the last-known-good snapshot per collection
//! - [`sync`] repopulates the snapshots, immediately and on independent
//!   polling cadences
//! - [`dispatch`] maps user actions (delete / pause / resume) onto
//!   backend calls and refreshes dependent state afterwards
//! - [`session`] drives the create/edit/re-parse workflow for checks
//! - [`activity`] records every client-observable outcome, bounded and
//!   newest-first
//! - [`console`] wires it all together behind one coordinator
//!
//! # Example
//!
//! ```rust,ignore
//! use costwatch_core::{Console, ConsoleConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut console = Console::new(ConsoleConfig::default())?;
//! console.start_sync();
//! console.toggle_check("chk-1").await;
//! console.stop_sync();
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod activity;
pub mod console;
pub mod dispatch;
pub mod error;
pub mod session;
pub mod store;
pub mod sync;

// Re-exports for convenience
pub use activity::{ActivityEntry, ActivityKind, ActivityLog, EntryId, MAX_ENTRIES};
pub use console::{Console, ConsoleConfig};
pub use dispatch::{ActionDispatcher, EntityAction, EntityKind};
pub use error::{CreateSourceError, SessionError};
pub use session::{CheckDraft, EditSession, SessionState};
pub use store::{EntityStore, Keyed, Stores};
pub use sync::{SyncHandle, SyncIntervals, SyncScheduler, Synchronizer};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with CostWatch Core
    pub use crate::{
        ActionDispatcher, ActivityKind, ActivityLog, Console, ConsoleConfig, EditSession,
        EntityAction, EntityKind, Stores, SyncIntervals, Synchronizer,
    };
}
