//! Prelude module - commonly used types for convenient import.
//!
//! Use `use tallylab_access::prelude::*;` to import all essential types.

// Errors
pub use crate::{AccessError, AccessResult};

// Policy
pub use crate::{ControllerOptions, PolicyParams, PolicyStore};

// Decisions
pub use crate::{AccessController, AccessDecision, Denial, LogEntry, TallyLabAccessController};

// Registry and node binding
pub use crate::{ControllerKind, ControllerRegistry, NodeContext};

// Addressing
pub use crate::{Database, DatabaseAddress, Manifest, create_database, derive_address, open_database};
