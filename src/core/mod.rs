//! Core business logic module
//!
//! - `traits` - Storage capabilities the coordinators depend on
//! - `memory` - In-memory backend implementing every capability
//! - `purchase` - Buying catalog items with coins
//! - `transfer` - Moving coins between accounts
//! - `history` - Read-only account summaries
//! - `registry` - Identity to account resolution
//! - `stage` - Unit-of-work progress tracking
//! - `engine` - Facade over all of the above

pub mod engine;
pub mod history;
pub mod memory;
pub mod purchase;
pub mod registry;
pub mod stage;
pub mod traits;
pub mod transfer;

pub use engine::{CoinEngine, EngineConfig};
pub use history::HistoryAssembler;
pub use memory::{LockOutcome, MemoryStore, MemoryUnit};
pub use purchase::PurchaseCoordinator;
pub use registry::resolve_or_create;
pub use stage::UnitStage;
pub use traits::{AccountStore, CatalogLookup, LedgerRecorder, Storage, UnitId, UnitOfWork};
pub use transfer::TransferCoordinator;
