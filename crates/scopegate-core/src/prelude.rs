pub use scopegate_types::error::{Error, SgResult};
pub use scopegate_types::scope::{ActorRef, CrudOperation, PolicyAction, ScopeFilter};
pub use scopegate_types::types::Timestamp;

pub use tracing::{debug, error, info, warn};

// vim: ts=4
