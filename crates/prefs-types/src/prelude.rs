pub use crate::error::{Error, PrefResult};
pub use crate::value::{PrefKind, PrefValue};

pub use tracing::{debug, error, info, warn};

// vim: ts=4
