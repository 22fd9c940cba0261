use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

static ID_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Allocate a process-unique identifier such as `app-000042`.
pub fn next_id(prefix: &str) -> String {
    let id = ID_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{id:06}")
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn generate() -> Self {
                Self(next_id($prefix))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_id!(
    /// Account that owns applications, payments, and requests.
    UserId,
    "usr"
);
string_id!(ChapterId, "chp");
string_id!(
    /// Identifier wrapper for applications.
    ApplicationId,
    "app"
);
string_id!(QuestionId, "qst");
string_id!(ColiverId, "col");
string_id!(PaymentId, "pay");
string_id!(TemplateId, "tpl");
string_id!(TodoId, "todo");
string_id!(MaintenanceId, "mnt");
string_id!(TransferId, "trf");
