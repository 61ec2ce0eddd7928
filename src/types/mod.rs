// ABOUTME: Validated domain types.
// ABOUTME: Values are checked once at construction and trusted afterwards.

mod release_name;

pub use release_name::{MAX_RELEASE_NAME_LEN, ReleaseName, ReleaseNameError};
