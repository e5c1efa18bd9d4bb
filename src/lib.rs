//! cfapi - typed client for the Cloud Controller V3 API
//!
//! Logical operations are issued by request name. The client resolves the
//! route, attaches the bearer token, refreshes it once through the UAA when
//! the controller rejects it, follows pagination links, and returns decoded
//! resources together with the controller's warnings.
//!
//! # Example
//!
//! ```no_run
//! use cfapi::ccv3::{Query, QueryKey};
//! use cfapi::settings::{self, SettingsStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SettingsStore::new();
//! let loaded = store.load()?;
//! let client = settings::connect(store, &loaded)?;
//!
//! let ((roles, _included), warnings) = client
//!     .get_roles(&[Query::new(QueryKey::Include, ["user"])])
//!     .await?;
//! for role in roles {
//!     println!("{} {}", role.role_type, role.username);
//! }
//! for warning in warnings {
//!     eprintln!("{}", warning);
//! }
//! # Ok(())
//! # }
//! ```

pub mod ccv3;
pub mod cli;
pub mod config;
pub mod error;
pub mod settings;
pub mod uaa;
pub mod version;

pub use ccv3::Client;
pub use error::{ApiResult, CcError, Result, WarnedError, Warnings};
pub use settings::{Settings, SettingsStore};
pub use uaa::{TokenSet, TokenStore, UaaClient};
