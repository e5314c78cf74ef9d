//! Admin SDK: model-driven admin panel REST backend library.

pub mod case;
pub mod config;
pub mod error;
pub mod handlers;
pub mod registry;
pub mod repo;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod value;

pub use config::{load_from_path, resolve, AdminSettings, ModelDef, ModelsConfig};
pub use error::{AppError, ConfigError};
pub use registry::{MenuItem, ModelRegistry};
pub use repo::{MemoryRepository, PgRepository, Repository};
pub use routes::{admin_routes, common_routes};
pub use service::AdminService;
pub use state::AppState;
pub use value::NativeValue;
