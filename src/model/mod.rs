pub mod application;
pub mod assignment_operation;
pub mod auth;
pub mod common;
pub mod formation;
pub mod formation_assignment;
pub mod json_schema;
pub mod label;
pub mod label_definition;
pub mod package;
pub mod package_instance_auth;
pub mod pagination;
pub mod runtime;
pub mod systems_sync;
pub mod tenant_business_type;
pub mod webhook;

pub use application::*;
pub use assignment_operation::*;
pub use auth::*;
pub use common::Id;
pub use formation::*;
pub use formation_assignment::*;
pub use label::*;
pub use label_definition::*;
pub use package::*;
pub use package_instance_auth::*;
pub use pagination::{Page, PageInfo};
pub use runtime::*;
pub use systems_sync::*;
pub use tenant_business_type::*;
pub use webhook::*;
