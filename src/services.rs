pub mod rbac_service;
pub mod user_service;

pub use rbac_service::RbacService;
pub use user_service::UserService;
