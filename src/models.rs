pub mod rbac;
pub mod user;
