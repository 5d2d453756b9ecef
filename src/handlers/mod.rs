// handlers/mod.rs - route handlers grouped by resource
//
// Catalog resources (programs, alt_programs, applications) are thin typed
// wrappers over the generic operations in `resource`; they exist so each
// route carries its own OpenAPI annotation.

pub mod alt_programs;
pub mod applications;
pub mod programs;
pub mod resource;
pub mod root;
pub mod users;
