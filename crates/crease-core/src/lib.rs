// Library root: configuration, persistence, session context, domain records,
// and the REST client shared by the portal and the admin console.

pub mod api;
pub mod config;
pub mod db;
pub mod model;
pub mod session;
