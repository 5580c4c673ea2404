mod client;
mod employee;
mod project;
mod assignment;

pub use client::Client;
pub use employee::Employee;
pub use project::Project;
pub use assignment::Assignment;
