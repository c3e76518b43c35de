//! Account handlers: registration, login, profile and administration.

mod login;
mod manage_users;
mod profile;
mod register;

pub use login::{LoginCommand, LoginHandler};
pub use manage_users::{ManageUsersHandler, UpdateRoleCommand};
pub use profile::{ProfileHandler, UpdateProfileCommand};
pub use register::{AuthSession, RegisterCommand, RegisterHandler};
