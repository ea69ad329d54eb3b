pub mod json_error;
pub mod jwt;
pub mod login;
pub mod register;
pub mod server_config;
pub mod user;

pub use self::json_error::{ERROR_STATUS, ErrorResponse};
pub use self::jwt::{SCOPE_LIST_USERS, TokenClaims};
pub use self::login::{LoginData, LoginError};
pub use self::register::{RegistrationData, RegistrationError};
pub use self::user::{AuthorizedResponse, MAX_EMAIL_LEN, Role, User};
