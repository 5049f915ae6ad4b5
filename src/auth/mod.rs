pub mod jwt;
pub mod users;

pub use jwt::{create_token, validate_token, Claims};
pub use users::{find_user, MockUser};
