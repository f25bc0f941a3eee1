// Services layer for business logic
// Services own business rules and uniqueness handling, calling storage directly

pub mod environment;
pub mod error;
pub mod user;
pub mod variable;

pub use environment::EnvironmentService;
pub use error::{ServiceError, ServiceResult};
pub use user::UserService;
pub use variable::VariableService;
