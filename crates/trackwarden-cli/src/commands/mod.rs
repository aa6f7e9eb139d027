//! Command implementations.

pub mod classify;
pub mod list;
pub mod register;
pub mod submit;

pub use self::classify::execute_classify;
pub use self::list::execute_list;
pub use self::register::execute_register_article;
pub use self::submit::execute_submit;
