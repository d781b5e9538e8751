//! Domain models for the book-exchange service.

pub mod book;
pub mod category;
pub mod user;

pub use book::Book;
pub use category::Category;
pub use user::User;
