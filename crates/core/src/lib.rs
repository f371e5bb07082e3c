//! Agora core types and form validation

pub mod forms;
pub mod types;
pub mod validation;

pub use types::{
    Author, Category, Page, PageMeta, Post, Role, Thread, User, VoteDirection,
};
pub use validation::{FormValidator, ValidationResult, ValidationRule, has_errors};
