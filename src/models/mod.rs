pub mod meeting;
pub mod rating;
