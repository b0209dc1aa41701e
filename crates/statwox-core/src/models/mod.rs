pub mod answer;
pub mod comment;
pub mod question;
pub mod response;
pub mod survey;
pub mod user;
