//! Application modules. `books` serves the JSON API, `views` the HTML frontend.

pub mod books;
pub mod views;
