pub mod content;
pub mod content_country;
pub mod content_genre;
pub mod content_type;
pub mod content_voice_author;
pub mod country;
pub mod genre;
pub mod rating;
pub mod season;
pub mod voice_author;
