//! Candidate filters.

pub mod genre;
pub mod media_type;

pub use genre::GenreFilter;
pub use media_type::MediaTypeFilter;
