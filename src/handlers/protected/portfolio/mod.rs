mod summary;

pub use summary::summary;
