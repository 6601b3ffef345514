mod repository;

pub use repository::InMemoryStore;
