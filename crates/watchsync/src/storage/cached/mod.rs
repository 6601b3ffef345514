mod entries;

pub use entries::CachedEntryStore;
