mod artist;
mod auth;
mod cache;
mod clock;

pub use artist::ArtistStore;
pub use auth::TokenManager;
pub use cache::CacheTtl;
pub use cache::ExpiringCache;
pub use cache::cache_key;
pub use clock::Clock;
pub use clock::ManualClock;
pub use clock::SystemClock;
