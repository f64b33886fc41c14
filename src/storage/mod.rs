pub mod codec;
pub mod file;
pub mod memory;
pub mod repository;
pub mod traits;

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use repository::ListingRepository;
pub use traits::KeyValueStorage;
