pub mod file;
pub mod traits;

pub use file::JsonFileProvider;
pub use traits::PriceProvider;
