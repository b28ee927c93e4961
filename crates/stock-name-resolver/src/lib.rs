pub mod resolver;
pub mod source;

pub use resolver::StockNameResolver;
pub use source::NameSource;
