pub mod csv;
pub mod stream;

pub use csv::CsvStream;
pub use stream::Stream;
