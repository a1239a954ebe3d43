mod csv_stream;
mod parser;

pub use csv_stream::CsvStream;
