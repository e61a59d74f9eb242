pub mod output;
pub mod stream;
pub mod table;

pub use output::{format_g, write_predictions};
pub use stream::{create_writer, open_reader, STDIO_PATH};
pub use table::{read_table, parse_table, shuffle_together, Table};
