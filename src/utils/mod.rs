mod csv_export;

pub use csv_export::{save_table_to_csv, write_table_csv};
