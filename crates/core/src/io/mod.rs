//! I/O operations for reading and writing node tables

mod json;

pub use json::{
    node_table_to_string, read_node_table, read_node_table_from_str, terminal_table_to_string,
    write_node_table, write_terminal_table, LoadedTable, TERMINAL_ID_COLUMN,
};
