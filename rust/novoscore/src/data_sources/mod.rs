pub mod tables;

pub use tables::{
    TableRow,
    read_inclusion_list,
    read_parsed_table,
    write_tsv,
};
