mod ll_parser;

pub use ll_parser::generate;
