pub mod loan_writer;
pub mod operation_reader;
