// Matrix data structures, conversions and the reference kernel

pub mod config;
pub mod conversion;
pub mod csc;
pub mod csr;
pub mod dense;
pub mod reference;
pub mod selection;

pub use config::{MultiplyConfig, Strategy};
pub use csc::SparseMatrixCSC;
pub use csr::SparseMatrixCSR;
pub use dense::{zeroed_product, DenseMatrix};
pub use reference::naive_multiply;
pub use selection::{select_strategy, Workload};
