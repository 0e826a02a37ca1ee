pub mod assembler;
pub mod attachment;
pub mod error;
pub mod export;
pub mod retriever;
pub mod turn;
