pub mod assembler;

pub use assembler::LatexResumeAssembler;
