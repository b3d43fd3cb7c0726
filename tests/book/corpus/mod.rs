//! Corpus chapter

mod assembly;
mod export;
