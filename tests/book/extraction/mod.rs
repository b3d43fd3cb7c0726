//! Extraction chapter

mod units;
