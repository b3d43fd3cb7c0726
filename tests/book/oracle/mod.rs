//! Oracle chapter

mod verdicts;
