//! Fault injection chapter

mod archetypes;
