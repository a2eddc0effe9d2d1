//! Empty on purpose: this crate exists only to host cross-crate
//! integration tests under `tests/`, the way the teacher's top-level
//! `tests/shadow_fs/` fixture crate carries no library code of its own.
