//! Pointer-to-identifier conventions shared by every emitter.
//!
//! Grounded on `target/python.py`'s `Builder.pointer_to_state_label`
//! (`'_'.join(path)`) and `target/c.py`'s identical convention, and on
//! `codegen/utils.rs`'s shared identifier-building helpers in the teacher.

use hfsmc_core::Pointer;

/// A label for `pointer` suitable as an identifier in a target language:
/// its path joined by underscores, e.g. `/door/open` -> `door_open`.
pub fn state_label(pointer: &Pointer) -> String {
    pointer.path().join("_")
}

/// The upper-snake-case constant form of [`state_label`], e.g. `DOOR_OPEN`.
pub fn state_constant(pointer: &Pointer) -> String {
    state_label(pointer).to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_path_segments_with_underscore() {
        let pointer = Pointer::parse("/door/open/ajar").unwrap();
        assert_eq!(state_label(&pointer), "door_open_ajar");
        assert_eq!(state_constant(&pointer), "DOOR_OPEN_AJAR");
    }
}
