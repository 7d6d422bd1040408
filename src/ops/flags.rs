//! Modifier flags (§4.4.1): orthogonal knobs a caller attaches to an
//! opcode invocation. Opcodes that don't interpret a given bit simply
//! ignore it.

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ModifierFlags: u32 {
        /// Trust caller-supplied items as already living in this arena.
        const DONT_INTERNALIZE = 1 << 0;
        /// Recursively validate the result before returning it.
        const DEEP_VALIDATE    = 1 << 1;
        /// Skip argument validation (trusted callers only).
        const NO_CHECKS        = 1 << 2;
        /// Execute filter/map/reduce via the supplied worker pool.
        const PARALLEL         = 1 << 3;
        /// For mappings, the supplied count is flat items (key+value),
        /// not pairs.
        const MAP_ITEM_COUNT   = 1 << 4;
        /// The supplied callback is a closure type, not a function pointer.
        const BLOCK_FN         = 1 << 5;
        /// For set_at_path, create missing intermediate collections.
        const CREATE_PATH      = 1 << 6;
        /// For create_int, interpret the magnitude as unsigned.
        const UNSIGNED         = 1 << 7;
    }
}
