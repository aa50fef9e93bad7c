/// Deepest array/object nesting a reader or writer accepts by default.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Nesting state shared by the reader and the writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scope {
    EmptyDocument,
    NonEmptyDocument,
    EmptyArray,
    NonEmptyArray,
    EmptyObject,
    /// A member name has been read or written and its value is pending.
    DanglingName,
    NonEmptyObject,
}
