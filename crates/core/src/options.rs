#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// Containers nested deeper than this have their line remainder
    /// treated as literal paragraph text instead of recursing further.
    pub max_container_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            max_container_depth: 10,
        }
    }
}
