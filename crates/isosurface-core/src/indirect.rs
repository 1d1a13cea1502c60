//! Indirect draw arguments shared between the extraction and render stages.

/// Arguments of an indexed indirect draw, in the layout wgpu reads.
///
/// The extraction stage accumulates `index_count` atomically; the other
/// fields stay fixed.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct IndirectDrawArgs {
    pub index_count: u32,
    pub instance_count: u32,
    pub first_index: u32,
    pub base_vertex: i32,
    pub first_instance: u32,
}

impl IndirectDrawArgs {
    /// Byte size of the argument block.
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    /// The state written before each extraction: nothing drawn, one instance.
    pub const RESET: Self = Self {
        index_count: 0,
        instance_count: 1,
        first_index: 0,
        base_vertex: 0,
        first_instance: 0,
    };

    /// Number of whole triangles.
    #[must_use]
    pub fn triangle_count(&self) -> u32 {
        self.index_count / 3
    }
}

impl Default for IndirectDrawArgs {
    fn default() -> Self {
        Self::RESET
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        assert_eq!(IndirectDrawArgs::SIZE, 20);
        let words: [u32; 5] = bytemuck::cast(IndirectDrawArgs::RESET);
        assert_eq!(words, [0, 1, 0, 0, 0]);
    }

    #[test]
    fn test_triangle_count() {
        let args = IndirectDrawArgs {
            index_count: 30,
            ..IndirectDrawArgs::RESET
        };
        assert_eq!(args.triangle_count(), 10);
    }
}
