//! GPU buffer management.

use wgpu::util::DeviceExt;

use crate::error::{RenderError, RenderResult};

/// Creates a uniform buffer from data.
pub fn create_uniform_buffer<T: bytemuck::Pod>(
    device: &wgpu::Device,
    data: &T,
    label: Option<&str>,
) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label,
        contents: bytemuck::bytes_of(data),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

/// Creates a read-only storage buffer from data.
pub fn create_storage_buffer<T: bytemuck::Pod>(
    device: &wgpu::Device,
    data: &[T],
    label: Option<&str>,
) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label,
        contents: bytemuck::cast_slice(data),
        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
    })
}

/// Creates an uninitialized buffer of `size` bytes.
///
/// Fails instead of letting wgpu raise a validation error when the size is
/// beyond the device's buffer or storage-binding limits.
pub fn create_sized_buffer(
    device: &wgpu::Device,
    label: &'static str,
    size: u64,
    usage: wgpu::BufferUsages,
) -> RenderResult<wgpu::Buffer> {
    check_buffer_size(&device.limits(), label, size, usage)?;
    log::debug!("creating buffer '{label}' ({size} bytes)");
    Ok(device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage,
        mapped_at_creation: false,
    }))
}

/// Checks `size` against the limits that apply to a buffer with `usage`.
pub fn check_buffer_size(
    limits: &wgpu::Limits,
    label: &'static str,
    size: u64,
    usage: wgpu::BufferUsages,
) -> RenderResult<()> {
    let mut limit = limits.max_buffer_size;
    if usage.contains(wgpu::BufferUsages::STORAGE) {
        limit = limit.min(u64::from(limits.max_storage_buffer_binding_size));
    }
    if size > limit {
        return Err(RenderError::BufferTooLarge { label, size, limit });
    }
    Ok(())
}

/// Updates a buffer with new data.
pub fn update_buffer<T: bytemuck::Pod>(queue: &wgpu::Queue, buffer: &wgpu::Buffer, data: &[T]) {
    queue.write_buffer(buffer, 0, bytemuck::cast_slice(data));
}

/// Copies the first `count` elements of `buffer` back to the CPU.
///
/// Blocks until the GPU has finished. The buffer needs `COPY_SRC` usage.
pub fn read_buffer<T: bytemuck::Pod>(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    buffer: &wgpu::Buffer,
    count: usize,
) -> RenderResult<Vec<T>> {
    let size = (count * std::mem::size_of::<T>()) as u64;
    if size == 0 {
        return Ok(Vec::new());
    }
    if size > buffer.size() {
        return Err(RenderError::ReadbackFailed(format!(
            "requested {size} bytes from a {} byte buffer",
            buffer.size()
        )));
    }

    let staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("readback staging buffer"),
        size,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("readback encoder"),
    });
    encoder.copy_buffer_to_buffer(buffer, 0, &staging_buffer, 0, size);
    queue.submit(std::iter::once(encoder.finish()));

    let buffer_slice = staging_buffer.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });

    device
        .poll(wgpu::PollType::wait_indefinitely())
        .map_err(|e| RenderError::ReadbackFailed(e.to_string()))?;
    rx.recv()
        .map_err(|e| RenderError::ReadbackFailed(e.to_string()))?
        .map_err(|e| RenderError::ReadbackFailed(e.to_string()))?;

    let data = buffer_slice.get_mapped_range();
    let values = bytemuck::cast_slice(&data).to_vec();
    drop(data);
    staging_buffer.unmap();

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_limit_applies_to_storage_usage() {
        let limits = wgpu::Limits {
            max_buffer_size: 1000,
            max_storage_buffer_binding_size: 100,
            ..wgpu::Limits::default()
        };
        let storage = wgpu::BufferUsages::STORAGE;
        let vertex = wgpu::BufferUsages::VERTEX;

        assert!(check_buffer_size(&limits, "a", 100, storage).is_ok());
        assert!(matches!(
            check_buffer_size(&limits, "a", 101, storage),
            Err(RenderError::BufferTooLarge { limit: 100, .. })
        ));
        assert!(check_buffer_size(&limits, "b", 1000, vertex).is_ok());
        assert!(check_buffer_size(&limits, "b", 1001, vertex).is_err());
    }
}
