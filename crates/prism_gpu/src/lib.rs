//! Prism GPU - the ray tracer as a wgpu compute kernel.
//!
//! The scene is flattened into storage buffers once, then the image is
//! traced in batches of pixels so progress can be reported between
//! dispatches. Arithmetic is f32 on the device, so tolerances are raised to
//! values f32 can resolve and results match the CPU strategies only up to
//! rounding and jitter.

mod scene_data;

use std::sync::mpsc;

use log::{debug, info};
use prism_renderer::{Camera, ProgressSink, ProgressTracker, Raster, RenderError, Scene};
use thiserror::Error;
use wgpu::util::DeviceExt;

pub use scene_data::{
    padded, GpuLight, GpuMaterial, GpuMesh, GpuParams, GpuPlane, GpuSphere, GpuTriangle, SceneData,
    MIN_GPU_LIFT, MIN_GPU_SHADOW_TOLERANCE,
};

const WORKGROUP_SIZE: u32 = 64;
const BATCHES: u32 = 20;
const MAX_WORKGROUPS: u32 = 65_535;

#[derive(Error, Debug)]
pub enum GpuError {
    #[error("no suitable GPU adapter found")]
    NoAdapter,

    #[error("failed to create GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("failed to read back render output: {0}")]
    Readback(#[from] wgpu::BufferAsyncError),

    #[error("GPU readback was dropped before completing")]
    ReadbackLost,

    #[error("{what} needs {bytes} bytes but the device allows {limit}")]
    TooLarge { what: &'static str, bytes: u64, limit: u64 },

    #[error(transparent)]
    Render(#[from] RenderError),
}

pub type GpuResult<T> = Result<T, GpuError>;

/// A compute device with the tracing pipeline compiled and ready.
pub struct GpuRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::ComputePipeline,
    layout: wgpu::BindGroupLayout,
    adapter_name: String,
}

impl GpuRenderer {
    /// Blocking wrapper around [`GpuRenderer::new_async`].
    pub fn new() -> GpuResult<Self> {
        pollster::block_on(Self::new_async())
    }

    pub async fn new_async() -> GpuResult<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;
        let adapter_name = adapter.get_info().name;
        info!("Using GPU adapter: {}", adapter_name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Prism Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Prism Trace Kernel"),
            source: wgpu::ShaderSource::Wgsl(include_str!("trace.wgsl").into()),
        });

        let mut entries = vec![wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }];
        entries.extend((1..=6).map(|binding| storage_entry(binding, true)));
        entries.push(storage_entry(7, false));

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Prism Scene Layout"),
            entries: &entries,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Prism Pipeline Layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Prism Trace Pipeline"),
            layout: Some(&pipeline_layout),
            module: &module,
            entry_point: "main",
            compilation_options: Default::default(),
            cache: None,
        });

        Ok(Self {
            device,
            queue,
            pipeline,
            layout,
            adapter_name,
        })
    }

    pub fn adapter_name(&self) -> &str {
        &self.adapter_name
    }

    /// Trace `scene` through `camera` on the device.
    ///
    /// The camera is validated before anything is uploaded.
    pub fn render(&self, scene: &Scene, camera: &Camera, progress: &dyn ProgressSink) -> GpuResult<Raster> {
        camera.validate()?;
        let viewport = camera.viewport();
        let pixel_count = viewport.pixel_count() as u32;

        let data = SceneData::from_scene(scene);
        let params = GpuParams::new(scene, &data, &viewport, camera.max_depth, camera.seed);
        debug!(
            "GPU scene: {} spheres, {} planes, {} meshes, {} triangles, {} lights",
            data.spheres.len(),
            data.planes.len(),
            data.meshes.len(),
            data.triangles.len(),
            data.lights.len()
        );

        let params_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Prism Params"),
            contents: bytemuck::bytes_of(&params),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let scene_buffers = [
            self.storage_buffer("materials", &padded(&data.materials))?,
            self.storage_buffer("spheres", &padded(&data.spheres))?,
            self.storage_buffer("planes", &padded(&data.planes))?,
            self.storage_buffer("meshes", &padded(&data.meshes))?,
            self.storage_buffer("triangles", &padded(&data.triangles))?,
            self.storage_buffer("lights", &padded(&data.lights))?,
        ];

        let output_size = u64::from(pixel_count) * 4;
        self.check_storage_size("pixels", output_size)?;
        let output = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Prism Pixels"),
            size: output_size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let mut entries = vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: params_buffer.as_entire_binding(),
        }];
        entries.extend(scene_buffers.iter().zip(1..).map(|(buffer, binding)| wgpu::BindGroupEntry {
            binding,
            resource: buffer.as_entire_binding(),
        }));
        entries.push(wgpu::BindGroupEntry {
            binding: 7,
            resource: output.as_entire_binding(),
        });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Prism Scene Bind Group"),
            layout: &self.layout,
            entries: &entries,
        });

        let batch_size = pixel_count
            .div_ceil(BATCHES)
            .clamp(WORKGROUP_SIZE, WORKGROUP_SIZE * MAX_WORKGROUPS);
        let tracker = ProgressTracker::new(pixel_count as usize, progress);

        let mut start = 0;
        while start < pixel_count {
            let end = start.saturating_add(batch_size).min(pixel_count);
            let batch_params = params.with_batch(start, end);
            self.queue
                .write_buffer(&params_buffer, 0, bytemuck::bytes_of(&batch_params));

            let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Prism Trace Encoder"),
            });
            {
                let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                    label: Some("Prism Trace Pass"),
                    timestamp_writes: None,
                });
                pass.set_pipeline(&self.pipeline);
                pass.set_bind_group(0, &bind_group, &[]);
                pass.dispatch_workgroups((end - start).div_ceil(WORKGROUP_SIZE), 1, 1);
            }
            self.queue.submit(Some(encoder.finish()));
            self.device.poll(wgpu::Maintain::Wait);

            tracker.advance((end - start) as usize);
            start = end;
        }

        let pixels = self.read_pixels(&output, output_size)?;
        tracker.finish();
        Ok(Raster::from_pixels(viewport.width_px, viewport.height_px, pixels)?)
    }

    fn storage_buffer<T: bytemuck::Pod>(&self, what: &'static str, items: &[T]) -> GpuResult<wgpu::Buffer> {
        let contents: &[u8] = bytemuck::cast_slice(items);
        self.check_storage_size(what, contents.len() as u64)?;
        Ok(self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(what),
            contents,
            usage: wgpu::BufferUsages::STORAGE,
        }))
    }

    fn check_storage_size(&self, what: &'static str, bytes: u64) -> GpuResult<()> {
        let limits = self.device.limits();
        let limit = u64::from(limits.max_storage_buffer_binding_size).min(limits.max_buffer_size);
        if bytes > limit {
            return Err(GpuError::TooLarge { what, bytes, limit });
        }
        Ok(())
    }

    /// Copy the packed `0x00BBGGRR` pixels back to the host.
    fn read_pixels(&self, output: &wgpu::Buffer, size: u64) -> GpuResult<Vec<[u8; 3]>> {
        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Prism Readback"),
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Prism Readback Encoder"),
        });
        encoder.copy_buffer_to_buffer(output, 0, &staging, 0, size);
        self.queue.submit(Some(encoder.finish()));

        let slice = staging.slice(..);
        let (sender, receiver) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);
        receiver.recv().map_err(|_| GpuError::ReadbackLost)??;

        let pixels = {
            let view = slice.get_mapped_range();
            let packed: &[u32] = bytemuck::cast_slice(&view[..]);
            packed.iter().map(|&rgb| unpack_rgb(rgb)).collect()
        };
        staging.unmap();
        Ok(pixels)
    }
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn unpack_rgb(packed: u32) -> [u8; 3] {
    let [r, g, b, _] = packed.to_le_bytes();
    [r, g, b]
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_core::{Material, BLANK};
    use prism_math::Vec3;
    use prism_renderer::{render, NoProgress, PointLight, Sphere, Strategy};

    #[test]
    fn test_unpack_rgb() {
        assert_eq!(unpack_rgb(0x00_33_22_11), [0x11, 0x22, 0x33]);
        assert_eq!(unpack_rgb(0x00_FF_00_00), [0, 0, 255]);
    }

    #[test]
    fn test_storage_entry_access() {
        let entry = storage_entry(3, false);
        assert_eq!(entry.binding, 3);
        assert!(matches!(
            entry.ty,
            wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only: false },
                ..
            }
        ));
    }

    #[test]
    #[ignore = "needs a GPU adapter"]
    fn test_gpu_matches_cpu_on_simple_scene() {
        let scene = Scene::new(
            vec![Sphere::new(
                Vec3::new(0.0, 0.0, 20.0),
                5.0,
                Vec3::new(1.0, 0.0, 0.0),
                Material::default(),
            )
            .into()],
            vec![PointLight::new(Vec3::new(10.0, 10.0, 10.0), Vec3::ONE, 0.8).into()],
        )
        .with_background(BLANK);
        let camera = Camera::new().with_resolution(32).with_quality(1, 3);

        let gpu = GpuRenderer::new().expect("GPU adapter");
        let gpu_raster = gpu.render(&scene, &camera, &NoProgress).expect("GPU render");
        let cpu_raster = render(&scene, &camera, Strategy::Sequential, &NoProgress).expect("CPU render");

        assert_eq!(gpu_raster.width(), cpu_raster.width());
        let close = gpu_raster
            .pixels()
            .iter()
            .zip(cpu_raster.pixels())
            .filter(|(g, c)| g.iter().zip(c.iter()).all(|(a, b)| (*a as i32 - *b as i32).abs() <= 2))
            .count();
        // Silhouette pixels may flip under f32 rounding.
        assert!(close as f64 >= 0.95 * cpu_raster.pixels().len() as f64);
    }
}
