//! Device-parallel execution on a wgpu compute adapter.
//!
//! Kernels run in `f32`; results are read back and handed to the same
//! coloring code as host renders.

use std::time::Instant;

use bytemuck::{Pod, Zeroable};
use tracing::{debug, info};

use fractalgen_core::{
    BuddhabrotParams, ExecutionStrategy, Fractal, IterationResult, JuliaMapping, PlaneRegion,
    RenderRequest, Viewport, ESCAPE_RADIUS_SQ, TRAJECTORY_RADIUS_SQ,
};

use crate::buddhabrot::BuddhabrotResult;
use crate::histogram::OrbitHistogram;
use crate::iteration_buffer::IterationBuffer;
use crate::{RenderError, Result};

const ESCAPE_TIME_SHADER: &str = include_str!("shaders/escape_time.wgsl");
const BUDDHABROT_SHADER: &str = include_str!("shaders/buddhabrot.wgsl");

/// Side of the square escape-time workgroup.
const ESCAPE_WORKGROUP: u32 = 16;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct EscapeParams {
    width: u32,
    height: u32,
    max_iterations: u32,
    variant: u32,
    re_min: f32,
    re_max: f32,
    im_min: f32,
    im_max: f32,
    c_re: f32,
    c_im: f32,
    radius_sq: f32,
    _pad: f32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct DensityParams {
    width: u32,
    height: u32,
    max_iterations: u32,
    min_iterations: u32,
    re_min: f32,
    re_max: f32,
    im_min: f32,
    im_max: f32,
    samples_per_thread: u32,
    seed_lo: u32,
    seed_hi: u32,
    radius_sq: f32,
}

/// One compute dispatch: a shader, its uniform block and the size of the
/// single read-write storage buffer it fills.
struct ComputeJob<'a> {
    label: &'a str,
    shader: &'a str,
    params: &'a [u8],
    output_size: u64,
    workgroups: (u32, u32),
}

/// An open compute device and its submission queue.
pub struct DeviceContext {
    device: wgpu::Device,
    queue: wgpu::Queue,
    adapter_name: String,
}

impl DeviceContext {
    /// Open the highest-performance adapter available.
    ///
    /// Fails with [`RenderError::DeviceUnavailable`] when no adapter exists
    /// or it refuses to open a device.
    pub fn new() -> Result<Self> {
        let instance = wgpu::Instance::default();
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            compatible_surface: None,
        }))
        .ok_or_else(|| RenderError::DeviceUnavailable("no compatible adapter found".into()))?;

        let info = adapter.get_info();
        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("fractalgen"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
            },
            None,
        ))
        .map_err(|e| RenderError::DeviceUnavailable(e.to_string()))?;

        debug!(adapter = %info.name, backend = ?info.backend, "Compute device ready");
        Ok(Self {
            device,
            queue,
            adapter_name: info.name,
        })
    }

    /// Run an escape-time variant with one invocation per pixel.
    pub fn render_escape_time(&self, request: &RenderRequest) -> Result<IterationBuffer> {
        let start = Instant::now();
        let (variant, c) = match request.fractal {
            Fractal::Mandelbrot => (0, None),
            Fractal::BurningShip => (1, None),
            Fractal::Julia {
                c,
                mapping: JuliaMapping::Centered,
            } => (2, Some(c)),
            Fractal::Julia {
                c,
                mapping: JuliaMapping::Region,
            } => (3, Some(c)),
            Fractal::Buddhabrot(_) => {
                return Err(RenderError::Device(
                    "Buddhabrot is not an escape-time variant".into(),
                ))
            }
        };
        let Viewport { width, height } = request.viewport;
        let region = &request.region;
        let params = EscapeParams {
            width,
            height,
            max_iterations: request.max_iterations,
            variant,
            re_min: region.re_min as f32,
            re_max: region.re_max as f32,
            im_min: region.im_min as f32,
            im_max: region.im_max as f32,
            c_re: c.map_or(0.0, |c| c.re as f32),
            c_im: c.map_or(0.0, |c| c.im as f32),
            radius_sq: ESCAPE_RADIUS_SQ as f32,
            _pad: 0.0,
        };

        let bytes = self.run(ComputeJob {
            label: "escape_time",
            shader: ESCAPE_TIME_SHADER,
            params: bytemuck::bytes_of(&params),
            output_size: request.viewport.pixel_count() as u64 * 8,
            workgroups: (
                width.div_ceil(ESCAPE_WORKGROUP),
                height.div_ceil(ESCAPE_WORKGROUP),
            ),
        })?;

        let max = request.max_iterations;
        let mut iterations = IterationBuffer::new(width, height, max);
        for (slot, raw) in iterations.data.iter_mut().zip(bytes.chunks_exact(8)) {
            let n = u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
            let norm_sq = f32::from_le_bytes([raw[4], raw[5], raw[6], raw[7]]);
            *slot = if n >= max {
                IterationResult::Interior
            } else {
                IterationResult::Escaped {
                    iterations: n,
                    norm_sq: norm_sq as f64,
                }
            };
        }

        info!(
            elapsed_ms = start.elapsed().as_millis(),
            adapter = %self.adapter_name,
            interior = iterations.interior_count(),
            "Device escape-time render complete"
        );
        Ok(iterations)
    }

    /// Accumulate a Buddhabrot histogram with `device_blocks × 256`
    /// invocations drawing `samples_per_thread` samples each.
    pub fn accumulate_buddhabrot(
        &self,
        viewport: &Viewport,
        region: &PlaneRegion,
        max_iterations: u32,
        params: &BuddhabrotParams,
    ) -> Result<BuddhabrotResult> {
        let start = Instant::now();
        let max_groups = self.device.limits().max_compute_workgroups_per_dimension;
        if params.device_blocks > max_groups {
            return Err(RenderError::Device(format!(
                "device_blocks {} exceeds the adapter limit of {max_groups}",
                params.device_blocks
            )));
        }

        let uniforms = DensityParams {
            width: viewport.width,
            height: viewport.height,
            max_iterations,
            min_iterations: params.min_iterations,
            re_min: region.re_min as f32,
            re_max: region.re_max as f32,
            im_min: region.im_min as f32,
            im_max: region.im_max as f32,
            samples_per_thread: params.samples_per_thread,
            seed_lo: params.seed as u32,
            seed_hi: (params.seed >> 32) as u32,
            radius_sq: TRAJECTORY_RADIUS_SQ as f32,
        };
        let samples_drawn = params.effective_samples(ExecutionStrategy::Device);
        debug!(
            blocks = params.device_blocks,
            samples_per_thread = params.samples_per_thread,
            samples_drawn,
            "Starting device Buddhabrot"
        );

        // One accepted-sample counter followed by the cells.
        let cells = viewport.pixel_count();
        let bytes = self.run(ComputeJob {
            label: "buddhabrot",
            shader: BUDDHABROT_SHADER,
            params: bytemuck::bytes_of(&uniforms),
            output_size: (cells as u64 + 1) * 4,
            workgroups: (params.device_blocks, 1),
        })?;

        let mut words = bytes
            .chunks_exact(4)
            .map(|w| u32::from_le_bytes([w[0], w[1], w[2], w[3]]));
        let samples_accepted = words.next().unwrap_or(0) as u64;
        let counts: Vec<u32> = words.collect();
        let histogram = OrbitHistogram::from_counts(viewport.width, viewport.height, counts);

        let elapsed = start.elapsed();
        info!(
            elapsed_ms = elapsed.as_millis(),
            adapter = %self.adapter_name,
            samples_drawn,
            samples_accepted,
            mass = histogram.total(),
            "Device Buddhabrot accumulation complete"
        );
        Ok(BuddhabrotResult {
            histogram,
            samples_drawn,
            samples_accepted,
            elapsed,
        })
    }

    /// Compile, dispatch and read back a single compute job. The storage
    /// buffer starts zeroed.
    fn run(&self, job: ComputeJob<'_>) -> Result<Vec<u8>> {
        let limit = self.device.limits().max_storage_buffer_binding_size as u64;
        if job.output_size > limit {
            return Err(RenderError::Device(format!(
                "{} output of {} bytes exceeds the storage binding limit of {limit}",
                job.label, job.output_size
            )));
        }

        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(job.label),
                source: wgpu::ShaderSource::Wgsl(job.shader.into()),
            });

        let bind_layout = self
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(job.label),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Storage { read_only: false },
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                ],
            });

        let pipeline_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(job.label),
                bind_group_layouts: &[&bind_layout],
                push_constant_ranges: &[],
            });

        let pipeline = self
            .device
            .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(job.label),
                layout: Some(&pipeline_layout),
                module: &module,
                entry_point: "main",
            });

        let params_buf = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("params"),
            size: job.params.len() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        self.queue.write_buffer(&params_buf, 0, job.params);

        let storage = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("output"),
            size: job.output_size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let readback = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("readback"),
            size: job.output_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(job.label),
            layout: &bind_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: params_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: storage.as_entire_binding(),
                },
            ],
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some(job.label),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some(job.label),
                timestamp_writes: None,
            });
            pass.set_pipeline(&pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(job.workgroups.0, job.workgroups.1, 1);
        }
        encoder.copy_buffer_to_buffer(&storage, 0, &readback, 0, job.output_size);
        self.queue.submit(Some(encoder.finish()));

        let slice = readback.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        let _ = self.device.poll(wgpu::Maintain::Wait);
        receiver
            .recv()
            .map_err(|e| RenderError::Device(format!("{} readback never completed: {e}", job.label)))?
            .map_err(|e| RenderError::Device(format!("{} buffer mapping failed: {e}", job.label)))?;

        let bytes = slice.get_mapped_range().to_vec();
        readback.unmap();
        Ok(bytes)
    }
}
