//! Offscreen targets of the deferred pipeline.

use crate::errors::*;
use crate::math::Vector2;
use crate::video::prelude::*;

/// The G-buffer, the HDR target sharing its depth, and the 1×1 exposure probe.
pub struct Framebuffers {
    size: Vector2<u32>,
    pub albedo_metalness: TextureHandle,
    pub normal_roughness: TextureHandle,
    pub depth: TextureHandle,
    pub hdr: TextureHandle,
    pub probe: TextureHandle,
    pub geometry: FramebufferHandle,
    pub lighting: FramebufferHandle,
    pub exposure: FramebufferHandle,
    guard: ResourceGuard,
}

fn target(format: TextureFormat, width: u32, height: u32) -> TextureParams {
    TextureParams {
        filter: TextureFilter::Nearest,
        ..TextureParams::new(format, width, height)
    }
}

impl Framebuffers {
    pub fn new(
        device: &mut Device,
        width: u32,
        height: u32,
        high_precision_albedo: bool,
    ) -> Result<Self> {
        let mut guard = ResourceGuard::new();
        match Self::allocate(device, &mut guard, width, height, high_precision_albedo) {
            Ok(mut v) => {
                v.guard = guard;
                debug!("Created scene framebuffers of {}x{}.", width, height);
                Ok(v)
            }
            Err(err) => {
                guard.release(device)?;
                Err(err)
            }
        }
    }

    fn allocate(
        device: &mut Device,
        guard: &mut ResourceGuard,
        width: u32,
        height: u32,
        high_precision_albedo: bool,
    ) -> Result<Self> {
        let (w, h) = (width.max(1), height.max(1));
        let albedo_format = if high_precision_albedo {
            TextureFormat::RGBA32F
        } else {
            TextureFormat::RGBA8
        };

        let albedo_metalness = guard.create_texture(device, target(albedo_format, w, h), None)?;
        let normal_roughness =
            guard.create_texture(device, target(TextureFormat::RGBA32F, w, h), None)?;
        let depth = guard.create_texture(device, target(TextureFormat::Depth32, w, h), None)?;
        let hdr = guard.create_texture(device, target(TextureFormat::RGBA32F, w, h), None)?;
        let probe = guard.create_texture(device, target(TextureFormat::RGBA32F, 1, 1), None)?;

        let params = FramebufferParams::new()
            .with_color(albedo_metalness)
            .with_color(normal_roughness)
            .with_depth(depth);
        let geometry = guard.create_framebuffer(device, params)?;

        let params = FramebufferParams::new().with_color(hdr).with_depth(depth);
        let lighting = guard.create_framebuffer(device, params)?;

        let params = FramebufferParams::new().with_color(probe);
        let exposure = guard.create_framebuffer(device, params)?;

        Ok(Framebuffers {
            size: Vector2::new(w, h),
            albedo_metalness,
            normal_roughness,
            depth,
            hdr,
            probe,
            geometry,
            lighting,
            exposure,
            guard: ResourceGuard::new(),
        })
    }

    #[inline]
    pub fn size(&self) -> Vector2<u32> {
        self.size
    }

    /// The viewport covering the full-size targets.
    #[inline]
    pub fn viewport(&self) -> Viewport {
        Viewport::with_size(self.size.x, self.size.y)
    }

    pub fn delete(mut self, device: &mut Device) -> Result<()> {
        self.guard.release(device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_is_shared() {
        let mut device = Device::headless();
        let fbs = Framebuffers::new(&mut device, 64, 32, false).unwrap();

        let geometry = device.framebuffer(fbs.geometry).unwrap().clone();
        let lighting = device.framebuffer(fbs.lighting).unwrap().clone();
        assert_eq!(geometry.depth, Some(fbs.depth));
        assert_eq!(lighting.depth, Some(fbs.depth));
        assert_eq!(geometry.colors.len(), 2);

        let albedo = device.texture(fbs.albedo_metalness).unwrap();
        assert_eq!(albedo.format, TextureFormat::RGBA8);
        assert_eq!(
            device.framebuffer_dimensions(fbs.exposure),
            Some(Vector2::new(1, 1))
        );

        let hdr = fbs.hdr;
        fbs.delete(&mut device).unwrap();
        assert!(device.texture(hdr).is_none());
    }

    #[test]
    fn high_precision_albedo() {
        let mut device = Device::headless();
        let fbs = Framebuffers::new(&mut device, 8, 8, true).unwrap();
        let albedo = device.texture(fbs.albedo_metalness).unwrap();
        assert_eq!(albedo.format, TextureFormat::RGBA32F);
        fbs.delete(&mut device).unwrap();
    }
}
