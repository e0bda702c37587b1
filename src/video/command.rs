//! Deferred command recording.

use crate::errors::*;
use crate::math::{Matrix4, Vector3, Vector4};

use super::assets::prelude::*;

/// A value written to a uniform location.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValue {
    I32(i32),
    F32(f32),
    Vector3f([f32; 3]),
    Vector4f([f32; 4]),
    Matrix4f([[f32; 4]; 4]),
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Command {
    BindPipeline(PipelineHandle),
    Uniform(UniformLocation, UniformValue),
    TextureUnit(u32, TextureHandle),
    Draw {
        offset: u32,
        count: u32,
        instances: u32,
    },
    DrawIndexed {
        offset: u32,
        count: u32,
        instances: u32,
    },
}

/// An ordered recording of pipeline binds, uniform writes, texture bindings and
/// draws. Nothing executes until the queue is submitted to a `Device` inside a
/// render pass; submission empties the queue.
///
/// Uniforms and textures apply to the program of the last bound pipeline, so
/// recording them (or a draw) before any `bind_pipeline` is an error.
#[derive(Debug, Default, Clone)]
pub struct CommandQueue {
    commands: Vec<Command>,
    pipeline: Option<PipelineHandle>,
}

impl CommandQueue {
    pub fn new() -> Self {
        CommandQueue {
            commands: Vec::with_capacity(64),
            pipeline: None,
        }
    }

    #[inline]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// The pipeline that subsequent uniform and draw commands apply to.
    #[inline]
    pub fn active_pipeline(&self) -> Option<PipelineHandle> {
        self.pipeline
    }

    /// Drops every recorded command and forgets the active pipeline.
    pub fn reset(&mut self) {
        self.commands.clear();
        self.pipeline = None;
    }

    pub fn bind_pipeline(&mut self, pipeline: PipelineHandle) {
        self.pipeline = Some(pipeline);
        self.commands.push(Command::BindPipeline(pipeline));
    }

    #[inline]
    fn active(&self) -> Result<()> {
        if self.pipeline.is_none() {
            return Err(Invariant::NoActivePipeline.into());
        }

        Ok(())
    }

    pub fn uniform(&mut self, location: UniformLocation, value: UniformValue) -> Result<()> {
        self.active()?;
        if !location.is_none() {
            self.commands.push(Command::Uniform(location, value));
        }

        Ok(())
    }

    #[inline]
    pub fn uniform_1i(&mut self, location: UniformLocation, v: i32) -> Result<()> {
        self.uniform(location, UniformValue::I32(v))
    }

    #[inline]
    pub fn uniform_1f(&mut self, location: UniformLocation, v: f32) -> Result<()> {
        self.uniform(location, UniformValue::F32(v))
    }

    #[inline]
    pub fn uniform_3f(&mut self, location: UniformLocation, v: Vector3<f32>) -> Result<()> {
        self.uniform(location, UniformValue::Vector3f(v.into()))
    }

    #[inline]
    pub fn uniform_4f(&mut self, location: UniformLocation, v: Vector4<f32>) -> Result<()> {
        self.uniform(location, UniformValue::Vector4f(v.into()))
    }

    #[inline]
    pub fn uniform_matrix_4f(&mut self, location: UniformLocation, m: &Matrix4<f32>) -> Result<()> {
        self.uniform(location, UniformValue::Matrix4f((*m).into()))
    }

    pub fn texture_unit(&mut self, slot: u32, texture: TextureHandle) -> Result<()> {
        self.active()?;
        self.commands.push(Command::TextureUnit(slot, texture));
        Ok(())
    }

    /// Draws `count` vertices starting at vertex `offset`.
    pub fn draw(&mut self, offset: u32, count: u32, instances: u32) -> Result<()> {
        self.active()?;
        self.commands.push(Command::Draw {
            offset,
            count,
            instances,
        });
        Ok(())
    }

    /// Draws `count` indices starting at index `offset` of the bound index buffer.
    pub fn draw_indexed(&mut self, offset: u32, count: u32, instances: u32) -> Result<()> {
        self.active()?;
        self.commands.push(Command::DrawIndexed {
            offset,
            count,
            instances,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_pipeline() {
        let mut queue = CommandQueue::new();
        let loc = UniformLocation::new(0);

        let err = queue.uniform_1i(loc, 1).unwrap_err();
        assert_eq!(err.invariant(), Some(Invariant::NoActivePipeline));
        assert!(queue.draw(0, 3, 1).is_err());
        assert!(queue.texture_unit(0, TextureHandle::default()).is_err());
        assert!(queue.is_empty());

        queue.bind_pipeline(PipelineHandle::default());
        queue.uniform_1i(loc, 1).unwrap();
        queue.draw(0, 3, 1).unwrap();
        assert_eq!(queue.len(), 3);

        queue.reset();
        assert!(queue.is_empty());
        assert!(queue.active_pipeline().is_none());
    }

    #[test]
    fn sentinel_location_is_dropped() {
        let mut queue = CommandQueue::new();
        queue.bind_pipeline(PipelineHandle::default());
        queue.uniform_1f(UniformLocation::NONE, 1.0).unwrap();
        assert_eq!(queue.commands(), &[Command::BindPipeline(PipelineHandle::default())]);
    }
}
