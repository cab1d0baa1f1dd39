//! Recording backend used by unit tests.

use std::collections::{HashMap, HashSet};

use super::backend::{RenderBackend, ShaderStage, UniformValue};
use super::shader::uniform_names;
use crate::geometry::Mesh;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Compile(ShaderStage),
    Link(String),
    UseProgram(u32),
    Upload {
        program: u32,
        name: &'static str,
        value: UniformValue,
    },
    CreateMesh {
        id: u32,
        vertices: usize,
        indices: u32,
    },
    DestroyMesh(u32),
    DepthWrite(bool),
    Clear([f32; 4]),
    Draw {
        program: Option<u32>,
        mesh: u32,
        count: u32,
        depth_write: bool,
    },
    Present,
}

#[derive(Debug, Clone, Copy)]
pub struct RecordedLocation {
    pub program: u32,
    pub name: &'static str,
}

#[derive(Debug)]
pub struct RecordedMesh {
    pub id: u32,
}

/// Backend double that records every call in order
#[derive(Debug)]
pub struct RecordingBackend {
    pub calls: Vec<Call>,
    pub fail_compile: Option<ShaderStage>,
    pub fail_link: bool,
    /// Uniform names missing from programs with a given label
    absent: HashMap<String, HashSet<&'static str>>,
    /// Declared uniform names per linked program
    programs: Vec<HashSet<&'static str>>,
    current: Option<u32>,
    depth_write: bool,
    next_mesh: u32,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            fail_compile: None,
            fail_link: false,
            absent: HashMap::new(),
            programs: Vec::new(),
            current: None,
            depth_write: true,
            next_mesh: 0,
        }
    }
}

impl RecordingBackend {
    /// Programs linked under `label` will not declare `names`
    pub fn without_uniforms(mut self, label: &str, names: &[&'static str]) -> Self {
        self.absent
            .entry(label.to_string())
            .or_default()
            .extend(names.iter().copied());
        self
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    pub fn uploads_of(&self, name: &str) -> Vec<(u32, UniformValue)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Upload {
                    program,
                    name: n,
                    value,
                } if *n == name => Some((*program, *value)),
                _ => None,
            })
            .collect()
    }

    pub fn draws(&self) -> Vec<Call> {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Draw { .. }))
            .cloned()
            .collect()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl RenderBackend for RecordingBackend {
    type Shader = ShaderStage;
    type Program = u32;
    type Location = RecordedLocation;
    type Mesh = RecordedMesh;

    fn compile(&mut self, stage: ShaderStage, _source: &str) -> Result<ShaderStage, String> {
        self.calls.push(Call::Compile(stage));
        if self.fail_compile == Some(stage) {
            return Err("error: expected ';', found '}'".to_string());
        }
        Ok(stage)
    }

    fn link(
        &mut self,
        label: &str,
        _vertex: &ShaderStage,
        _fragment: &ShaderStage,
    ) -> Result<u32, String> {
        self.calls.push(Call::Link(label.to_string()));
        if self.fail_link {
            return Err("vertex output location(1) is not consumed by fragment input".to_string());
        }
        let absent = self.absent.get(label).cloned().unwrap_or_default();
        let declared = uniform_names::ALL
            .iter()
            .copied()
            .filter(|name| !absent.contains(name))
            .collect();
        self.programs.push(declared);
        Ok(self.programs.len() as u32 - 1)
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<RecordedLocation> {
        self.programs
            .get(program as usize)?
            .get(name)
            .map(|&name| RecordedLocation { program, name })
    }

    fn use_program(&mut self, program: u32) {
        self.current = Some(program);
        self.calls.push(Call::UseProgram(program));
    }

    fn upload(&mut self, location: RecordedLocation, value: UniformValue) {
        self.calls.push(Call::Upload {
            program: location.program,
            name: location.name,
            value,
        });
    }

    fn create_mesh(&mut self, mesh: &Mesh) -> RecordedMesh {
        let id = self.next_mesh;
        self.next_mesh += 1;
        self.calls.push(Call::CreateMesh {
            id,
            vertices: mesh.vertex_count(),
            indices: mesh.index_count(),
        });
        RecordedMesh { id }
    }

    fn destroy_mesh(&mut self, mesh: RecordedMesh) {
        self.calls.push(Call::DestroyMesh(mesh.id));
    }

    fn set_depth_write(&mut self, enabled: bool) {
        self.depth_write = enabled;
        self.calls.push(Call::DepthWrite(enabled));
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.calls.push(Call::Clear(color));
    }

    fn draw_indexed(&mut self, mesh: &RecordedMesh, count: u32) {
        self.calls.push(Call::Draw {
            program: self.current,
            mesh: mesh.id,
            count,
            depth_write: self.depth_write,
        });
    }

    fn present(&mut self) -> Result<(), String> {
        self.calls.push(Call::Present);
        Ok(())
    }
}
