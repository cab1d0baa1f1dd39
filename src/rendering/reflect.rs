//! WGSL parsing, validation and uniform-block reflection via naga.
//!
//! Each stage declares its parameters as one struct bound at
//! `@group(0) @binding(0) var<uniform>`. Member names are the uniform names
//! and member offsets are the slots.

use std::collections::HashMap;
use std::error::Error as StdError;

use naga::front::wgsl;
use naga::valid::{Capabilities, ValidationFlags, Validator};

use super::backend::{ShaderStage, UniformKind};

/// One member of the uniform struct
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformField {
    pub kind: UniformKind,
    pub offset: u32,
}

/// Layout of a stage's uniform struct
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformBlock {
    /// Struct size in bytes
    pub span: u32,
    pub fields: HashMap<String, UniformField>,
}

/// What the backend needs to know about a compiled stage
#[derive(Debug, Clone)]
pub struct StageReflection {
    pub entry_point: String,
    pub uniforms: Option<UniformBlock>,
}

/// Parse, validate and reflect one stage
///
/// Errors are rendered against `source` so they read like compiler output.
pub fn reflect_stage(stage: ShaderStage, source: &str) -> Result<StageReflection, String> {
    let module = wgsl::parse_str(source).map_err(|e| e.emit_to_string(source))?;

    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|e| describe(&e))?;

    let wanted = match stage {
        ShaderStage::Vertex => naga::ShaderStage::Vertex,
        ShaderStage::Fragment => naga::ShaderStage::Fragment,
    };
    let entry_point = module
        .entry_points
        .iter()
        .find(|ep| ep.stage == wanted)
        .map(|ep| ep.name.clone())
        .ok_or_else(|| format!("no {} entry point in module", stage))?;

    Ok(StageReflection {
        entry_point,
        uniforms: uniform_block(&module),
    })
}

/// Combine the vertex and fragment blocks into the program's block
///
/// Both stages read the same buffer, so shared members must agree.
pub fn merge_blocks(
    vertex: Option<&UniformBlock>,
    fragment: Option<&UniformBlock>,
) -> Result<Option<UniformBlock>, String> {
    match (vertex, fragment) {
        (None, None) => Ok(None),
        (Some(block), None) | (None, Some(block)) => Ok(Some(block.clone())),
        (Some(vs), Some(fs)) => {
            if vs.span != fs.span {
                return Err(format!(
                    "uniform block size differs between stages: {} vs {} bytes",
                    vs.span, fs.span
                ));
            }
            let mut fields = vs.fields.clone();
            for (name, field) in &fs.fields {
                match fields.get(name) {
                    Some(existing) if existing != field => {
                        return Err(format!(
                            "uniform '{}' differs between stages: {:?} at {} vs {:?} at {}",
                            name, existing.kind, existing.offset, field.kind, field.offset
                        ));
                    }
                    Some(_) => {}
                    None => {
                        fields.insert(name.clone(), *field);
                    }
                }
            }
            Ok(Some(UniformBlock {
                span: vs.span,
                fields,
            }))
        }
    }
}

fn uniform_block(module: &naga::Module) -> Option<UniformBlock> {
    let (_, var) = module.global_variables.iter().find(|(_, var)| {
        var.space == naga::AddressSpace::Uniform
            && matches!(var.binding, Some(naga::ResourceBinding { group: 0, binding: 0 }))
    })?;

    let naga::TypeInner::Struct { ref members, span } = module.types[var.ty].inner else {
        return None;
    };

    let fields = members
        .iter()
        .filter_map(|member| {
            let name = member.name.clone()?;
            match kind_of(&module.types[member.ty].inner) {
                Some(kind) => Some((
                    name,
                    UniformField {
                        kind,
                        offset: member.offset,
                    },
                )),
                None => {
                    log::debug!("Uniform member '{}' has an unsupported type", name);
                    None
                }
            }
        })
        .collect();

    Some(UniformBlock { span, fields })
}

fn kind_of(inner: &naga::TypeInner) -> Option<UniformKind> {
    use naga::{Scalar, ScalarKind, TypeInner, VectorSize};

    const F32: Scalar = Scalar {
        kind: ScalarKind::Float,
        width: 4,
    };
    const I32: Scalar = Scalar {
        kind: ScalarKind::Sint,
        width: 4,
    };

    match *inner {
        TypeInner::Scalar(s) if s == F32 => Some(UniformKind::Float),
        TypeInner::Scalar(s) if s == I32 => Some(UniformKind::Int),
        TypeInner::Vector {
            size: VectorSize::Bi,
            scalar,
        } if scalar == F32 => Some(UniformKind::Vec2),
        TypeInner::Vector {
            size: VectorSize::Quad,
            scalar,
        } if scalar == F32 => Some(UniformKind::Vec4),
        TypeInner::Matrix {
            columns: VectorSize::Quad,
            rows: VectorSize::Quad,
            scalar,
        } if scalar == F32 => Some(UniformKind::Mat4),
        _ => None,
    }
}

/// Flatten an error and its sources into one message
fn describe(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
